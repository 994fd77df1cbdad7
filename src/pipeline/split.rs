//! Section splitting: cut the cleaned body at headings and page breaks.
//!
//! A structural heading (`##` … `######`) opens a chapter section that starts
//! with the heading line itself, so the heading is rendered at the top of the
//! section's first page. A `---` line closes the current section and opens a
//! plain continuation section. Empty sections are never emitted.

use crate::pipeline::lexer::{classify, HeadingKey, Line};
use tracing::debug;

/// A contiguous run of body text between two boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    /// Raw text, one `\n`-terminated line per source line.
    pub content: String,
    /// Opened by a structural heading.
    pub is_chapter_start: bool,
    /// Heading text (anchor removed) for chapter sections.
    pub title: Option<String>,
    /// Key of the heading that opened the section.
    pub heading: Option<HeadingKey>,
}

impl Section {
    fn chapter(title: &str, key: HeadingKey) -> Self {
        Self {
            content: String::new(),
            is_chapter_start: true,
            title: Some(title.to_string()),
            heading: Some(key),
        }
    }

    fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Split cleaned text into sections, preserving document order.
pub fn split_sections(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current = Section::default();
    let mut next_key = 0usize;

    for line in text.lines() {
        match classify(line) {
            Line::Heading(h) if h.is_structural() => {
                flush(&mut sections, std::mem::take(&mut current));
                current = Section::chapter(h.text, HeadingKey(next_key));
                next_key += 1;
            }
            Line::PageBreak => {
                flush(&mut sections, std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.content.push_str(line);
        current.content.push('\n');
    }
    flush(&mut sections, current);

    debug!(
        "Split body into {} sections ({} chapter openings)",
        sections.len(),
        next_key
    );
    sections
}

fn flush(sections: &mut Vec<Section>, section: Section) {
    if !section.is_blank() {
        sections.push(section);
    }
}
