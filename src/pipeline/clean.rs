//! Document cleaning: drop what the title page and the chapter index replace.
//!
//! The body of a manuscript usually repeats things the book renders elsewhere:
//! the header block, a cover image, a `# Title` line with a `*subtitle*`
//! under it, and a hand-written "Table of Contents". Left in, they would
//! show up again on the first body pages.
//!
//! Each pass is a pure `&str → String` function over the original text and
//! is tested on its own. Passes run in this order:
//!
//! 1. Strip the header block
//! 2. Remove the first image (markdown `![..](..)` or `<img>`, whichever comes first)
//! 3. Remove every table-of-contents section
//! 4. Remove the leading `# Title` line and the leading `*subtitle*` line
//! 5. Drop blank and `---` lines before the first content line, so the
//!    output never opens with something that reads as a header block

use crate::pipeline::lexer::{classify, is_emphasis_only, Line};
use crate::pipeline::metadata::{split_front_matter, RE_IMG_TAG, RE_MD_IMAGE};
use tracing::debug;

/// Apply all cleaning passes to a (line-ending normalised) manuscript.
pub fn clean_document(text: &str) -> String {
    let s = strip_header(text);
    let s = strip_first_image(s);
    let s = strip_table_of_contents(&s);
    let s = strip_leading_title(&s);
    let s = strip_leading_breaks(&s);
    ensure_final_newline(s.to_string())
}

// ── Pass 1: Header block ─────────────────────────────────────────────────────

fn strip_header(text: &str) -> &str {
    let (_, body) = split_front_matter(text);
    body
}

// ── Pass 2: First image ──────────────────────────────────────────────────────

/// Remove the first image reference or image tag. The cover shows it.
///
/// A line left holding only whitespace by the removal is dropped entirely.
fn strip_first_image(text: &str) -> String {
    let md = RE_MD_IMAGE.find(text);
    let tag = RE_IMG_TAG.find(text);
    let first = match (md, tag) {
        (Some(a), Some(b)) => Some(if a.start() <= b.start() { a } else { b }),
        (a, b) => a.or(b),
    };
    let Some(m) = first else {
        return text.to_string();
    };

    let line_start = text[..m.start()].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[m.end()..]
        .find('\n')
        .map_or(text.len(), |i| m.end() + i);
    let rest_of_line = format!("{}{}", &text[line_start..m.start()], &text[m.end()..line_end]);

    debug!("Removing first image: {}", m.as_str());
    if rest_of_line.trim().is_empty() {
        let drop_end = (line_end + 1).min(text.len());
        format!("{}{}", &text[..line_start], &text[drop_end..])
    } else {
        format!("{}{}", &text[..m.start()], &text[m.end()..])
    }
}

// ── Pass 3: Table of contents ────────────────────────────────────────────────

/// Remove every "Table of Contents" heading and the lines under it, up to
/// (not including) the next heading of any level or page-break line.
fn strip_table_of_contents(text: &str) -> String {
    let mut out = Vec::new();
    let mut in_toc = false;

    for line in text.lines() {
        match classify(line) {
            Line::Heading(h) if h.is_table_of_contents() => {
                debug!("Removing table-of-contents section");
                in_toc = true;
                continue;
            }
            Line::Heading(_) | Line::PageBreak => in_toc = false,
            Line::Text(_) if in_toc => continue,
            Line::Text(_) => {}
        }
        out.push(line);
    }

    out.join("\n")
}

// ── Pass 4: Leading title and subtitle ───────────────────────────────────────

/// Remove the first `# Title` line and the first emphasis-only line that
/// appear before the first structural heading.
fn strip_leading_title(text: &str) -> String {
    let mut out = Vec::new();
    let mut title_removed = false;
    let mut subtitle_removed = false;
    let mut leading = true;

    for line in text.lines() {
        if leading {
            match classify(line) {
                Line::Heading(h) if h.is_structural() => leading = false,
                Line::Heading(h) if h.level == 1 && !title_removed => {
                    title_removed = true;
                    continue;
                }
                Line::Text(t) if !subtitle_removed && is_emphasis_only(t) => {
                    subtitle_removed = true;
                    continue;
                }
                _ => {}
            }
        }
        out.push(line);
    }

    out.join("\n")
}

// ── Pass 5: Leading breaks ───────────────────────────────────────────────────

/// Skip blank and page-break lines at the start of the body. They only
/// delimit empty sections, which the splitter drops anyway.
fn strip_leading_breaks(text: &str) -> &str {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let bare = line.trim_end_matches('\n');
        if !bare.trim().is_empty() && classify(bare) != Line::PageBreak {
            break;
        }
        offset += line.len();
    }
    &text[offset..]
}

fn ensure_final_newline(s: String) -> String {
    let trimmed = s.trim_end_matches('\n');
    if trimmed.trim().is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
