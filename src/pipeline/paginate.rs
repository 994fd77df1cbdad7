//! Pagination: pack each section's paragraphs into word-budgeted pages.
//!
//! ## Why a word budget
//!
//! The viewer renders one page at a time into a fixed frame. Measuring real
//! glyph widths is out of reach for a pure compiler, so a page holds a
//! bounded number of words instead. Paragraphs are never split: a paragraph
//! longer than the budget gets a page of its own.
//!
//! ## Page assembly
//!
//! [`PageSequence`] is the only place page ids are handed out. It owns the
//! next id and the chapter name pages inherit, and records the first page of
//! every heading section so the indexer can resolve chapter pages by key.

use std::collections::BTreeMap;

use crate::config::CompileConfig;
use crate::output::{Metadata, Page, TITLE_PAGE_CHAPTER};
use crate::pipeline::format::{format_page, format_title_page, paragraphs};
use crate::pipeline::lexer::HeadingKey;
use crate::pipeline::split::Section;
use tracing::debug;

/// Pages of a book body plus the heading → first page map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    pub pages: Vec<Page>,
    pub heading_pages: BTreeMap<HeadingKey, usize>,
}

/// Sequential page builder.
#[derive(Debug)]
pub struct PageSequence {
    pages: Vec<Page>,
    heading_pages: BTreeMap<HeadingKey, usize>,
    current_chapter: String,
}

impl Default for PageSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSequence {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            heading_pages: BTreeMap::new(),
            current_chapter: String::new(),
        }
    }

    /// Id the next pushed page will get.
    pub fn next_id(&self) -> usize {
        self.pages.len() + 1
    }

    /// Push the generated title page.
    pub fn push_title_page(&mut self, meta: &Metadata) {
        let id = self.next_id();
        self.pages.push(Page {
            id,
            content: format_title_page(meta),
            chapter: TITLE_PAGE_CHAPTER.to_string(),
            is_chapter_start: true,
        });
    }

    /// Paginate one section and append its formatted pages.
    pub fn push_section(&mut self, section: &Section, config: &CompileConfig) {
        if section.is_chapter_start {
            if let Some(title) = &section.title {
                self.current_chapter.clone_from(title);
            }
        }
        if let Some(key) = section.heading {
            let first_page = self.next_id();
            self.heading_pages.entry(key).or_insert(first_page);
        }

        let budget = config.budget_for(section.is_chapter_start);
        for (i, fragment) in paginate_section(&section.content, budget)
            .iter()
            .enumerate()
        {
            let id = self.next_id();
            self.pages.push(Page {
                id,
                content: format_page(fragment),
                chapter: self.current_chapter.clone(),
                is_chapter_start: section.is_chapter_start && i == 0,
            });
        }
    }

    pub fn finish(self) -> Pagination {
        Pagination {
            pages: self.pages,
            heading_pages: self.heading_pages,
        }
    }
}

/// Build every page of the book: optional title page, then all sections.
pub fn paginate(sections: &[Section], meta: &Metadata, config: &CompileConfig) -> Pagination {
    let mut seq = PageSequence::new();

    if config.wants_title_page(meta.cover_image.is_some()) {
        seq.push_title_page(meta);
    }
    for section in sections {
        seq.push_section(section, config);
    }
    if seq.pages.is_empty() {
        // An empty body still renders as one blank page.
        seq.push_section(&Section::default(), config);
    }

    let out = seq.finish();
    debug!(
        "Paginated {} sections into {} pages",
        sections.len(),
        out.pages.len()
    );
    out
}

/// Greedy word-budget packing of one section's raw text.
///
/// Returns at least one fragment; a section with no words yields `[""]`.
pub fn paginate_section(content: &str, budget: usize) -> Vec<String> {
    let budget = budget.max(1);
    let mut pages = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut words = 0usize;

    for para in paragraphs(content) {
        let n = word_count(&para);
        if !current.is_empty() && words + n > budget {
            pages.push(close_page(&current));
            current.clear();
            words = 0;
        }
        words += n;
        current.push(para);
    }
    if !current.is_empty() {
        pages.push(close_page(&current));
    }

    if pages.is_empty() {
        pages.push(String::new());
    }
    pages
}

/// Non-empty whitespace-separated tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn close_page(paragraphs: &[String]) -> String {
    paragraphs.join("\n\n").trim().to_string()
}
