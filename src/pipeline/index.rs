//! Chapter indexing: build the outline forest with page references.
//!
//! Every structural heading of the cleaned text becomes one [`Chapter`].
//! Its page comes from the paginator's key map: the splitter and this module
//! number headings over the same text, so the lookup is exact. The text
//! matching path below only runs when a key is missing from the map, and is
//! logged when it does.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::output::{Chapter, Page};
use crate::pipeline::lexer::{structural_headings, HeadingKey};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

/// `<hN …>text</hN>` in formatted page content; capture 1 is the text.
static RE_FORMATTED_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<h[1-6][^>]*>(.*?)</h[1-6]>").unwrap());

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Id given to a heading whose text slugs to nothing.
const FALLBACK_SLUG: &str = "chapter";

/// Build the chapter list for `cleaned`, resolving pages against `pages`.
pub fn build_chapters(
    cleaned: &str,
    pages: &[Page],
    heading_pages: &BTreeMap<HeadingKey, usize>,
) -> Vec<Chapter> {
    let text_pages = TextPageMap::from_pages(pages);
    let mut ids = IdAllocator::default();
    let mut ancestors: Vec<(u8, String)> = Vec::new();
    let mut chapters = Vec::new();

    for (key, heading) in structural_headings(cleaned) {
        let id = ids.allocate(heading.anchor.map_or_else(|| slugify(heading.text), str::to_string));
        let page = resolve_page(key, heading.text, heading_pages, &text_pages);
        let page_number = clamp_page(page, pages.len());

        while ancestors
            .last()
            .is_some_and(|(level, _)| *level >= heading.level)
        {
            ancestors.pop();
        }
        let parent_id = ancestors.last().map(|(_, id)| id.clone());
        ancestors.push((heading.level, id.clone()));

        chapters.push(Chapter {
            id,
            title: heading.text.to_string(),
            page_number,
            level: heading.level,
            parent_id,
        });
    }

    debug!("Indexed {} chapters", chapters.len());
    chapters
}

/// Lowercase, whitespace runs → `-`, drop anything outside `[a-z0-9-]`.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    RE_WHITESPACE
        .replace_all(&lower, "-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

// ── Page resolution ──────────────────────────────────────────────────────────

fn resolve_page(
    key: HeadingKey,
    title: &str,
    heading_pages: &BTreeMap<HeadingKey, usize>,
    text_pages: &TextPageMap,
) -> usize {
    if let Some(&page) = heading_pages.get(&key) {
        return page;
    }
    if let Some(page) = text_pages.exact(title) {
        warn!(title, page, "Chapter page resolved by heading text");
        return page;
    }
    if let Some(page) = text_pages.overlapping(title) {
        warn!(title, page, "Chapter page resolved by partial heading text");
        return page;
    }
    warn!(title, "Chapter page unresolved; defaulting to page 1");
    1
}

fn clamp_page(page: usize, total: usize) -> usize {
    if total == 0 {
        1
    } else {
        page.clamp(1, total)
    }
}

/// Heading text → first page it appears on, in insertion order.
#[derive(Debug, Default)]
struct TextPageMap {
    entries: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl TextPageMap {
    fn from_pages(pages: &[Page]) -> Self {
        let mut map = Self::default();
        for page in pages {
            for caps in RE_FORMATTED_HEADING.captures_iter(&page.content) {
                let text = caps[1].trim().to_string();
                if !map.index.contains_key(&text) {
                    map.index.insert(text.clone(), page.id);
                    map.entries.push((text, page.id));
                }
            }
        }
        map
    }

    fn exact(&self, title: &str) -> Option<usize> {
        self.index.get(title).copied()
    }

    fn overlapping(&self, title: &str) -> Option<usize> {
        if title.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|(text, _)| text.contains(title) || title.contains(text.as_str()))
            .map(|(_, page)| *page)
    }
}

// ── Ids ──────────────────────────────────────────────────────────────────────

/// Hands out unique chapter ids, suffixing `-1`, `-2`, … on collision.
#[derive(Debug, Default)]
struct IdAllocator {
    used: HashSet<String>,
}

impl IdAllocator {
    fn allocate(&mut self, base: String) -> String {
        let base = if base.is_empty() {
            FALLBACK_SLUG.to_string()
        } else {
            base
        };
        let mut id = base.clone();
        let mut n = 1;
        while self.used.contains(&id) {
            id = format!("{base}-{n}");
            n += 1;
        }
        self.used.insert(id.clone());
        id
    }
}
