//! Output types: the compiled [`Book`] and everything it owns.
//!
//! Field names serialise in camelCase because the JSON is read directly by
//! the viewer (`pageNumber`, `parentId`, `isChapterStart`, `totalPages`).

use crate::error::Md2BookError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Title used when neither the header nor the body names the book.
pub const DEFAULT_TITLE: &str = "Untitled Book";

/// Author used when the header does not name one.
pub const DEFAULT_AUTHOR: &str = "Unknown Author";

/// Chapter name carried by the generated title page.
pub const TITLE_PAGE_CHAPTER: &str = "Title Page";

/// Document-level metadata pulled from the header block or body fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub author: String,
    /// URL (or relative path) of the cover image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_info: Option<PurchaseInfo>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            subtitle: None,
            author: DEFAULT_AUTHOR.to_string(),
            cover_image: None,
            purchase_info: None,
        }
    }
}

/// Call-to-action block shown by the viewer after the last page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseInfo {
    pub link: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

/// One physical page of the book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// 1-indexed position in reading order; the only key the viewer addresses pages by.
    pub id: usize,
    /// Presentational markup, rendered verbatim.
    pub content: String,
    /// Name of the owning chapter, `""` before the first heading.
    pub chapter: String,
    pub is_chapter_start: bool,
}

/// One entry of the chapter outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    /// Unique slug, or the explicit `{#id}` anchor of the heading.
    pub id: String,
    pub title: String,
    /// Id of the page the heading first appears on.
    pub page_number: usize,
    /// Heading level, 2 for `##` through 6 for `######`.
    pub level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// The compiled book: metadata, pages in reading order, and the chapter forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub metadata: Metadata,
    pub pages: Vec<Page>,
    pub chapters: Vec<Chapter>,
    pub total_pages: usize,
}

impl Book {
    /// Look up a page by its id (`1..=total_pages`).
    pub fn page(&self, id: usize) -> Option<&Page> {
        id.checked_sub(1).and_then(|idx| self.pages.get(idx))
    }

    /// The chapter a reader is "in" while viewing `page_id`.
    ///
    /// A chapter is current from its own page up to (excluding) the page of
    /// the next chapter in document order. When several chapters start on the
    /// same page the last of them wins.
    pub fn chapter_at(&self, page_id: usize) -> Option<&Chapter> {
        self.chapters
            .iter()
            .enumerate()
            .filter(|(i, ch)| {
                let next = self.chapters.get(i + 1);
                ch.page_number <= page_id && next.is_none_or(|n| page_id < n.page_number)
            })
            .map(|(_, ch)| ch)
            .next_back()
    }

    /// Direct children of `parent` in document order; `None` yields the roots.
    pub fn children<'a>(&'a self, parent: Option<&'a str>) -> impl Iterator<Item = &'a Chapter> + 'a {
        self.chapters
            .iter()
            .filter(move |ch| ch.parent_id.as_deref() == parent)
    }

    /// Check the structural invariants the viewer relies on.
    ///
    /// * `pages[i].id == i + 1` and `total_pages == pages.len()`
    /// * every chapter's page is in `1..=total_pages`
    /// * chapter ids are unique
    /// * a `parent_id` names an earlier chapter with a strictly smaller level
    pub fn validate(&self) -> Result<(), Md2BookError> {
        if self.total_pages != self.pages.len() {
            return Err(Md2BookError::compilation(format!(
                "total_pages is {} but {} pages were produced",
                self.total_pages,
                self.pages.len()
            )));
        }
        for (idx, page) in self.pages.iter().enumerate() {
            if page.id != idx + 1 {
                return Err(Md2BookError::compilation(format!(
                    "page at position {} has id {}",
                    idx + 1,
                    page.id
                )));
            }
        }

        let mut seen: HashMap<&str, u8> = HashMap::with_capacity(self.chapters.len());
        for ch in &self.chapters {
            if ch.page_number < 1 || ch.page_number > self.total_pages {
                return Err(Md2BookError::compilation(format!(
                    "chapter '{}' points at page {} of {}",
                    ch.id, ch.page_number, self.total_pages
                )));
            }
            if let Some(parent) = ch.parent_id.as_deref() {
                match seen.get(parent) {
                    Some(&parent_level) if parent_level < ch.level => {}
                    Some(_) => {
                        return Err(Md2BookError::compilation(format!(
                            "chapter '{}' (level {}) has parent '{}' at the same or deeper level",
                            ch.id, ch.level, parent
                        )))
                    }
                    None => {
                        return Err(Md2BookError::compilation(format!(
                            "chapter '{}' has parent '{}' which does not precede it",
                            ch.id, parent
                        )))
                    }
                }
            }
            if seen.insert(ch.id.as_str(), ch.level).is_some() {
                return Err(Md2BookError::compilation(format!(
                    "duplicate chapter id '{}'",
                    ch.id
                )));
            }
        }
        Ok(())
    }
}

/// Summary of a compilation written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileStats {
    pub total_pages: usize,
    pub chapters: usize,
    /// Bytes of JSON written.
    pub output_bytes: usize,
}
