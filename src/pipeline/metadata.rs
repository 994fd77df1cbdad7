//! Metadata extraction: header block first, body fallbacks second.
//!
//! A manuscript may open with a header block:
//!
//! ```text
//! ---
//! title: "The Long Road"
//! author: Jo Writer
//! cover_image: https://cdn.example.org/cover.jpg
//! purchase_link: https://shop.example.org/long-road
//! purchase_text: Buy the paperback
//! price: $12
//! ---
//! ```
//!
//! Anything missing from the header is looked up in the body (a `# Title`
//! line, a `*subtitle*` line, the first image) or defaulted. Extraction never
//! fails: a header that does not parse is simply not a header.

use crate::output::{Metadata, PurchaseInfo, DEFAULT_AUTHOR, DEFAULT_TITLE};
use crate::pipeline::lexer::{classify, classify_lines, is_emphasis_only, strip_emphasis, Line};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// `![alt](url)`: capture 1 is the URL.
pub(crate) static RE_MD_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]\n]*\]\(([^)\n]*)\)").unwrap());

/// `<img … src="url" …>`: capture 1 is the src.
pub(crate) static RE_IMG_SRC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<img[^>]+src=['"]([^'"]*)['"][^>]*>"#).unwrap());

/// Any `<img …>` tag.
pub(crate) static RE_IMG_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<img\b[^>]*>").unwrap());

/// Parsed `key: value` lines of a header block, in document order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrontMatter<'a> {
    entries: Vec<(&'a str, &'a str)>,
}

impl<'a> FrontMatter<'a> {
    fn parse(block: &'a str) -> Self {
        let entries = block
            .lines()
            .filter_map(|line| line.split_once(':'))
            .filter(|(key, _)| !key.is_empty() && !key.starts_with(char::is_whitespace))
            .collect();
        Self { entries }
    }

    /// Cleaned value of the first occurrence of `key`; empty values count as absent.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .and_then(|(_, v)| clean_value(v))
    }
}

/// Split `text` into its header block (if any) and the body after it.
///
/// The header must start on the very first line with a `---` delimiter and
/// be closed by another `---` line. Without a closing delimiter there is no
/// header and the whole text is body.
pub fn split_front_matter(text: &str) -> (Option<FrontMatter<'_>>, &str) {
    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return (None, text);
    };
    if classify(first.trim_end_matches('\n')) != Line::PageBreak {
        return (None, text);
    }

    let block_start = first.len();
    let mut offset = block_start;
    for line in lines {
        if classify(line.trim_end_matches('\n')) == Line::PageBreak {
            let block = &text[block_start..offset];
            let body = &text[offset + line.len()..];
            return (Some(FrontMatter::parse(block)), body);
        }
        offset += line.len();
    }

    debug!("Header block opened but never closed; treating it as body");
    (None, text)
}

/// Extract [`Metadata`] from a (line-ending normalised) manuscript.
pub fn extract_metadata(text: &str) -> Metadata {
    let (header, body) = split_front_matter(text);
    let header = header.unwrap_or_default();

    let header_title = header.get("title");
    let has_header_title = header_title.is_some();

    let title = header_title
        .or_else(|| first_title_heading(body))
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let subtitle = header.get("subtitle").or_else(|| {
        if has_header_title {
            None
        } else {
            first_emphasis_line(body)
        }
    });

    let author = header
        .get("author")
        .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

    let cover_image = header.get("cover_image").or_else(|| first_image(body));

    let purchase_info = match (header.get("purchase_link"), header.get("purchase_text")) {
        (Some(link), Some(text)) => Some(PurchaseInfo {
            link,
            text,
            price: header.get("price"),
        }),
        _ => None,
    };

    debug!(
        title = %title,
        has_cover = cover_image.is_some(),
        has_purchase = purchase_info.is_some(),
        "Extracted metadata"
    );

    Metadata {
        title,
        subtitle,
        author,
        cover_image,
        purchase_info,
    }
}

// ── Body fallbacks ───────────────────────────────────────────────────────────

fn first_title_heading(body: &str) -> Option<String> {
    classify_lines(body).find_map(|line| match line {
        Line::Heading(h) if h.level == 1 && !h.text.is_empty() => Some(h.text.to_string()),
        _ => None,
    })
}

fn first_emphasis_line(body: &str) -> Option<String> {
    body.lines()
        .find(|line| is_emphasis_only(line))
        .map(strip_emphasis)
}

/// Cover fallback: first markdown image, else first `<img>` tag.
fn first_image(body: &str) -> Option<String> {
    let from_markdown = RE_MD_IMAGE
        .captures(body)
        .map(|caps| caps[1].trim().to_string())
        .filter(|url| !url.is_empty());
    from_markdown.or_else(|| {
        RE_IMG_SRC
            .captures(body)
            .map(|caps| caps[1].trim().to_string())
            .filter(|src| !src.is_empty())
    })
}

/// Trim and strip one pair of surrounding quotes.
fn clean_value(raw: &str) -> Option<String> {
    let v = raw.trim();
    let v = ['"', '\'']
        .iter()
        .find_map(|&q| v.strip_prefix(q).and_then(|s| s.strip_suffix(q)))
        .unwrap_or(v)
        .trim();
    if v.is_empty() {
        None
    } else {
        Some(v.to_string())
    }
}
