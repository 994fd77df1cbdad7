//! Line classification: turn raw manuscript lines into typed [`Line`] values.
//!
//! Every later stage (cleaner, splitter, formatter, indexer) asks the same
//! three questions of a line: is it a heading, is it a page break, or is it
//! text? Answering them once, here, keeps the stages in agreement about what
//! counts as a heading and what its title is. The formatter's `<hN>` text and
//! the indexer's chapter title come from the same [`Heading::text`], which is
//! what lets chapter titles match formatted pages exactly.

/// Marker line separating sections (and delimiting the header block).
pub const PAGE_BREAK: &str = "---";

/// Heading text that marks a hand-written table of contents.
pub const TABLE_OF_CONTENTS: &str = "Table of Contents";

/// One classified manuscript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    Heading(Heading<'a>),
    PageBreak,
    Text(&'a str),
}

/// A `#`-prefixed heading line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heading<'a> {
    /// Number of leading `#`, 1–6.
    pub level: u8,
    /// Heading text with the `{#id}` anchor removed, trimmed.
    pub text: &'a str,
    /// Explicit anchor id from `{#id}`, if present.
    pub anchor: Option<&'a str>,
}

impl Heading<'_> {
    /// Headings of level 2–6 open sections and chapters; a table-of-contents
    /// heading never does.
    pub fn is_structural(&self) -> bool {
        (2..=6).contains(&self.level) && !self.is_table_of_contents()
    }

    pub fn is_table_of_contents(&self) -> bool {
        self.text == TABLE_OF_CONTENTS
    }
}

/// Opaque identifier of a structural heading: its ordinal within one
/// cleaned document. The splitter and the indexer both number headings by
/// scanning the same text, so equal keys name the same heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HeadingKey(pub usize);

/// Classify a single line (without its trailing newline).
pub fn classify(line: &str) -> Line<'_> {
    if line.trim_end() == PAGE_BREAK {
        return Line::PageBreak;
    }
    match parse_heading(line) {
        Some(h) => Line::Heading(h),
        None => Line::Text(line),
    }
}

/// Classify every line of `text` in order.
pub fn classify_lines(text: &str) -> impl Iterator<Item = Line<'_>> {
    text.lines().map(classify)
}

/// Iterate the structural headings of `text` with their keys.
pub fn structural_headings(text: &str) -> impl Iterator<Item = (HeadingKey, Heading<'_>)> {
    classify_lines(text)
        .filter_map(|line| match line {
            Line::Heading(h) if h.is_structural() => Some(h),
            _ => None,
        })
        .enumerate()
        .map(|(i, h)| (HeadingKey(i), h))
}

/// Normalise CRLF and lone CR line endings to LF.
pub fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

/// A line that is nothing but `*emphasis*`, e.g. a subtitle under the title.
pub fn is_emphasis_only(line: &str) -> bool {
    let t = line.trim();
    t.len() >= 2 && t.starts_with('*') && t.ends_with('*') && !strip_emphasis(t).is_empty()
}

/// Remove every `*` and trim.
pub fn strip_emphasis(line: &str) -> String {
    line.replace('*', "").trim().to_string()
}

fn parse_heading(line: &str) -> Option<Heading<'_>> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim();
    if rest.is_empty() {
        return None;
    }

    let (text, anchor) = match trailing_anchor(rest) {
        Some((text, id)) => (text, Some(id)),
        None => (rest, None),
    };

    Some(Heading {
        level: hashes as u8,
        text,
        anchor,
    })
}

/// `"Title {#id}"` → `("Title", "id")`.
fn trailing_anchor(rest: &str) -> Option<(&str, &str)> {
    let body = rest.strip_suffix('}')?;
    let start = body.rfind("{#")?;
    let id = &body[start + 2..];
    if id.is_empty() || id.contains('}') {
        return None;
    }
    Some((body[..start].trim_end(), id))
}
