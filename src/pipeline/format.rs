//! Content formatting: page fragment → markup the viewer renders verbatim.
//!
//! Rules, applied per blank-line separated block:
//! 1. A block that already opens with block markup (`<p`, `<h1>`–`<h6>`,
//!    `<div`) is passed through, so formatting formatted text is a no-op
//! 2. Heading lines become `<hN class="…">text</hN>`; the `{#id}` anchor is
//!    dropped and the text is kept verbatim so it equals the chapter title
//! 3. Runs of other lines become one `<p class="…">` with `**bold**` and
//!    `*italic*` rewritten to `<strong>` / `<em>`
//! 4. Empty paragraphs are discarded
//!
//! Output blocks are separated by a blank line.

use crate::output::Metadata;
use crate::pipeline::lexer::{classify, Heading, Line};
use once_cell::sync::Lazy;
use regex::Regex;

/// Class list of every body paragraph.
pub const PARAGRAPH_CLASS: &str = "mb-2 sm:mb-3 md:mb-4 leading-relaxed break-words";

static RE_BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static RE_ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static RE_BLOCK_MARKUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<(?:p|h[1-6]|div)[\s>]").unwrap());

/// Format one page's raw fragment.
pub fn format_page(fragment: &str) -> String {
    let mut blocks: Vec<String> = Vec::new();

    for block in paragraphs(fragment) {
        if RE_BLOCK_MARKUP.is_match(block.trim_start()) {
            blocks.push(block.trim().to_string());
            continue;
        }

        let mut text_run: Vec<&str> = Vec::new();
        for line in block.lines() {
            match classify(line) {
                Line::Heading(h) => {
                    push_paragraph(&mut blocks, &mut text_run);
                    blocks.push(heading(&h));
                }
                _ => text_run.push(line),
            }
        }
        push_paragraph(&mut blocks, &mut text_run);
    }

    blocks.join("\n\n")
}

/// Markup of the generated title page.
pub fn format_title_page(meta: &Metadata) -> String {
    let subtitle = meta
        .subtitle
        .as_deref()
        .map(|s| {
            format!(
                "\n    <p class=\"text-base sm:text-lg md:text-xl lg:text-2xl font-light italic text-amber-700 leading-relaxed\">{s}</p>"
            )
        })
        .unwrap_or_default();

    format!(
        "<div class=\"h-full flex flex-col justify-center items-center text-center space-y-8\">\n  \
<div class=\"space-y-6\">\n    \
<h1 class=\"text-2xl sm:text-3xl md:text-4xl lg:text-5xl font-bold text-amber-900 leading-tight font-serif\">{title}</h1>{subtitle}\n    \
<div class=\"w-32 h-px bg-amber-600 mx-auto\"></div>\n    \
<p class=\"text-lg sm:text-xl md:text-2xl font-light text-amber-800\">{author}</p>\n  \
</div>\n\
</div>",
        title = meta.title,
        author = meta.author,
    )
}

/// Rewrite `**bold**` then `*italic*`.
pub fn format_inline(text: &str) -> String {
    let s = RE_BOLD.replace_all(text, r#"<strong class="font-semibold">$1</strong>"#);
    RE_ITALIC
        .replace_all(&s, r#"<em class="italic">$1</em>"#)
        .into_owned()
}

/// Blank-line separated paragraphs; whitespace-only lines count as blank.
pub(crate) fn paragraphs(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut buf: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !buf.is_empty() {
                out.push(buf.join("\n"));
                buf.clear();
            }
        } else {
            buf.push(line);
        }
    }
    if !buf.is_empty() {
        out.push(buf.join("\n"));
    }
    out
}

fn push_paragraph(blocks: &mut Vec<String>, run: &mut Vec<&str>) {
    let text = run.join("\n");
    run.clear();
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    blocks.push(format!(
        "<p class=\"{PARAGRAPH_CLASS}\">{}</p>",
        format_inline(text)
    ));
}

fn heading(h: &Heading<'_>) -> String {
    let level = h.level;
    format!(
        "<h{level} class=\"{}\">{}</h{level}>",
        heading_class(level),
        h.text
    )
}

fn heading_class(level: u8) -> &'static str {
    match level {
        1 => "text-lg sm:text-xl md:text-2xl font-bold mb-4 sm:mb-6 text-amber-900 break-words",
        2 => "text-base sm:text-lg md:text-xl font-bold mb-3 sm:mb-4 text-amber-900 break-words",
        3 => "text-sm sm:text-base md:text-lg font-semibold mb-2 sm:mb-3 text-amber-800 break-words",
        4 => "text-sm sm:text-base font-semibold mb-2 sm:mb-3 text-amber-800 break-words",
        _ => "text-xs sm:text-sm font-semibold mb-1 sm:mb-2 text-amber-700 break-words",
    }
}
