//! End-to-end integration tests for edgequake-md2book.
//!
//! Every test drives the public API with a complete manuscript and checks
//! the resulting [`Book`] as the viewer would see it. No network, no
//! fixtures on disk beyond what the file-helper tests write to a temp dir.
//!
//! Run with logs:
//!   RUST_LOG=edgequake_md2book=debug cargo test --test e2e -- --nocapture

use edgequake_md2book::pipeline::clean::clean_document;
use edgequake_md2book::{
    compile, compile_file, compile_to_file, inspect, Book, CompileConfig, Md2BookError,
    TitlePagePolicy,
};
use regex::Regex;
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn words(n: usize) -> String {
    (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
}

/// Words of a formatted page, markup removed.
fn page_words(content: &str) -> usize {
    let tags = Regex::new(r"<[^>]*>").unwrap();
    tags.replace_all(content, " ").split_whitespace().count()
}

/// Assert the structural invariants every compiled book must satisfy.
fn assert_book_invariants(book: &Book, context: &str) {
    assert_eq!(
        book.total_pages,
        book.pages.len(),
        "[{context}] total_pages mismatch"
    );
    for (i, page) in book.pages.iter().enumerate() {
        assert_eq!(page.id, i + 1, "[{context}] page ids must be contiguous");
    }

    let mut levels: HashMap<&str, u8> = HashMap::new();
    for ch in &book.chapters {
        assert!(
            (1..=book.total_pages).contains(&ch.page_number),
            "[{context}] chapter '{}' on page {} of {}",
            ch.id,
            ch.page_number,
            book.total_pages
        );
        assert!((2..=6).contains(&ch.level), "[{context}] bad level");
        if let Some(parent) = ch.parent_id.as_deref() {
            let parent_level = levels
                .get(parent)
                .unwrap_or_else(|| panic!("[{context}] parent '{parent}' must precede '{}'", ch.id));
            assert!(
                *parent_level < ch.level,
                "[{context}] parent of '{}' must be shallower",
                ch.id
            );
        }
        assert!(
            levels.insert(ch.id.as_str(), ch.level).is_none(),
            "[{context}] duplicate chapter id '{}'",
            ch.id
        );
    }

    book.validate()
        .unwrap_or_else(|e| panic!("[{context}] validate failed: {e}"));
}

const NOVEL: &str = "---
title: \"The Long Road\"
subtitle: A Journey
author: Jo Writer
cover_image: https://cdn.example.org/cover.jpg
purchase_link: https://shop.example.org/long-road
purchase_text: Buy the paperback
price: $12
---
![Cover](https://cdn.example.org/cover.jpg)
# The Long Road
*A Journey*

## Table of Contents
- [Departure](#departure)
- [The Road](#road)
---
## Departure {#departure}
It began with a *single* step, as these things do.

The morning was **cold** and the road was long.

### At the Gate
The gate creaked.

---
Later that day the rain came.

## The Road {#road}
And kept going.

### Night
Stars.

#### Dream
A dream within the night.

## Arrival
Home at last.
";

// ── End-to-end examples ──────────────────────────────────────────────────────

#[test]
fn test_example_minimal_book() {
    init_tracing();
    let text = "---\ntitle: Alpha\nauthor: Bo\n---\n## Intro\nHello world.\n";
    let book = compile(text, &CompileConfig::default()).unwrap();

    assert_eq!(book.metadata.title, "Alpha");
    assert_eq!(book.metadata.author, "Bo");
    assert_eq!(book.total_pages, 1);
    assert_eq!(book.chapters.len(), 1);
    let ch = &book.chapters[0];
    assert_eq!(ch.title, "Intro");
    assert_eq!(ch.level, 2);
    assert_eq!(ch.page_number, 1);
    assert!(ch.parent_id.is_none());
    assert_book_invariants(&book, "minimal");
}

#[test]
fn test_example_cover_adds_title_page() {
    init_tracing();
    let body = "## One\nFirst.\n---\nSecond.\n## Two\nThird.\n";
    let with_cover = format!("---\ntitle: Alpha\ncover_image: c.png\n---\n{body}");
    let without_cover = format!("---\ntitle: Alpha\n---\n{body}");

    let book = compile(&with_cover, &CompileConfig::default()).unwrap();
    let plain = compile(&without_cover, &CompileConfig::default()).unwrap();

    let title = &book.pages[0];
    assert_eq!(title.id, 1);
    assert!(title.is_chapter_start);
    assert_eq!(title.chapter, "Title Page");
    assert!(title.content.contains(">Alpha</h1>"));

    assert_eq!(plain.total_pages, 3);
    assert_eq!(book.total_pages, 1 + plain.total_pages);
    assert_eq!(book.chapters[0].page_number, 2);
    assert_eq!(book.chapters[1].page_number, 4);
    assert_book_invariants(&book, "cover");
}

#[test]
fn test_example_nesting_and_ancestor_stack() {
    init_tracing();
    let book = compile(
        "## Part\nA\n### Scene\nB\n## Next\nC\n",
        &CompileConfig::default(),
    )
    .unwrap();

    assert_eq!(book.chapters.len(), 3);
    let (part, scene, next) = (&book.chapters[0], &book.chapters[1], &book.chapters[2]);
    assert_eq!(scene.parent_id.as_deref(), Some(part.id.as_str()));
    assert_eq!(scene.level, 3);
    assert!(next.parent_id.is_none());
    assert_eq!(next.level, 2);
    assert_book_invariants(&book, "nesting");
}

#[test]
fn test_example_budget_page_counts() {
    init_tracing();
    let config = CompileConfig::builder().words_per_page(50).build().unwrap();

    let short = format!("{}\n\n{}\n", words(10), words(10));
    let book = compile(&short, &config).unwrap();
    assert_eq!(book.total_pages, 1);

    let paras: Vec<String> = (0..12).map(|_| words(10)).collect();
    let long = paras.join("\n\n");
    let book = compile(&long, &config).unwrap();
    assert!(book.total_pages >= 2, "got {} pages", book.total_pages);
    for page in &book.pages {
        assert!(page_words(&page.content) <= 50, "page {} over budget", page.id);
    }
    assert_book_invariants(&book, "budget");
}

// ── Properties ───────────────────────────────────────────────────────────────

#[test]
fn test_determinism() {
    let a = compile(NOVEL, &CompileConfig::default()).unwrap();
    let b = compile(NOVEL, &CompileConfig::default()).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn test_full_novel() {
    init_tracing();
    let book = compile(NOVEL, &CompileConfig::default()).unwrap();
    assert_book_invariants(&book, "novel");

    let meta = &book.metadata;
    assert_eq!(meta.title, "The Long Road");
    assert_eq!(meta.subtitle.as_deref(), Some("A Journey"));
    assert_eq!(meta.author, "Jo Writer");
    let purchase = meta.purchase_info.as_ref().unwrap();
    assert_eq!(purchase.price.as_deref(), Some("$12"));

    let ids: Vec<&str> = book.chapters.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["departure", "at-the-gate", "road", "night", "dream", "arrival"]
    );
    let parents: Vec<Option<&str>> = book
        .chapters
        .iter()
        .map(|c| c.parent_id.as_deref())
        .collect();
    assert_eq!(
        parents,
        vec![None, Some("departure"), None, Some("road"), Some("night"), None]
    );

    // Title page, then one page per section.
    let chapters: Vec<&str> = book.pages.iter().map(|p| p.chapter.as_str()).collect();
    assert_eq!(
        chapters,
        vec![
            "Title Page",
            "Departure",
            "At the Gate",
            "At the Gate",
            "The Road",
            "Night",
            "Dream",
            "Arrival"
        ]
    );
    let pages: Vec<usize> = book.chapters.iter().map(|c| c.page_number).collect();
    assert_eq!(pages, vec![2, 3, 5, 6, 7, 8]);

    // The ToC and title lines never reach the body.
    for page in &book.pages[1..] {
        assert!(!page.content.contains("Table of Contents"));
        assert!(!page.content.contains("cover.jpg"));
        assert!(!page.content.contains("A Journey"));
    }
    assert!(!book.pages[3].is_chapter_start);
    assert!(book.pages[1]
        .content
        .contains("<em class=\"italic\">single</em>"));
    assert!(book.pages[1]
        .content
        .contains("<strong class=\"font-semibold\">cold</strong>"));
}

#[test]
fn test_chapter_at_follows_reading_position() {
    let book = compile(NOVEL, &CompileConfig::default()).unwrap();
    assert!(book.chapter_at(1).is_none());
    assert_eq!(book.chapter_at(2).unwrap().id, "departure");
    assert_eq!(book.chapter_at(4).unwrap().id, "at-the-gate");
    assert_eq!(book.chapter_at(8).unwrap().id, "arrival");
    assert_eq!(book.page(8).unwrap().chapter, "Arrival");
    assert!(book.page(0).is_none());
    assert!(book.page(9).is_none());

    let roots: Vec<&str> = book.children(None).map(|c| c.title.as_str()).collect();
    assert_eq!(roots, vec!["Departure", "The Road", "Arrival"]);
}

#[test]
fn test_chapter_openings_use_reduced_budget() {
    let config = CompileConfig::builder()
        .words_per_page(100)
        .title_page(TitlePagePolicy::Never)
        .build()
        .unwrap();
    let paras: Vec<String> = (0..20).map(|_| words(10)).collect();
    let text = format!("## Long Chapter\n{}\n", paras.join("\n\n"));
    let book = compile(&text, &config).unwrap();

    assert!(book.pages[0].is_chapter_start);
    for page in &book.pages {
        assert!(
            page_words(&page.content) <= 60,
            "page {} has {} words",
            page.id,
            page_words(&page.content)
        );
    }
    assert_book_invariants(&book, "chapter budget");
}

#[test]
fn test_oversized_paragraph_gets_own_page() {
    let config = CompileConfig::builder().words_per_page(20).build().unwrap();
    let text = format!("{}\n\n{}\n\n{}\n", words(5), words(50), words(5));
    let book = compile(&text, &config).unwrap();
    let counts: Vec<usize> = book.pages.iter().map(|p| page_words(&p.content)).collect();
    assert_eq!(counts, vec![5, 50, 5]);
}

#[test]
fn test_cleaning_is_idempotent() {
    let once = clean_document(NOVEL);
    let twice = clean_document(&once);
    assert_eq!(once, twice);
    assert!(!once.contains("title:"));
    assert!(!once.contains("![Cover]"));
}

#[test]
fn test_cleaning_is_idempotent_when_body_opens_with_break() {
    for (text, ctx) in [
        (
            "## Table of Contents\n- [A](#a)\n---\n## A\nAlpha text.\n---\n## B\nBeta text.\n",
            "toc ends at break",
        ),
        (
            "---\ntitle: X\n---\n---\n## One\nx\n---\n## Two\ny\n",
            "break after header",
        ),
    ] {
        let once = clean_document(text);
        assert!(!once.starts_with("---"), "[{ctx}] got: {once:?}");
        assert_eq!(clean_document(&once), once, "[{ctx}] second pass changed text");

        let book = compile(text, &CompileConfig::default()).unwrap();
        assert_eq!(book.chapters.len(), 2, "[{ctx}] chapters lost");
        assert_book_invariants(&book, ctx);
    }
}

#[test]
fn test_degenerate_inputs() {
    for (text, ctx) in [
        ("", "empty"),
        ("   \n\n", "blank"),
        ("---\n---\n", "empty header"),
        ("---\ntitle: Open\nno end\n", "unterminated"),
        ("---\n---\n---\n", "only breaks"),
        ("## \n## {#x}\n", "odd headings"),
        ("####### too deep\n", "seven hashes"),
    ] {
        let book = compile(text, &CompileConfig::default())
            .unwrap_or_else(|e| panic!("[{ctx}] failed: {e}"));
        assert!(book.total_pages >= 1, "[{ctx}] no pages");
        assert_book_invariants(&book, ctx);
    }
}

#[test]
fn test_duplicate_headings_resolve_to_their_own_pages() {
    let book = compile(
        "## Part One\n### Notes\nA\n## Part Two\n### Notes\nB\n",
        &CompileConfig::default(),
    )
    .unwrap();
    let notes: Vec<_> = book
        .chapters
        .iter()
        .filter(|c| c.title == "Notes")
        .collect();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].page_number, 2);
    assert_eq!(notes[1].page_number, 4);
    assert_ne!(notes[0].id, notes[1].id);
    assert_book_invariants(&book, "duplicates");
}

#[test]
fn test_json_shape() {
    let book = compile(NOVEL, &CompileConfig::default()).unwrap();
    let json: serde_json::Value = serde_json::to_value(&book).unwrap();

    assert_eq!(json["totalPages"], 8);
    assert_eq!(json["metadata"]["coverImage"], "https://cdn.example.org/cover.jpg");
    assert_eq!(json["metadata"]["purchaseInfo"]["text"], "Buy the paperback");
    assert_eq!(json["pages"][0]["isChapterStart"], true);
    assert_eq!(json["chapters"][1]["parentId"], "departure");
    assert_eq!(json["chapters"][1]["pageNumber"], 3);
    assert!(json["chapters"][0].get("parentId").is_none());
}

#[test]
fn test_inspect_matches_compile() {
    let book = compile(NOVEL, &CompileConfig::default()).unwrap();
    assert_eq!(inspect(NOVEL), book.metadata);
}

// ── File helpers ─────────────────────────────────────────────────────────────

#[test]
fn test_compile_to_file_round_trip() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("novel.md");
    let output = dir.path().join("out/book.json");
    std::fs::write(&input, NOVEL).unwrap();

    let stats = compile_to_file(&input, &output, &CompileConfig::default()).unwrap();
    assert_eq!(stats.total_pages, 8);
    assert_eq!(stats.chapters, 6);

    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(written.len(), stats.output_bytes);
    let parsed: Book = serde_json::from_str(&written).unwrap();
    assert_eq!(parsed, compile_file(&input, &CompileConfig::default()).unwrap());
    assert!(!output.with_extension("json.tmp").exists());
}

#[test]
fn test_compile_file_errors() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.md");
    let err = compile_file(&missing, &CompileConfig::default()).unwrap_err();
    assert!(matches!(err, Md2BookError::FileNotFound { .. }), "got {err:?}");

    let binary = dir.path().join("binary.md");
    std::fs::write(&binary, [0xffu8, 0xfe, 0x00, 0x41]).unwrap();
    let err = compile_file(&binary, &CompileConfig::default()).unwrap_err();
    assert!(matches!(err, Md2BookError::InvalidUtf8 { .. }), "got {err:?}");
}
