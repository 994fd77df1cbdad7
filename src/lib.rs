//! # edgequake-md2book
//!
//! Compile a single Markdown manuscript into a paginated book.
//!
//! ## Why this crate?
//!
//! A long-form manuscript is one flat file, but a reader wants pages: a
//! title page, chapter openings, a table of contents that says where each
//! chapter starts. This crate turns the file into exactly that, as plain
//! data (a [`Book`]) the viewer renders without any further parsing.
//!
//! ## Pipeline Overview
//!
//! ```text
//! manuscript
//!  │
//!  ├─ 1. Metadata  header block, then `# Title` / `*subtitle*` / first image
//!  ├─ 2. Clean     drop header, cover image, title lines, hand-written ToC
//!  ├─ 3. Split     sections at `##`…`######` headings and `---` breaks
//!  ├─ 4. Paginate  greedy word budget (280, chapter openings 60 %)
//!  ├─ 5. Format    `<hN>` / `<p>` markup with emphasis
//!  └─ 6. Index     chapter forest with page numbers
//! ```
//!
//! The compiler is a pure function: same text and config, same book.
//!
//! ## Quick Start
//!
//! ```rust
//! use edgequake_md2book::{compile, CompileConfig};
//!
//! let text = "---\ntitle: Alpha\nauthor: Bo\n---\n## Intro\nHello world.\n";
//! let book = compile(text, &CompileConfig::default()).unwrap();
//!
//! assert_eq!(book.metadata.title, "Alpha");
//! assert_eq!(book.total_pages, 1);
//! assert_eq!(book.chapters[0].title, "Intro");
//! assert_eq!(book.chapters[0].page_number, 1);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `md2book` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! edgequake-md2book = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod compile;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use compile::{compile, compile_file, compile_to_file, inspect, read_manuscript, write_book};
pub use config::{CompileConfig, CompileConfigBuilder, TitlePagePolicy};
pub use error::Md2BookError;
pub use output::{Book, Chapter, CompileStats, Metadata, Page, PurchaseInfo};
