//! Pipeline stages for manuscript-to-book compilation.
//!
//! Each submodule implements exactly one transformation step and is a pure
//! function of its inputs. Keeping stages separate makes each independently
//! testable; the only state shared between them is passed explicitly
//! (sections, the page sequence, the heading → page map).
//!
//! ## Data Flow
//!
//! ```text
//!            ┌─▶ metadata ─────────────────────────────┐
//! raw text ──┤                                         ▼
//!            └─▶ clean ──▶ split ──▶ paginate+format ──▶ index ──▶ Book
//!                  │                    (pages, keys)     ▲
//!                  └──────────────────────────────────────┘
//! ```
//!
//! 1. [`lexer`]: classify lines as heading, page break or text; shared by
//!    every other stage
//! 2. [`metadata`]: header block first, body fallbacks second
//! 3. [`clean`]: drop the header, cover image, title lines and any
//!    hand-written table of contents
//! 4. [`split`]: cut the body at structural headings and page breaks
//! 5. [`paginate`]: greedy word-budget packing into numbered pages
//! 6. [`format`]: page fragment → viewer markup
//! 7. [`index`]: chapter forest with page numbers resolved by heading key

pub mod clean;
pub mod format;
pub mod index;
pub mod lexer;
pub mod metadata;
pub mod paginate;
pub mod split;
