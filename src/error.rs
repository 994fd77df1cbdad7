//! Error types for the edgequake-md2book library.
//!
//! The compiler itself is a pure function and has exactly one fatal outcome:
//! [`Md2BookError::CompilationFailed`]. Everything a manuscript can get wrong
//! (a malformed header, a heading that cannot be matched to a page, a section
//! with no text) is recovered inside the pipeline with a documented default
//! and is only ever logged.
//!
//! The remaining variants belong to the thin I/O shell around the compiler
//! ([`crate::compile::compile_file`], [`crate::compile::compile_to_file`]) and
//! to configuration validation.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-md2book library.
#[derive(Debug, Error)]
pub enum Md2BookError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Manuscript not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file was read but is not UTF-8 text.
    #[error("Manuscript '{path}' is not valid UTF-8 text")]
    InvalidUtf8 { path: PathBuf },

    /// Any other I/O failure while reading the manuscript.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Compilation ───────────────────────────────────────────────────────
    /// The pipeline aborted or produced a structurally invalid book.
    ///
    /// No partial book is returned alongside this error.
    #[error("Compilation failed: {reason}")]
    CompilationFailed { reason: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not serialise the compiled book.
    #[error("Failed to serialise book: {0}")]
    Serialization(String),

    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Md2BookError {
    pub(crate) fn compilation(reason: impl Into<String>) -> Self {
        Md2BookError::CompilationFailed {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for Md2BookError {
    fn from(e: serde_json::Error) -> Self {
        Md2BookError::Serialization(e.to_string())
    }
}
