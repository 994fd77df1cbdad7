//! Compilation entry points.
//!
//! [`compile`] is the whole compiler: text in, [`Book`] out. The file
//! helpers around it only add reading, UTF-8 checking and an atomic write.

use crate::config::CompileConfig;
use crate::error::Md2BookError;
use crate::output::{Book, CompileStats, Metadata};
use crate::pipeline::{clean, index, lexer, metadata, paginate, split};
use std::io::ErrorKind;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Compile a manuscript into a [`Book`].
///
/// # Errors
/// Returns [`Md2BookError::CompilationFailed`] if the pipeline aborts or the
/// assembled book violates a structural invariant. Malformed input is never
/// an error: missing metadata falls back to defaults and unresolvable
/// chapters point at page 1.
pub fn compile(text: &str, config: &CompileConfig) -> Result<Book, Md2BookError> {
    let start = Instant::now();
    info!("Starting compilation ({} bytes)", text.len());

    let book = panic::catch_unwind(AssertUnwindSafe(|| run_pipeline(text, config)))
        .map_err(|payload| Md2BookError::compilation(panic_message(payload.as_ref())))?;
    book.validate()?;

    info!(
        "Compiled '{}': {} pages, {} chapters in {}ms",
        book.metadata.title,
        book.total_pages,
        book.chapters.len(),
        start.elapsed().as_millis()
    );
    Ok(book)
}

/// Extract metadata without compiling the body.
pub fn inspect(text: &str) -> Metadata {
    metadata::extract_metadata(&lexer::normalise_line_endings(text))
}

/// Read a UTF-8 manuscript from disk and compile it.
pub fn compile_file(
    path: impl AsRef<Path>,
    config: &CompileConfig,
) -> Result<Book, Md2BookError> {
    let text = read_manuscript(path)?;
    compile(&text, config)
}

/// Compile a manuscript file and write the book as JSON.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub fn compile_to_file(
    input: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &CompileConfig,
) -> Result<CompileStats, Md2BookError> {
    let book = compile_file(input, config)?;
    write_book(&book, output_path, true)
}

/// Serialise `book` as JSON (pretty or compact) and write it atomically.
pub fn write_book(
    book: &Book,
    output_path: impl AsRef<Path>,
    pretty: bool,
) -> Result<CompileStats, Md2BookError> {
    let json = if pretty {
        serde_json::to_string_pretty(book)?
    } else {
        serde_json::to_string(book)?
    };
    let path = output_path.as_ref();
    write_atomic(path, json.as_bytes())?;

    debug!("Wrote {} bytes to {}", json.len(), path.display());
    Ok(CompileStats {
        total_pages: book.total_pages,
        chapters: book.chapters.len(),
        output_bytes: json.len(),
    })
}

// ── Pipeline ─────────────────────────────────────────────────────────────────

fn run_pipeline(text: &str, config: &CompileConfig) -> Book {
    let text = lexer::normalise_line_endings(text);

    let metadata = metadata::extract_metadata(&text);
    let cleaned = clean::clean_document(&text);
    debug!("Cleaned body: {} bytes", cleaned.len());

    let sections = split::split_sections(&cleaned);
    let pagination = paginate::paginate(&sections, &metadata, config);
    let chapters = index::build_chapters(&cleaned, &pagination.pages, &pagination.heading_pages);

    let total_pages = pagination.pages.len();
    Book {
        metadata,
        pages: pagination.pages,
        chapters,
        total_pages,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "pipeline panicked".to_string()
    }
}

// ── File I/O ─────────────────────────────────────────────────────────────────

/// Read a manuscript file as UTF-8 text.
///
/// # Errors
/// `FileNotFound`, `PermissionDenied`, `InvalidUtf8`, or `ReadFailed` for any
/// other I/O failure.
pub fn read_manuscript(path: impl AsRef<Path>) -> Result<String, Md2BookError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Md2BookError::FileNotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::PermissionDenied => Md2BookError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => Md2BookError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());

    String::from_utf8(bytes).map_err(|_| Md2BookError::InvalidUtf8 {
        path: path.to_path_buf(),
    })
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), Md2BookError> {
    let write_err = |e: std::io::Error| Md2BookError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, contents).map_err(write_err)?;
    std::fs::rename(&tmp_path, path).map_err(write_err)
}
