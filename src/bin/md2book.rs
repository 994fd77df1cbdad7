//! CLI binary for edgequake-md2book.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `CompileConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_md2book::{
    compile, inspect, read_manuscript, write_book, Book, CompileConfig, Metadata,
    TitlePagePolicy,
};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Compile to JSON on stdout
  md2book manuscript.md

  # Compile to a file (written atomically)
  md2book manuscript.md -o book.json

  # Read from stdin
  cat manuscript.md | md2book -

  # Shorter pages, no title page
  md2book --words-per-page 200 --title-page never manuscript.md

  # Print the chapter outline with page numbers
  md2book --toc manuscript.md

  # Print extracted metadata only
  md2book --inspect-only manuscript.md

HEADER BLOCK:
  ---
  title: The Long Road
  subtitle: A Journey
  author: Jo Writer
  cover_image: https://cdn.example.org/cover.jpg
  purchase_link: https://shop.example.org/long-road
  purchase_text: Buy the paperback
  price: $12
  ---

ENVIRONMENT VARIABLES:
  MD2BOOK_*   Every flag can be set from the environment (see --help)
  RUST_LOG    Override the log filter (e.g. RUST_LOG=edgequake_md2book=debug)
"#;

/// Compile a Markdown manuscript into a paginated book.
#[derive(Parser, Debug)]
#[command(
    name = "md2book",
    version,
    about = "Compile a Markdown manuscript into a paginated book with a chapter index",
    long_about = "Compile a single Markdown manuscript into a paginated book: metadata from the \
header block, word-budgeted pages of viewer markup, and a hierarchical chapter index with page \
numbers. Output is JSON consumed by the book viewer.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Manuscript path, or `-` to read from stdin.
    input: String,

    /// Write the book JSON to this file instead of stdout.
    #[arg(short, long, env = "MD2BOOK_OUTPUT")]
    output: Option<PathBuf>,

    /// Word budget of a body page.
    #[arg(long, env = "MD2BOOK_WORDS_PER_PAGE", default_value_t = 280,
          value_parser = clap::value_parser!(u64).range(1..))]
    words_per_page: u64,

    /// Fraction of the budget used on chapter-opening pages (0, 1].
    #[arg(long, env = "MD2BOOK_CHAPTER_RATIO", default_value_t = 0.6)]
    chapter_ratio: f32,

    /// Title page generation: auto (only with a cover image), always, never.
    #[arg(long, env = "MD2BOOK_TITLE_PAGE", value_enum, default_value = "auto")]
    title_page: TitlePageArg,

    /// Print the chapter outline instead of JSON.
    #[arg(long, env = "MD2BOOK_TOC")]
    toc: bool,

    /// Print extracted metadata only, no compilation.
    #[arg(long, env = "MD2BOOK_INSPECT_ONLY")]
    inspect_only: bool,

    /// Emit compact JSON instead of pretty-printed.
    #[arg(long, env = "MD2BOOK_COMPACT")]
    compact: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MD2BOOK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MD2BOOK_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum TitlePageArg {
    Auto,
    Always,
    Never,
}

impl From<TitlePageArg> for TitlePagePolicy {
    fn from(v: TitlePageArg) -> Self {
        match v {
            TitlePageArg::Auto => TitlePagePolicy::Auto,
            TitlePageArg::Always => TitlePagePolicy::Always,
            TitlePageArg::Never => TitlePagePolicy::Never,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let text = read_input(&cli.input)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&text);
        print_json(&meta, cli.compact).context("Failed to serialise metadata")?;
        return Ok(());
    }

    // ── Compile ──────────────────────────────────────────────────────────
    let config = build_config(&cli)?;
    let book = compile(&text, &config).context("Compilation failed")?;

    if cli.toc {
        print_toc(&book)?;
    } else if let Some(ref output_path) = cli.output {
        let stats = write_book(&book, output_path, !cli.compact)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        if !cli.quiet {
            eprintln!(
                "{}  {} pages  {} chapters  {}  →  {}",
                green("✔"),
                stats.total_pages,
                stats.chapters,
                dim(&format!("{} bytes", stats.output_bytes)),
                bold(&output_path.display().to_string()),
            );
        }
    } else {
        print_json(&book, cli.compact).context("Failed to serialise book")?;
        if !cli.quiet {
            eprintln!(
                "Compiled '{}': {} pages, {} chapters",
                book.metadata.title,
                book.total_pages,
                book.chapters.len()
            );
        }
    }

    Ok(())
}

/// Map CLI args to `CompileConfig`.
fn build_config(cli: &Cli) -> Result<CompileConfig> {
    let words_per_page =
        usize::try_from(cli.words_per_page).context("--words-per-page is too large")?;
    CompileConfig::builder()
        .words_per_page(words_per_page)
        .chapter_opening_ratio(cli.chapter_ratio)
        .title_page(cli.title_page.clone().into())
        .build()
        .context("Invalid configuration")
}

/// Read the manuscript from a path, or from stdin for `-`.
///
/// Path errors keep the library's typed message (not found, permission,
/// not UTF-8) so the hint reaches the user.
fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read manuscript from stdin")?;
        return Ok(buf);
    }
    Ok(read_manuscript(input)?)
}

fn print_json<T: serde::Serialize>(value: &T, compact: bool) -> Result<()> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{json}").context("Failed to write to stdout")?;
    Ok(())
}

/// Indented outline: two spaces per level below `##`, then the page.
fn print_toc(book: &Book) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    print_header(&mut handle, &book.metadata)?;
    for ch in &book.chapters {
        let indent = "  ".repeat(usize::from(ch.level.saturating_sub(2)));
        writeln!(handle, "{indent}{}  p. {}", ch.title, ch.page_number)
            .context("Failed to write to stdout")?;
    }
    Ok(())
}

fn print_header(out: &mut impl Write, meta: &Metadata) -> Result<()> {
    writeln!(out, "{}", meta.title)?;
    if let Some(ref s) = meta.subtitle {
        writeln!(out, "{s}")?;
    }
    writeln!(out, "by {}", meta.author)?;
    writeln!(out)?;
    Ok(())
}
