//! Configuration types for manuscript-to-book compilation.
//!
//! All compilation behaviour is controlled through [`CompileConfig`], built
//! via its [`CompileConfigBuilder`]. The knobs are few on purpose: the page
//! budget, how much shorter chapter openings are, and whether a title page is
//! generated. Two compilations with equal configs and equal input text always
//! produce equal books.

use crate::error::Md2BookError;
use serde::{Deserialize, Serialize};

/// Configuration for a manuscript compilation.
///
/// Built via [`CompileConfig::builder()`] or using
/// [`CompileConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_md2book::{CompileConfig, TitlePagePolicy};
///
/// let config = CompileConfig::builder()
///     .words_per_page(300)
///     .title_page(TitlePagePolicy::Always)
///     .build()
///     .unwrap();
/// assert_eq!(config.chapter_opening_budget(), 180);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileConfig {
    /// Base word budget of a body page. Default: 280.
    ///
    /// Pages are packed paragraph by paragraph; a paragraph is never split, so
    /// a single paragraph longer than the budget occupies a page on its own.
    pub words_per_page: usize,

    /// Fraction of [`words_per_page`](Self::words_per_page) allowed on the
    /// first page of a chapter. Range: (0, 1]. Default: 0.6.
    ///
    /// Chapter openings carry a heading and read as visually-led pages, so
    /// they hold less text.
    pub chapter_opening_ratio: f32,

    /// Whether a generated title page precedes the body. Default: [`TitlePagePolicy::Auto`].
    pub title_page: TitlePagePolicy,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            words_per_page: 280,
            chapter_opening_ratio: 0.6,
            title_page: TitlePagePolicy::default(),
        }
    }
}

impl CompileConfig {
    /// Create a new builder for `CompileConfig`.
    pub fn builder() -> CompileConfigBuilder {
        CompileConfigBuilder {
            config: Self::default(),
        }
    }

    /// Word budget applied to a section's pages.
    pub fn budget_for(&self, is_chapter_start: bool) -> usize {
        if is_chapter_start {
            self.chapter_opening_budget()
        } else {
            self.words_per_page.max(1)
        }
    }

    /// Word budget of a chapter's opening pages, `floor(words_per_page × ratio)`, at least 1.
    pub fn chapter_opening_budget(&self) -> usize {
        // f32 ratios are inexact (0.7 → 0.69999...); nudge before flooring.
        let scaled =
            (self.words_per_page as f64 * f64::from(self.chapter_opening_ratio) + 1e-4).floor();
        (scaled as usize).max(1)
    }

    /// Whether a title page is generated for a book with or without a cover.
    pub fn wants_title_page(&self, has_cover_image: bool) -> bool {
        match self.title_page {
            TitlePagePolicy::Auto => has_cover_image,
            TitlePagePolicy::Always => true,
            TitlePagePolicy::Never => false,
        }
    }
}

/// Builder for [`CompileConfig`].
#[derive(Debug)]
pub struct CompileConfigBuilder {
    config: CompileConfig,
}

impl CompileConfigBuilder {
    pub fn words_per_page(mut self, words: usize) -> Self {
        self.config.words_per_page = words.max(1);
        self
    }

    pub fn chapter_opening_ratio(mut self, ratio: f32) -> Self {
        self.config.chapter_opening_ratio = ratio;
        self
    }

    pub fn title_page(mut self, policy: TitlePagePolicy) -> Self {
        self.config.title_page = policy;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CompileConfig, Md2BookError> {
        let c = &self.config;
        if c.words_per_page == 0 {
            return Err(Md2BookError::InvalidConfig(
                "words_per_page must be ≥ 1".into(),
            ));
        }
        if !c.chapter_opening_ratio.is_finite()
            || c.chapter_opening_ratio <= 0.0
            || c.chapter_opening_ratio > 1.0
        {
            return Err(Md2BookError::InvalidConfig(format!(
                "chapter_opening_ratio must be in (0, 1], got {}",
                c.chapter_opening_ratio
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// When to put a generated title page in front of the body pages.
///
/// The viewer shows the cover image on its own cover screen; the title page is
/// the first *page* of the book and repeats title, subtitle and author in
/// text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitlePagePolicy {
    /// Only when a cover image was found. (default)
    #[default]
    Auto,
    /// Always generate a title page.
    Always,
    /// Never generate a title page.
    Never,
}
