//! Configuration types for PDF-to-PPTX conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The defaults reproduce the plain
//! "one page, one slide" conversion: every page, 72 DPI, last page decides the
//! slide size.

use crate::error::Pdf2PptxError;
use crate::geometry::Canvas;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest accepted rendering DPI (one pixel per PDF point).
pub const MIN_DPI: u32 = 72;
/// Highest accepted rendering DPI.
pub const MAX_DPI: u32 = 400;

/// Configuration for a PDF-to-PPTX conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2pptx::{CanvasPolicy, ConversionConfig, PageSelection};
///
/// let config = ConversionConfig::builder()
///     .dpi(144)
///     .pages(PageSelection::Range(1, 10))
///     .canvas_policy(CanvasPolicy::FirstPage)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Rendering DPI used when rasterising each PDF page. Range: 72–400. Default: 72.
    ///
    /// At 72 DPI one pixel is rendered per PDF point. Raising it makes the
    /// slide images sharper on large screens at the cost of a bigger `.pptx`;
    /// the slide geometry does not change.
    pub dpi: u32,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Page selection. Default: All pages.
    pub pages: PageSelection,

    /// How the deck-wide slide size is chosen. Default: [`CanvasPolicy::LastPage`].
    pub canvas_policy: CanvasPolicy,

    /// Title written into the package's core properties.
    /// If None, the PDF's own title metadata is used when present.
    pub title: Option<String>,

    /// Author written as the package's creator.
    /// If None, the PDF's author metadata is used when present.
    pub author: Option<String>,

    /// Optional progress callback for per-page events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: MIN_DPI,
            password: None,
            pages: PageSelection::default(),
            canvas_policy: CanvasPolicy::default(),
            title: None,
            author: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pages", &self.pages)
            .field("canvas_policy", &self.canvas_policy)
            .field("title", &self.title)
            .field("author", &self.author)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Rasterisation scale relative to one pixel per point.
    pub fn render_scale(&self) -> f32 {
        self.dpi as f32 / MIN_DPI as f32
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn canvas_policy(mut self, policy: CanvasPolicy) -> Self {
        self.config.canvas_policy = policy;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.config.author = Some(author.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2PptxError> {
        let c = &self.config;
        if !(MIN_DPI..=MAX_DPI).contains(&c.dpi) {
            return Err(Pdf2PptxError::InvalidConfig(format!(
                "DPI must be {MIN_DPI}–{MAX_DPI}, got {}",
                c.dpi
            )));
        }
        match &c.pages {
            PageSelection::Single(0) => {
                return Err(Pdf2PptxError::InvalidConfig(
                    "Pages are 1-indexed, minimum is 1".into(),
                ))
            }
            PageSelection::Range(start, end) if start > end => {
                return Err(Pdf2PptxError::InvalidConfig(format!(
                    "Invalid page range {start}-{end}: start must be <= end"
                )))
            }
            PageSelection::Set(pages) if pages.is_empty() => {
                return Err(Pdf2PptxError::InvalidConfig("Empty page set".into()))
            }
            _ => {}
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Specifies which pages of the PDF become slides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Convert all pages (default).
    #[default]
    All,
    /// Convert a single page (1-indexed).
    Single(usize),
    /// Convert a contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Convert specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}

/// How the single, presentation-wide slide size is chosen when pages differ.
///
/// A `.pptx` package stores exactly one slide size, so a document mixing
/// portrait and landscape pages cannot give every slide its own canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CanvasPolicy {
    /// The slide size is re-set from every page and the last page wins.
    /// Each image is placed against its own page's canvas, so slides whose
    /// page size differs from the last page may be letterboxed off-centre.
    #[default]
    LastPage,
    /// The first selected page sets the slide size; every image is fitted
    /// into that canvas.
    FirstPage,
    /// The slide size is the largest width and largest height over all
    /// selected pages; every image is fitted into that canvas.
    Largest,
}

impl CanvasPolicy {
    /// Deck canvas decided before the page loop, or `None` when the
    /// canvas is tracked page by page.
    pub fn resolve_upfront<I>(&self, page_canvases: I) -> Option<Canvas>
    where
        I: IntoIterator<Item = Canvas>,
    {
        let mut canvases = page_canvases.into_iter();
        match self {
            CanvasPolicy::LastPage => None,
            CanvasPolicy::FirstPage => canvases.next(),
            CanvasPolicy::Largest => canvases.reduce(Canvas::union),
        }
    }
}

impl fmt::Display for CanvasPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CanvasPolicy::LastPage => "last-page",
            CanvasPolicy::FirstPage => "first-page",
            CanvasPolicy::Largest => "largest",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ConversionConfig::default();
        assert_eq!(c.dpi, 72);
        assert_eq!(c.render_scale(), 1.0);
        assert_eq!(c.pages, PageSelection::All);
        assert_eq!(c.canvas_policy, CanvasPolicy::LastPage);
    }

    #[test]
    fn builder_rejects_out_of_range_dpi() {
        assert!(ConversionConfig::builder().dpi(50).build().is_err());
        assert!(ConversionConfig::builder().dpi(401).build().is_err());
        let c = ConversionConfig::builder().dpi(144).build().unwrap();
        assert_eq!(c.render_scale(), 2.0);
    }

    #[test]
    fn builder_rejects_bad_selection() {
        assert!(ConversionConfig::builder()
            .pages(PageSelection::Range(5, 2))
            .build()
            .is_err());
        assert!(ConversionConfig::builder()
            .pages(PageSelection::Single(0))
            .build()
            .is_err());
        assert!(ConversionConfig::builder()
            .pages(PageSelection::Set(vec![]))
            .build()
            .is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let c = ConversionConfig::builder()
            .password("hunter2")
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn page_selection_to_indices() {
        assert_eq!(PageSelection::All.to_indices(5), vec![0, 1, 2, 3, 4]);
        assert_eq!(PageSelection::Single(3).to_indices(5), vec![2]);
        assert_eq!(PageSelection::Single(6).to_indices(5), Vec::<usize>::new());
        assert_eq!(PageSelection::Range(2, 4).to_indices(5), vec![1, 2, 3]);
        assert_eq!(PageSelection::Range(3, 10).to_indices(4), vec![2, 3]);
        assert_eq!(
            PageSelection::Set(vec![3, 1, 3]).to_indices(5),
            vec![0, 2] // deduplicated and sorted
        );
    }

    #[test]
    fn canvas_policy_resolution() {
        let pages = [Canvas::new(8.5, 11.0), Canvas::new(11.0, 8.5)];
        assert_eq!(CanvasPolicy::LastPage.resolve_upfront(pages), None);
        assert_eq!(
            CanvasPolicy::FirstPage.resolve_upfront(pages),
            Some(Canvas::new(8.5, 11.0))
        );
        assert_eq!(
            CanvasPolicy::Largest.resolve_upfront(pages),
            Some(Canvas::new(11.0, 11.0))
        );
        assert_eq!(CanvasPolicy::Largest.resolve_upfront(Vec::new()), None);
    }
}
