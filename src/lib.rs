//! # pdf2pptx
//!
//! Convert PDF documents into PowerPoint (`.pptx`) decks: every page becomes
//! one slide holding a single full-bleed image of that page, scaled
//! uniformly and centred so nothing is cropped or distorted.
//!
//! The output is raster-only. Text and vector content are not preserved;
//! what you get is a faithful picture of each page that opens in PowerPoint,
//! Keynote, LibreOffice Impress and Google Slides.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Input     validate the %PDF header
//!  ├─ 2. Render    rasterise each page via pdfium (blocking, spawn_blocking in async)
//!  ├─ 3. Fit       scale + centre the image inside the slide canvas
//!  ├─ 4. Slide     PNG-encode and append one picture slide per page
//!  └─ 5. Package   zip the PresentationML parts into .pptx bytes
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2pptx::{convert_to_file, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder().dpi(144).build()?;
//!     let stats = convert_to_file("report.pdf", "report.pptx", &config).await?;
//!     eprintln!("{} slides, {} bytes", stats.slide_count, stats.output_bytes);
//!     Ok(())
//! }
//! ```
//!
//! ## Slide size
//!
//! A `.pptx` has one slide size for the whole deck. With mixed page sizes
//! the [`CanvasPolicy`] decides which one wins; the default,
//! [`CanvasPolicy::LastPage`], lets the last page set the deck size.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2pptx` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2pptx = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod geometry;
pub mod output;
pub mod pipeline;
pub mod pptx;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{CanvasPolicy, ConversionConfig, ConversionConfigBuilder, PageSelection};
pub use convert::{
    convert, convert_bytes, convert_file, convert_pages, convert_sync, convert_to_file, inspect,
};
pub use error::{ErrorCategory, Pdf2PptxError};
pub use geometry::{fit_and_center, Canvas, Emu, FitAxis, PageSize, Placement};
pub use output::{
    output_file_name, ConversionOutput, ConversionStats, DocumentMetadata, PPTX_EXTENSION,
    PPTX_MIME_TYPE,
};
pub use pipeline::assemble::{AssembledDeck, AssemblyState, DocumentAssembler};
pub use pipeline::render::{PageSource, RasterImage};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
