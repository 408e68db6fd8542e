//! Result types returned by the conversion entry points.

use crate::geometry::{Canvas, Emu};
use serde::{Deserialize, Serialize};

/// MIME type of a PowerPoint Open XML presentation.
pub const PPTX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// File extension of the output package (without the dot).
pub const PPTX_EXTENSION: &str = "pptx";

/// A finished conversion: the `.pptx` bytes plus what was learned on the way.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    /// The serialised presentation package.
    pub pptx: Vec<u8>,
    /// Metadata read from the source PDF.
    pub metadata: DocumentMetadata,
    /// Counters and timings.
    pub stats: ConversionStats,
}

/// Document-level metadata read from the PDF without rendering any page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

/// Counters and timings for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages in the source document.
    pub total_pages: usize,
    /// Slides written, one per selected page.
    pub slide_count: usize,
    /// Final slide width in EMU.
    pub slide_width_emu: i64,
    /// Final slide height in EMU.
    pub slide_height_emu: i64,
    /// Size of the `.pptx` package in bytes.
    pub output_bytes: usize,
    /// Time spent rasterising and encoding pages.
    pub render_duration_ms: u64,
    /// Wall-clock time for the whole conversion.
    pub total_duration_ms: u64,
}

impl ConversionStats {
    /// The slide canvas in inches.
    pub fn canvas(&self) -> Canvas {
        Canvas::new(
            Emu(self.slide_width_emu).to_inches(),
            Emu(self.slide_height_emu).to_inches(),
        )
    }
}

/// Derive the output file name for `input_name` by swapping its extension
/// for `.pptx`.
///
/// ```
/// assert_eq!(pdf2pptx::output_file_name("deck.pdf"), "deck.pptx");
/// assert_eq!(pdf2pptx::output_file_name("notes"), "notes.pptx");
/// ```
pub fn output_file_name(input_name: &str) -> String {
    std::path::Path::new(input_name)
        .with_extension(PPTX_EXTENSION)
        .to_string_lossy()
        .into_owned()
}
