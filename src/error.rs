//! Error types for the pdf2pptx library.
//!
//! Conversion is all-or-nothing: a single page that cannot be rendered or
//! placed aborts the whole document and no `.pptx` bytes are produced. There
//! is therefore one fatal error type, [`Pdf2PptxError`], returned from every
//! public entry point.
//!
//! Variants are grouped into coarse [`ErrorCategory`] buckets so callers
//! (and the CLI) can decide how to present a failure without matching on
//! every individual variant.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2pptx library.
#[derive(Debug, Error)]
pub enum Pdf2PptxError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The bytes were read, but they do not carry a PDF header.
    #[error("Input is not a valid PDF (first bytes: {magic:?})")]
    NotAPdf { magic: [u8; 4] },

    // ── Source decoding ───────────────────────────────────────────────────
    /// The document could not be parsed, or a specific page could not be rendered.
    #[error("{}", source_decode_message(*page, detail))]
    SourceDecode { page: Option<usize>, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired,

    /// A password was provided but it is wrong.
    #[error("Wrong password for encrypted PDF")]
    WrongPassword,

    // ── Geometry ──────────────────────────────────────────────────────────
    /// A page or rendered image has a zero (or non-finite) dimension, so its
    /// aspect ratio is undefined.
    #[error("Degenerate {subject}: {width} x {height} has no defined aspect ratio")]
    DegenerateGeometry {
        subject: &'static str,
        width: f64,
        height: f64,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The assembled presentation could not be written into a `.pptx` package.
    #[error("Failed to serialise presentation: {detail}")]
    Serialization { detail: String },

    /// Could not create or write the output `.pptx` file.
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

    /// The page selection matched no pages of the document.
    #[error("No pages selected for conversion (document has {total} pages)")]
    NoPagesSelected { total: usize },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDFium is normally downloaded automatically on first run.\n\
If the auto-download failed, you can:\n\
  • Check your internet connection and try again.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn source_decode_message(page: Option<usize>, detail: &str) -> String {
    match page {
        Some(p) => format!("Page {p} could not be rendered: {detail}"),
        None => format!("PDF could not be decoded: {detail}"),
    }
}

/// Coarse classification of a [`Pdf2PptxError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The input is not a readable document, or a page failed to render.
    SourceDecode,
    /// A zero-sized page or image.
    DegenerateGeometry,
    /// The output package could not be produced.
    Serialization,
    /// Filesystem access on either side of the conversion.
    Io,
    /// Invalid configuration or environment (including a missing pdfium).
    Configuration,
    /// A bug or a panicked worker.
    Internal,
}

impl Pdf2PptxError {
    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SourceDecode { .. }
            | Self::NotAPdf { .. }
            | Self::PasswordRequired
            | Self::WrongPassword => ErrorCategory::SourceDecode,
            Self::DegenerateGeometry { .. } => ErrorCategory::DegenerateGeometry,
            Self::Serialization { .. } => ErrorCategory::Serialization,
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::OutputWriteFailed { .. } => ErrorCategory::Io,
            Self::InvalidConfig(_)
            | Self::NoPagesSelected { .. }
            | Self::PdfiumBindingFailed(_) => ErrorCategory::Configuration,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    pub(crate) fn serialization(e: impl std::fmt::Display) -> Self {
        Self::Serialization {
            detail: e.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for Pdf2PptxError {
    fn from(e: zip::result::ZipError) -> Self {
        Self::serialization(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_decode_display_with_page() {
        let e = Pdf2PptxError::SourceDecode {
            page: Some(3),
            detail: "bad stream".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Page 3"), "got: {msg}");
        assert!(msg.contains("bad stream"));
    }

    #[test]
    fn source_decode_display_without_page() {
        let e = Pdf2PptxError::SourceDecode {
            page: None,
            detail: "no trailer".into(),
        };
        assert!(e.to_string().starts_with("PDF could not be decoded"));
    }

    #[test]
    fn degenerate_geometry_display() {
        let e = Pdf2PptxError::DegenerateGeometry {
            subject: "image",
            width: 800.0,
            height: 0.0,
        };
        let msg = e.to_string();
        assert!(msg.contains("image"));
        assert!(msg.contains("800 x 0"), "got: {msg}");
    }

    #[test]
    fn categories() {
        assert_eq!(
            Pdf2PptxError::NotAPdf {
                magic: *b"PK\x03\x04",
            }
            .category(),
            ErrorCategory::SourceDecode
        );
        assert_eq!(
            Pdf2PptxError::WrongPassword.category(),
            ErrorCategory::SourceDecode
        );
        assert_eq!(
            Pdf2PptxError::serialization("disk full").category(),
            ErrorCategory::Serialization
        );
        assert_eq!(
            Pdf2PptxError::NoPagesSelected { total: 4 }.category(),
            ErrorCategory::Configuration
        );
    }
}
