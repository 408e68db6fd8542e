//! Page rasterisation: turn PDF pages into RGB pixel buffers via pdfium.
//!
//! Everything in this module is blocking. pdfium keeps thread-local state and
//! must not run on an async worker thread, so the async entry points in
//! [`crate::convert`] call into here from `spawn_blocking`.
//!
//! The assembler never talks to pdfium directly; it walks a [`PageSource`].
//! [`PdfPageSource`] is the pdfium-backed implementation and tests supply
//! synthetic ones.

use crate::error::Pdf2PptxError;
use crate::geometry::PageSize;
use crate::output::DocumentMetadata;
use image::{DynamicImage, Rgb, RgbImage};
use pdfium_render::prelude::*;
use tracing::{debug, info};

/// An 8-bit RGB raster of one page. No alpha channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pixels: RgbImage,
}

impl RasterImage {
    /// Build an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> [u8; 3],
    {
        Self {
            pixels: RgbImage::from_fn(width, height, |x, y| Rgb(f(x, y))),
        }
    }

    /// Convert any decoded image to RGB, discarding alpha.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self {
            pixels: image.to_rgb8(),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Row-major `RGBRGB…` bytes.
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.pixels
    }
}

impl From<RgbImage> for RasterImage {
    fn from(pixels: RgbImage) -> Self {
        Self { pixels }
    }
}

/// A read-only, ordered sequence of pages that can be measured and
/// rasterised on demand.
///
/// Indices are 0-based.
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Intrinsic size of page `index`, in PDF points.
    fn page_size(&self, index: usize) -> Result<PageSize, Pdf2PptxError>;

    /// Render page `index`. Must be deterministic.
    fn rasterize(&self, index: usize) -> Result<RasterImage, Pdf2PptxError>;
}

/// A [`PageSource`] backed by a pdfium document.
pub struct PdfPageSource<'a> {
    document: PdfDocument<'a>,
    render_config: PdfRenderConfig,
}

impl<'a> PdfPageSource<'a> {
    /// Open `bytes` as a PDF. Pages are rendered at `render_scale` pixels per
    /// point.
    pub fn load(
        pdfium: &'a Pdfium,
        bytes: &'a [u8],
        password: Option<&'a str>,
        render_scale: f32,
    ) -> Result<Self, Pdf2PptxError> {
        let document = pdfium
            .load_pdf_from_byte_slice(bytes, password)
            .map_err(|e| load_error(e, password.is_some()))?;

        info!(
            "PDF loaded: {} pages, version {:?}",
            document.pages().len(),
            document.version()
        );

        let render_config = PdfRenderConfig::new().scale_page_by_factor(render_scale);
        Ok(Self {
            document,
            render_config,
        })
    }

    /// Document metadata; reads the info dictionary only, renders nothing.
    pub fn metadata(&self) -> DocumentMetadata {
        let metadata = self.document.metadata();
        let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
            metadata.get(tag).and_then(|t| {
                let v = t.value().trim().to_string();
                if v.is_empty() {
                    None
                } else {
                    Some(v)
                }
            })
        };

        DocumentMetadata {
            title: get_meta(PdfDocumentMetadataTagType::Title),
            author: get_meta(PdfDocumentMetadataTagType::Author),
            subject: get_meta(PdfDocumentMetadataTagType::Subject),
            creator: get_meta(PdfDocumentMetadataTagType::Creator),
            producer: get_meta(PdfDocumentMetadataTagType::Producer),
            creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
            modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
            page_count: self.page_count(),
            pdf_version: format!("{:?}", self.document.version()),
        }
    }

    fn page(&self, index: usize) -> Result<PdfPage<'_>, Pdf2PptxError> {
        let page_error = |detail: String| Pdf2PptxError::SourceDecode {
            page: Some(index + 1),
            detail,
        };
        let idx = u16::try_from(index).map_err(|_| page_error("page index out of range".into()))?;
        self.document
            .pages()
            .get(idx)
            .map_err(|e| page_error(format!("{e:?}")))
    }
}

impl PageSource for PdfPageSource<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_size(&self, index: usize) -> Result<PageSize, Pdf2PptxError> {
        let page = self.page(index)?;
        Ok(PageSize::new(
            page.width().value as f64,
            page.height().value as f64,
        ))
    }

    fn rasterize(&self, index: usize) -> Result<RasterImage, Pdf2PptxError> {
        let page = self.page(index)?;
        let bitmap = page.render_with_config(&self.render_config).map_err(|e| {
            Pdf2PptxError::SourceDecode {
                page: Some(index + 1),
                detail: format!("{e:?}"),
            }
        })?;

        let image = RasterImage::from_dynamic(bitmap.as_image());
        debug!(
            "Rendered page {} → {}x{} px",
            index + 1,
            image.width(),
            image.height()
        );
        Ok(image)
    }
}

/// Map a pdfium load failure onto the error taxonomy.
fn load_error(e: PdfiumError, password_given: bool) -> Pdf2PptxError {
    let err_str = format!("{e:?}");
    if err_str.contains("Password") || err_str.contains("password") {
        if password_given {
            Pdf2PptxError::WrongPassword
        } else {
            Pdf2PptxError::PasswordRequired
        }
    } else {
        Pdf2PptxError::SourceDecode {
            page: None,
            detail: err_str,
        }
    }
}

/// Bind to a pdfium library.
///
/// Tries the cached or auto-downloaded copy managed by `pdfium-auto` first
/// (honouring `PDFIUM_LIB_PATH`), then a system-wide installation.
pub fn bind_pdfium() -> Result<Pdfium, Pdf2PptxError> {
    match pdfium_auto::bind_pdfium_silent() {
        Ok(pdfium) => Ok(pdfium),
        Err(auto_err) => {
            debug!("pdfium-auto unavailable ({auto_err}); trying system library");
            Pdfium::bind_to_system_library()
                .map(Pdfium::new)
                .map_err(|e| {
                    Pdf2PptxError::PdfiumBindingFailed(format!("{auto_err}; system library: {e:?}"))
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn from_fn_fills_pixels() {
        let img = RasterImage::from_fn(3, 2, |x, y| [x as u8, y as u8, 9]);
        assert_eq!((img.width(), img.height()), (3, 2));
        assert_eq!(img.as_raw().len(), 3 * 2 * 3);
        assert_eq!(&img.as_raw()[..6], &[0, 0, 9, 1, 0, 9]);
    }

    #[test]
    fn from_dynamic_drops_alpha() {
        let rgba = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 0]));
        let img = RasterImage::from_dynamic(DynamicImage::ImageRgba8(rgba));
        assert_eq!(img.as_raw().len(), 4 * 4 * 3);
        assert_eq!(&img.as_raw()[..3], &[10, 20, 30]);
    }

    #[test]
    fn password_errors_are_classified() {
        let internal = PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError);
        assert!(matches!(
            load_error(internal, false),
            Pdf2PptxError::PasswordRequired
        ));
        let internal = PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError);
        assert!(matches!(
            load_error(internal, true),
            Pdf2PptxError::WrongPassword
        ));
        let internal = PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::FormatError);
        assert!(matches!(
            load_error(internal, false),
            Pdf2PptxError::SourceDecode { page: None, .. }
        ));
    }
}
