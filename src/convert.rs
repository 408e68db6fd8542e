//! Conversion entry points.
//!
//! [`convert`] is the core `bytes → bytes` call and is fully blocking. The
//! async variants read input with `tokio::fs` and move the pdfium work onto
//! `spawn_blocking` so async worker threads never stall on rendering.

use crate::config::ConversionConfig;
use crate::error::Pdf2PptxError;
use crate::output::{ConversionOutput, ConversionStats, DocumentMetadata};
use crate::pipeline::assemble::DocumentAssembler;
use crate::pipeline::input;
use crate::pipeline::render::{self, PageSource, PdfPageSource};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Convert PDF bytes into a `.pptx` package.
///
/// Every selected page becomes one slide holding a single image of that
/// page, scaled to fit and centred. Conversion is all-or-nothing: the first
/// page that fails aborts the whole document.
///
/// This call blocks while pdfium renders; from async code use
/// [`convert_bytes`] or [`convert_file`].
///
/// # Example
/// ```rust,no_run
/// use pdf2pptx::{convert, ConversionConfig};
///
/// let pdf = std::fs::read("slides.pdf")?;
/// let output = convert(&pdf, &ConversionConfig::default())?;
/// std::fs::write("slides.pptx", &output.pptx)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn convert(bytes: &[u8], config: &ConversionConfig) -> Result<ConversionOutput, Pdf2PptxError> {
    let start = Instant::now();
    input::validate_pdf_bytes(bytes)?;

    let pdfium = render::bind_pdfium()?;
    let source = PdfPageSource::load(
        &pdfium,
        bytes,
        config.password.as_deref(),
        config.render_scale(),
    )?;
    let metadata = source.metadata();
    assemble_output(&source, metadata, config, start)
}

/// Convert an arbitrary [`PageSource`] into a `.pptx` package.
///
/// Used for sources that are not pdfium documents; metadata is limited to
/// the page count.
pub fn convert_pages(
    source: &dyn PageSource,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2PptxError> {
    let metadata = DocumentMetadata {
        page_count: source.page_count(),
        ..Default::default()
    };
    assemble_output(source, metadata, config, Instant::now())
}

fn assemble_output(
    source: &dyn PageSource,
    metadata: DocumentMetadata,
    config: &ConversionConfig,
    start: Instant,
) -> Result<ConversionOutput, Pdf2PptxError> {
    let total_pages = source.page_count();
    info!(
        "Converting {} pages (dpi={}, canvas={})",
        total_pages, config.dpi, config.canvas_policy
    );

    // Fall back to the PDF's own title and author.
    let with_fallbacks;
    let needs_title = config.title.is_none() && metadata.title.is_some();
    let needs_author = config.author.is_none() && metadata.author.is_some();
    let config = if needs_title || needs_author {
        with_fallbacks = ConversionConfig {
            title: config.title.clone().or_else(|| metadata.title.clone()),
            author: config.author.clone().or_else(|| metadata.author.clone()),
            ..config.clone()
        };
        &with_fallbacks
    } else {
        config
    };

    let deck = DocumentAssembler::new(config).run(source)?;
    let (cx, cy) = deck.presentation.slide_size();
    let stats = ConversionStats {
        total_pages,
        slide_count: deck.presentation.slide_count(),
        slide_width_emu: cx.0,
        slide_height_emu: cy.0,
        output_bytes: deck.bytes.len(),
        render_duration_ms: deck.render_duration_ms,
        total_duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} slides, {} bytes, {}ms total",
        stats.slide_count, stats.output_bytes, stats.total_duration_ms
    );

    Ok(ConversionOutput {
        pptx: deck.bytes,
        metadata,
        stats,
    })
}

/// Async [`convert`] over owned bytes; rendering runs on the blocking pool.
pub async fn convert_bytes(
    bytes: Vec<u8>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2PptxError> {
    let config = config.clone();
    tokio::task::spawn_blocking(move || convert(&bytes, &config))
        .await
        .map_err(|e| Pdf2PptxError::Internal(format!("Conversion task panicked: {e}")))?
}

/// Read a PDF from disk and convert it.
pub async fn convert_file(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2PptxError> {
    let path = path.as_ref();
    info!("Starting conversion: {}", path.display());
    let bytes = input::read_pdf(path).await?;
    convert_bytes(bytes, config).await
}

/// Convert a PDF and write the `.pptx` to `output_path`.
///
/// Writes to a sibling temp file and renames it into place, so a failed
/// conversion never leaves a partial file behind.
pub async fn convert_to_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, Pdf2PptxError> {
    let output = convert_file(input_path, config).await?;
    let path = output_path.as_ref();
    let write_err = |source: std::io::Error| Pdf2PptxError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("pptx.tmp");
    tokio::fs::write(&tmp_path, &output.pptx)
        .await
        .map_err(write_err)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }
    debug!("Wrote {} ({} bytes)", path.display(), output.pptx.len());

    Ok(output.stats)
}

/// Blocking counterpart of [`convert_file`] for callers without a runtime.
pub fn convert_sync(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2PptxError> {
    let bytes = input::read_pdf_blocking(path)?;
    convert(&bytes, config)
}

/// Read PDF metadata without rendering any page.
pub async fn inspect(
    path: impl AsRef<Path>,
    password: Option<&str>,
) -> Result<DocumentMetadata, Pdf2PptxError> {
    let bytes = input::read_pdf(path).await?;
    let password = password.map(str::to_string);
    tokio::task::spawn_blocking(move || -> Result<DocumentMetadata, Pdf2PptxError> {
        let pdfium = render::bind_pdfium()?;
        let source = PdfPageSource::load(&pdfium, &bytes, password.as_deref(), 1.0)?;
        Ok(source.metadata())
    })
    .await
    .map_err(|e| Pdf2PptxError::Internal(format!("Metadata task panicked: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PageSize;
    use crate::pipeline::render::RasterImage;

    struct Blank(usize);

    impl PageSource for Blank {
        fn page_count(&self) -> usize {
            self.0
        }
        fn page_size(&self, _index: usize) -> Result<PageSize, Pdf2PptxError> {
            Ok(PageSize::new(720.0, 540.0))
        }
        fn rasterize(&self, _index: usize) -> Result<RasterImage, Pdf2PptxError> {
            Ok(RasterImage::from_fn(72, 54, |_, _| [255, 255, 255]))
        }
    }

    #[test]
    fn convert_rejects_non_pdf_before_binding() {
        let err = convert(b"not a pdf", &ConversionConfig::default()).unwrap_err();
        assert!(matches!(err, Pdf2PptxError::NotAPdf { .. }));
    }

    #[test]
    fn convert_pages_fills_stats() {
        let out = convert_pages(&Blank(2), &ConversionConfig::default()).unwrap();
        assert_eq!(out.stats.total_pages, 2);
        assert_eq!(out.stats.slide_count, 2);
        assert_eq!(out.stats.slide_width_emu, 9_144_000);
        assert_eq!(out.stats.slide_height_emu, 6_858_000);
        assert_eq!(out.stats.output_bytes, out.pptx.len());
        assert_eq!(out.metadata.page_count, 2);
    }

    fn core_xml(pptx: Vec<u8>) -> String {
        use std::io::Read;
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(pptx)).unwrap();
        let mut xml = String::new();
        archive
            .by_name("docProps/core.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn pdf_title_and_author_fill_core_properties() {
        let metadata = DocumentMetadata {
            title: Some("Field Guide".into()),
            author: Some("J. Doe".into()),
            page_count: 1,
            ..Default::default()
        };
        let config = ConversionConfig::default();
        let out = assemble_output(&Blank(1), metadata, &config, Instant::now()).unwrap();
        let core = core_xml(out.pptx);
        assert!(core.contains("<dc:title>Field Guide</dc:title>"));
        assert!(core.contains("<dc:creator>J. Doe</dc:creator>"));
    }

    #[test]
    fn configured_author_wins_over_pdf_author() {
        let metadata = DocumentMetadata {
            author: Some("Scanner".into()),
            page_count: 1,
            ..Default::default()
        };
        let config = ConversionConfig::builder().author("R&D").build().unwrap();
        let out = assemble_output(&Blank(1), metadata, &config, Instant::now()).unwrap();
        let core = core_xml(out.pptx);
        assert!(core.contains("<dc:creator>R&amp;D</dc:creator>"));
        assert!(!core.contains("Scanner"));
        assert!(!core.contains("dc:title"));
    }

    #[test]
    fn convert_sync_rejects_non_pdf_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.pdf");
        std::fs::write(&input, b"PK\x03\x04 zipped notes").unwrap();

        let err = convert_sync(&input, &ConversionConfig::default()).unwrap_err();
        match err {
            Pdf2PptxError::NotAPdf { magic } => assert_eq!(&magic, b"PK\x03\x04"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[test]
    fn convert_sync_reports_missing_input() {
        let err = convert_sync("/no/such/input.pdf", &ConversionConfig::default()).unwrap_err();
        assert!(matches!(err, Pdf2PptxError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn convert_file_reports_missing_input() {
        let err = convert_file("/no/such/input.pdf", &ConversionConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2PptxError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn convert_to_file_leaves_nothing_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        std::fs::write(&input, b"definitely not a pdf").unwrap();
        let output = dir.path().join("out.pptx");

        let err = convert_to_file(&input, &output, &ConversionConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2PptxError::NotAPdf { .. }));
        assert!(!output.exists());
        assert!(!dir.path().join("out.pptx.tmp").exists());
    }
}
