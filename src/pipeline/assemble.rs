//! Document assembly: walk a [`PageSource`] and build the output deck.
//!
//! ```text
//!        ┌──────────────── per selected page ────────────────┐
//! Idle ─▶│ page_size → canvas → rasterize → fit → SlideBuilder │─▶ Serializing ─▶ Done
//!        └──────────────────────────┬─────────────────────────┘
//!                                   └──────────▶ Failed
//! ```
//!
//! Pages are processed strictly in order and the first error aborts the
//! run. `Failed` is terminal: no bytes are produced.

use super::render::PageSource;
use crate::config::{CanvasPolicy, ConversionConfig};
use crate::error::Pdf2PptxError;
use crate::geometry::{fit_and_center, Canvas};
use crate::pptx::{Presentation, SlideBuilder};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Where an assembler is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyState {
    Idle,
    /// Working on the page at this 0-based index.
    Processing {
        page_index: usize,
    },
    Serializing,
    Done,
    Failed,
}

impl AssemblyState {
    pub fn is_terminal(self) -> bool {
        matches!(self, AssemblyState::Done | AssemblyState::Failed)
    }
}

impl fmt::Display for AssemblyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyState::Idle => f.write_str("idle"),
            AssemblyState::Processing { page_index } => {
                write!(f, "processing(page {})", page_index + 1)
            }
            AssemblyState::Serializing => f.write_str("serializing"),
            AssemblyState::Done => f.write_str("done"),
            AssemblyState::Failed => f.write_str("failed"),
        }
    }
}

/// Result of a successful [`DocumentAssembler::run`].
#[derive(Debug, Clone)]
pub struct AssembledDeck {
    /// The deck the bytes were serialised from.
    pub presentation: Presentation,
    /// The `.pptx` package.
    pub bytes: Vec<u8>,
    /// Time spent rendering and placing pages.
    pub render_duration_ms: u64,
}

/// Drives the per-page loop for one conversion.
///
/// An assembler is single-use: once it reaches `Done` or `Failed`, further
/// calls to [`run`](Self::run) fail with [`Pdf2PptxError::Internal`].
pub struct DocumentAssembler<'c> {
    config: &'c ConversionConfig,
    state: AssemblyState,
}

impl<'c> DocumentAssembler<'c> {
    pub fn new(config: &'c ConversionConfig) -> Self {
        Self {
            config,
            state: AssemblyState::Idle,
        }
    }

    pub fn state(&self) -> AssemblyState {
        self.state
    }

    fn transition(&mut self, next: AssemblyState) {
        debug!("Assembler: {} → {}", self.state, next);
        self.state = next;
    }

    /// Convert every selected page of `source` into a slide and serialise
    /// the deck.
    pub fn run(&mut self, source: &dyn PageSource) -> Result<AssembledDeck, Pdf2PptxError> {
        if self.state.is_terminal() {
            return Err(Pdf2PptxError::Internal(format!(
                "assembler already ran (state: {})",
                self.state
            )));
        }
        let result = self.assemble(source);
        if result.is_err() {
            self.transition(AssemblyState::Failed);
        }
        result
    }

    fn assemble(&mut self, source: &dyn PageSource) -> Result<AssembledDeck, Pdf2PptxError> {
        let config = self.config;
        let total_pages = source.page_count();
        let indices = config.pages.to_indices(total_pages);
        if indices.is_empty() && total_pages > 0 {
            return Err(Pdf2PptxError::NoPagesSelected { total: total_pages });
        }
        if total_pages == 0 {
            warn!("Document has no pages; writing an empty deck");
        }
        let selected = indices.len();

        let mut deck = Presentation::new();
        let properties = deck.properties_mut();
        properties.title = config.title.clone();
        properties.creator = config.author.clone();

        // Policies other than LastPage fix the deck canvas before any page
        // is placed.
        let fixed_canvas = match config.canvas_policy {
            CanvasPolicy::LastPage => None,
            policy => {
                let canvases = indices
                    .iter()
                    .map(|&idx| source.page_size(idx).map(|s| s.to_canvas()))
                    .collect::<Result<Vec<Canvas>, _>>()?;
                policy.resolve_upfront(canvases)
            }
        };
        if let Some(canvas) = fixed_canvas {
            deck.set_canvas(canvas)?;
            debug!(
                "Canvas policy {}: {:.3}in x {:.3}in",
                config.canvas_policy, canvas.width, canvas.height
            );
        }

        if let Some(cb) = &config.progress_callback {
            cb.on_conversion_start(selected);
        }

        let render_start = Instant::now();
        for &idx in &indices {
            self.transition(AssemblyState::Processing { page_index: idx });
            let page_num = idx + 1;
            if let Some(cb) = &config.progress_callback {
                cb.on_page_start(page_num, selected);
            }

            match place_page(source, idx, fixed_canvas, &mut deck) {
                Ok(png_bytes) => {
                    if let Some(cb) = &config.progress_callback {
                        cb.on_page_complete(page_num, selected, png_bytes);
                    }
                }
                Err(e) => {
                    if let Some(cb) = &config.progress_callback {
                        cb.on_page_error(page_num, selected, &e.to_string());
                    }
                    return Err(e);
                }
            }
        }
        let render_duration_ms = render_start.elapsed().as_millis() as u64;

        self.transition(AssemblyState::Serializing);
        let bytes = deck.to_bytes()?;
        self.transition(AssemblyState::Done);

        info!(
            "Assembled {} slides ({} bytes) in {}ms",
            deck.slide_count(),
            bytes.len(),
            render_duration_ms
        );
        if let Some(cb) = &config.progress_callback {
            cb.on_conversion_complete(deck.slide_count(), bytes.len());
        }

        Ok(AssembledDeck {
            presentation: deck,
            bytes,
            render_duration_ms,
        })
    }
}

/// Measure, rasterise, fit and append one page. Returns the PNG size.
fn place_page(
    source: &dyn PageSource,
    idx: usize,
    fixed_canvas: Option<Canvas>,
    deck: &mut Presentation,
) -> Result<usize, Pdf2PptxError> {
    let canvas = match fixed_canvas {
        Some(canvas) => canvas,
        None => {
            // Last page wins: the deck-wide size follows every page, while
            // this page is placed against its own canvas.
            let canvas = source.page_size(idx)?.to_canvas().validate()?;
            deck.set_canvas(canvas)?;
            canvas
        }
    };

    let image = source.rasterize(idx)?;
    let placement = fit_and_center(canvas, image.width(), image.height())?;
    let slide = SlideBuilder::new(deck).add_picture_slide(canvas, &image, placement, idx + 1)?;
    Ok(slide.image().png.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageSelection;
    use crate::geometry::{Emu, PageSize};
    use crate::pipeline::render::RasterImage;
    use crate::progress::ConversionProgressCallback;
    use std::sync::{Arc, Mutex};

    /// Pages given as point sizes; rasterised at one pixel per point.
    struct FakeSource {
        pages: Vec<(f64, f64)>,
        broken_page: Option<usize>,
    }

    impl FakeSource {
        fn new(pages: &[(f64, f64)]) -> Self {
            Self {
                pages: pages.to_vec(),
                broken_page: None,
            }
        }
    }

    impl PageSource for FakeSource {
        fn page_count(&self) -> usize {
            self.pages.len()
        }

        fn page_size(&self, index: usize) -> Result<PageSize, Pdf2PptxError> {
            let (w, h) = self.pages[index];
            Ok(PageSize::new(w, h))
        }

        fn rasterize(&self, index: usize) -> Result<RasterImage, Pdf2PptxError> {
            if self.broken_page == Some(index) {
                return Err(Pdf2PptxError::SourceDecode {
                    page: Some(index + 1),
                    detail: "broken content stream".into(),
                });
            }
            let (w, h) = self.pages[index];
            Ok(RasterImage::from_fn(w as u32, h as u32, |_, _| {
                [index as u8, 0, 0]
            }))
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl ConversionProgressCallback for Recorder {
        fn on_conversion_start(&self, total_pages: usize) {
            self.events.lock().unwrap().push(format!("start {total_pages}"));
        }
        fn on_page_complete(&self, page_num: usize, _total: usize, _bytes: usize) {
            self.events.lock().unwrap().push(format!("page {page_num}"));
        }
        fn on_page_error(&self, page_num: usize, _total: usize, _error: &str) {
            self.events.lock().unwrap().push(format!("error {page_num}"));
        }
        fn on_conversion_complete(&self, slides: usize, _bytes: usize) {
            self.events.lock().unwrap().push(format!("done {slides}"));
        }
    }

    const LETTER: (f64, f64) = (612.0, 792.0);
    const LETTER_LANDSCAPE: (f64, f64) = (792.0, 612.0);

    #[test]
    fn one_slide_per_page_in_order() {
        let config = ConversionConfig::default();
        let mut assembler = DocumentAssembler::new(&config);
        assert_eq!(assembler.state(), AssemblyState::Idle);

        let deck = assembler
            .run(&FakeSource::new(&[LETTER, LETTER, LETTER]))
            .unwrap();
        assert_eq!(assembler.state(), AssemblyState::Done);
        let pages: Vec<_> = deck
            .presentation
            .slides()
            .iter()
            .map(|s| s.source_page())
            .collect();
        assert_eq!(pages, vec![1, 2, 3]);
        assert!(deck.bytes.starts_with(b"PK"));
    }

    #[test]
    fn last_page_sets_deck_canvas() {
        let config = ConversionConfig::default();
        let deck = DocumentAssembler::new(&config)
            .run(&FakeSource::new(&[LETTER, LETTER_LANDSCAPE]))
            .unwrap();
        assert_eq!(deck.presentation.canvas(), Canvas::new(11.0, 8.5));

        // The portrait page was placed against its own 8.5 x 11 canvas.
        let first = deck.presentation.slides()[0].frame();
        assert_eq!(first.cx, Emu::from_inches(8.5));
        assert_eq!(first.cy, Emu::from_inches(11.0));
    }

    #[test]
    fn first_page_policy_letterboxes_later_pages() {
        let config = ConversionConfig::builder()
            .canvas_policy(CanvasPolicy::FirstPage)
            .build()
            .unwrap();
        let deck = DocumentAssembler::new(&config)
            .run(&FakeSource::new(&[LETTER, LETTER_LANDSCAPE]))
            .unwrap();
        assert_eq!(deck.presentation.canvas(), Canvas::new(8.5, 11.0));

        let second = deck.presentation.slides()[1].frame();
        assert_eq!(second.x, Emu(0));
        assert_eq!(second.cx, Emu::from_inches(8.5));
        assert!(second.y > Emu(0));
    }

    #[test]
    fn largest_policy_uses_bounding_canvas() {
        let config = ConversionConfig::builder()
            .canvas_policy(CanvasPolicy::Largest)
            .build()
            .unwrap();
        let deck = DocumentAssembler::new(&config)
            .run(&FakeSource::new(&[LETTER, LETTER_LANDSCAPE]))
            .unwrap();
        assert_eq!(deck.presentation.canvas(), Canvas::new(11.0, 11.0));
    }

    #[test]
    fn page_selection_limits_slides() {
        let config = ConversionConfig::builder()
            .pages(PageSelection::Set(vec![3, 1]))
            .build()
            .unwrap();
        let deck = DocumentAssembler::new(&config)
            .run(&FakeSource::new(&[LETTER; 4]))
            .unwrap();
        let pages: Vec<_> = deck
            .presentation
            .slides()
            .iter()
            .map(|s| s.source_page())
            .collect();
        assert_eq!(pages, vec![1, 3]);
    }

    #[test]
    fn empty_selection_is_an_error() {
        let config = ConversionConfig::builder()
            .pages(PageSelection::Single(9))
            .build()
            .unwrap();
        let err = DocumentAssembler::new(&config)
            .run(&FakeSource::new(&[LETTER; 2]))
            .unwrap_err();
        assert!(matches!(err, Pdf2PptxError::NoPagesSelected { total: 2 }));
    }

    #[test]
    fn broken_page_fails_whole_document() {
        let recorder = Arc::new(Recorder::default());
        let config = ConversionConfig::builder()
            .progress_callback(recorder.clone())
            .build()
            .unwrap();
        let mut source = FakeSource::new(&[LETTER; 3]);
        source.broken_page = Some(1);

        let mut assembler = DocumentAssembler::new(&config);
        let err = assembler.run(&source).unwrap_err();
        assert!(matches!(err, Pdf2PptxError::SourceDecode { page: Some(2), .. }));
        assert_eq!(assembler.state(), AssemblyState::Failed);
        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec!["start 3", "page 1", "error 2"]
        );
    }

    #[test]
    fn zero_sized_page_is_degenerate() {
        let config = ConversionConfig::default();
        let mut assembler = DocumentAssembler::new(&config);
        let err = assembler
            .run(&FakeSource::new(&[LETTER, (612.0, 0.0)]))
            .unwrap_err();
        assert!(matches!(err, Pdf2PptxError::DegenerateGeometry { .. }));
        assert_eq!(assembler.state(), AssemblyState::Failed);
    }

    #[test]
    fn progress_events_follow_page_order() {
        let recorder = Arc::new(Recorder::default());
        let config = ConversionConfig::builder()
            .progress_callback(recorder.clone())
            .build()
            .unwrap();
        DocumentAssembler::new(&config)
            .run(&FakeSource::new(&[LETTER; 2]))
            .unwrap();
        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec!["start 2", "page 1", "page 2", "done 2"]
        );
    }

    #[test]
    fn assembler_is_single_use() {
        let config = ConversionConfig::default();
        let mut assembler = DocumentAssembler::new(&config);
        assert!(!assembler.state().is_terminal());
        assembler.run(&FakeSource::new(&[LETTER])).unwrap();
        assert!(assembler.state().is_terminal());
        assert!(matches!(
            assembler.run(&FakeSource::new(&[LETTER])),
            Err(Pdf2PptxError::Internal(_))
        ));
        assert_eq!(assembler.state(), AssemblyState::Done);
    }

    #[test]
    fn failed_assembler_cannot_rerun() {
        let config = ConversionConfig::default();
        let mut source = FakeSource::new(&[LETTER]);
        source.broken_page = Some(0);

        let mut assembler = DocumentAssembler::new(&config);
        assert!(assembler.run(&source).is_err());
        assert!(assembler.state().is_terminal());
        assert!(matches!(
            assembler.run(&FakeSource::new(&[LETTER])),
            Err(Pdf2PptxError::Internal(_))
        ));
        assert_eq!(assembler.state(), AssemblyState::Failed);
    }

    #[test]
    fn empty_document_yields_empty_deck() {
        let config = ConversionConfig::default();
        let deck = DocumentAssembler::new(&config)
            .run(&FakeSource::new(&[]))
            .unwrap();
        assert_eq!(deck.presentation.slide_count(), 0);
        assert_eq!(deck.presentation.canvas(), Canvas::DEFAULT);
    }
}
