//! The in-memory output deck.

use super::package;
use super::slide::Slide;
use crate::error::Pdf2PptxError;
use crate::geometry::{Canvas, Emu};
use tracing::{debug, warn};

/// Smallest slide side PowerPoint accepts (1 in).
pub const MIN_SLIDE_SIDE: Emu = Emu(914_400);
/// Largest slide side PowerPoint accepts (56 in).
pub const MAX_SLIDE_SIDE: Emu = Emu(51_206_400);

/// Document-level properties written to `docProps/core.xml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreProperties {
    pub title: Option<String>,
    pub creator: Option<String>,
}

/// An append-only slide deck with a single, deck-wide canvas.
///
/// Slides are only ever appended (through [`super::SlideBuilder`]); the
/// canvas may be re-set at any time and applies to every slide when the
/// deck is serialised.
#[derive(Debug, Clone)]
pub struct Presentation {
    canvas: Canvas,
    slides: Vec<Slide>,
    properties: CoreProperties,
}

impl Default for Presentation {
    fn default() -> Self {
        Self::new()
    }
}

impl Presentation {
    /// An empty deck on the default 10in × 7.5in canvas.
    pub fn new() -> Self {
        Self {
            canvas: Canvas::DEFAULT,
            slides: Vec::new(),
            properties: CoreProperties::default(),
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Set the deck-wide slide size.
    ///
    /// Sizes outside PowerPoint's 1–56 inch range are kept as-is (other
    /// consumers accept them) but logged.
    pub fn set_canvas(&mut self, canvas: Canvas) -> Result<(), Pdf2PptxError> {
        let canvas = canvas.validate()?;
        let (cx, cy) = (
            Emu::from_inches(canvas.width),
            Emu::from_inches(canvas.height),
        );
        if [cx, cy]
            .iter()
            .any(|side| *side < MIN_SLIDE_SIDE || *side > MAX_SLIDE_SIDE)
        {
            warn!(
                "Slide size {:.2}in x {:.2}in is outside PowerPoint's 1-56in range",
                canvas.width, canvas.height
            );
        }
        if canvas != self.canvas {
            debug!(
                "Canvas {:.3}x{:.3}in -> {:.3}x{:.3}in",
                self.canvas.width, self.canvas.height, canvas.width, canvas.height
            );
        }
        self.canvas = canvas;
        Ok(())
    }

    /// The slide size on the EMU grid, as written to `presentation.xml`.
    pub fn slide_size(&self) -> (Emu, Emu) {
        (
            Emu::from_inches(self.canvas.width),
            Emu::from_inches(self.canvas.height),
        )
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn properties(&self) -> &CoreProperties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut CoreProperties {
        &mut self.properties
    }

    pub(crate) fn push_slide(&mut self, slide: Slide) -> &Slide {
        self.slides.push(slide);
        &self.slides[self.slides.len() - 1]
    }

    /// Serialise the deck into a `.pptx` package.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Pdf2PptxError> {
        package::write_package(self)
    }
}
