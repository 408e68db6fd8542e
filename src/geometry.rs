//! Page-to-slide geometry: fit a raster image inside a slide canvas.
//!
//! Everything here is pure arithmetic on `f64` inches. Conversion to the
//! integer EMU grid used inside the `.pptx` package happens only at the
//! package boundary via [`Emu`].

use crate::error::Pdf2PptxError;
use serde::{Deserialize, Serialize};

/// PDF user-space units per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// English Metric Units per inch (OOXML drawing unit).
pub const EMU_PER_INCH: i64 = 914_400;

/// Size of a source page in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The slide canvas matching this page, one inch per 72 points.
    pub fn to_canvas(self) -> Canvas {
        Canvas::new(self.width / POINTS_PER_INCH, self.height / POINTS_PER_INCH)
    }
}

/// The rectangular slide area, in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    /// The 4:3 10in × 7.5in canvas PowerPoint uses for a new deck.
    pub const DEFAULT: Canvas = Canvas {
        width: 10.0,
        height: 7.5,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Smallest canvas containing both `self` and `other`.
    pub fn union(self, other: Canvas) -> Canvas {
        Canvas::new(self.width.max(other.width), self.height.max(other.height))
    }

    /// Fail with [`Pdf2PptxError::DegenerateGeometry`] unless both sides are
    /// finite and strictly positive.
    pub fn validate(self) -> Result<Self, Pdf2PptxError> {
        if is_usable(self.width) && is_usable(self.height) {
            Ok(self)
        } else {
            Err(Pdf2PptxError::DegenerateGeometry {
                subject: "canvas",
                width: self.width,
                height: self.height,
            })
        }
    }
}

fn is_usable(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// Which canvas side the image was scaled to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitAxis {
    /// Image spans the full canvas height; letterboxed left and right.
    Height,
    /// Image spans the full canvas width; letterboxed top and bottom.
    Width,
}

/// Offset and size of an image inside a canvas, in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub axis: FitAxis,
}

/// Scale an `image_width × image_height` image uniformly so it fits inside
/// `canvas`, and centre it on both axes.
///
/// When the canvas is relatively wider than the image (or exactly as wide)
/// the image takes the full canvas height; otherwise it takes the full
/// width.
///
/// # Errors
/// [`Pdf2PptxError::DegenerateGeometry`] when either the canvas or the image
/// has a zero dimension.
pub fn fit_and_center(
    canvas: Canvas,
    image_width: u32,
    image_height: u32,
) -> Result<Placement, Pdf2PptxError> {
    let canvas = canvas.validate()?;
    if image_width == 0 || image_height == 0 {
        return Err(Pdf2PptxError::DegenerateGeometry {
            subject: "image",
            width: image_width as f64,
            height: image_height as f64,
        });
    }

    let image_aspect = image_width as f64 / image_height as f64;
    let canvas_aspect = canvas.width / canvas.height;

    let (width, height, axis) = if canvas_aspect >= image_aspect {
        let height = canvas.height;
        (height * image_aspect, height, FitAxis::Height)
    } else {
        let width = canvas.width;
        (width, width / image_aspect, FitAxis::Width)
    };

    Ok(Placement {
        left: (canvas.width - width) / 2.0,
        top: (canvas.height - height) / 2.0,
        width,
        height,
        axis,
    })
}

/// A length in English Metric Units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Emu(pub i64);

impl Emu {
    /// Round an inch measurement to the nearest EMU.
    pub fn from_inches(inches: f64) -> Emu {
        Emu((inches * EMU_PER_INCH as f64).round() as i64)
    }

    pub fn to_inches(self) -> f64 {
        self.0 as f64 / EMU_PER_INCH as f64
    }
}

impl std::fmt::Display for Emu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
