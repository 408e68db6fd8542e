//! Slides and the builder that appends them to a [`Presentation`].

use super::parts::{self, escape_xml, Relationships, SP_TREE_HEADER, XML_DECL};
use super::presentation::Presentation;
use crate::error::Pdf2PptxError;
use crate::geometry::{Canvas, Emu, Placement};
use crate::pipeline::encode::encode_png;
use crate::pipeline::render::RasterImage;
use std::fmt::Write;
use tracing::debug;

/// A PNG stored in the package under `ppt/media/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub png: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
}

/// Offset and extent of a picture on the EMU grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PictureFrame {
    pub x: Emu,
    pub y: Emu,
    pub cx: Emu,
    pub cy: Emu,
}

impl PictureFrame {
    /// Snap `placement` to the EMU grid, keeping the frame inside `canvas`
    /// when rounding would push it past an edge.
    pub fn from_placement(placement: &Placement, canvas: Canvas) -> Self {
        let (cw, ch) = (
            Emu::from_inches(canvas.width).0,
            Emu::from_inches(canvas.height).0,
        );
        let x = Emu::from_inches(placement.left).0.clamp(0, cw);
        let y = Emu::from_inches(placement.top).0.clamp(0, ch);
        let cx = Emu::from_inches(placement.width).0.clamp(0, cw - x);
        let cy = Emu::from_inches(placement.height).0.clamp(0, ch - y);
        Self {
            x: Emu(x),
            y: Emu(y),
            cx: Emu(cx),
            cy: Emu(cy),
        }
    }
}

/// One slide: a single picture of a source page.
#[derive(Debug, Clone)]
pub struct Slide {
    number: usize,
    source_page: usize,
    image: EmbeddedImage,
    placement: Placement,
    frame: PictureFrame,
}

impl Slide {
    /// 1-indexed position in the deck.
    pub fn number(&self) -> usize {
        self.number
    }

    /// 1-indexed page of the source PDF this slide shows.
    pub fn source_page(&self) -> usize {
        self.source_page
    }

    pub fn image(&self) -> &EmbeddedImage {
        &self.image
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn frame(&self) -> PictureFrame {
        self.frame
    }

    /// Package path of the slide's image.
    pub(crate) fn media_name(&self) -> String {
        format!("image{}.png", self.number)
    }

    pub(crate) fn relationships(&self) -> (Relationships, String) {
        let mut rels = Relationships::new();
        rels.add(parts::rel::SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");
        let image_rel = rels.add(parts::rel::IMAGE, format!("../media/{}", self.media_name()));
        (rels, image_rel)
    }

    /// The `ppt/slides/slideN.xml` body; `image_rel_id` is the picture's
    /// relationship id in this slide's `.rels` part.
    pub(crate) fn to_xml(&self, image_rel_id: &str) -> String {
        let PictureFrame { x, y, cx, cy } = self.frame;
        let mut xml = String::with_capacity(1024);
        xml.push_str(XML_DECL);
        xml.push_str(&parts::slide_open_tag());
        let _ = write!(xml, "<p:cSld><p:spTree>{SP_TREE_HEADER}");

        xml.push_str("<p:pic><p:nvPicPr>");
        let _ = write!(
            xml,
            r#"<p:cNvPr id="2" name="Picture 1" descr="{}"/>"#,
            escape_xml(&format!("Page {}", self.source_page))
        );
        xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/>"#);
        xml.push_str("</p:nvPicPr>");
        let _ = write!(
            xml,
            r#"<p:blipFill><a:blip r:embed="{image_rel_id}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#
        );
        let _ = write!(
            xml,
            r#"<p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#
        );
        xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#);

        xml.push_str("</p:spTree></p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
        xml.push_str("</p:sld>");
        xml
    }
}

/// Appends picture slides to a [`Presentation`].
pub struct SlideBuilder<'a> {
    deck: &'a mut Presentation,
}

impl<'a> SlideBuilder<'a> {
    pub fn new(deck: &'a mut Presentation) -> Self {
        Self { deck }
    }

    /// PNG-encode `image`, position it at `placement` within `canvas` and
    /// append the resulting slide to the deck.
    ///
    /// `source_page` is the 1-indexed PDF page the image was rendered from.
    pub fn add_picture_slide(
        self,
        canvas: Canvas,
        image: &RasterImage,
        placement: Placement,
        source_page: usize,
    ) -> Result<&'a Slide, Pdf2PptxError> {
        let png = encode_png(image).map_err(|e| Pdf2PptxError::Serialization {
            detail: format!("PNG encoding failed for page {source_page}: {e}"),
        })?;

        let deck = self.deck;
        let frame = PictureFrame::from_placement(&placement, canvas);
        let slide = Slide {
            number: deck.slide_count() + 1,
            source_page,
            image: EmbeddedImage {
                png,
                width_px: image.width(),
                height_px: image.height(),
            },
            placement,
            frame,
        };
        debug!(
            "Slide {} ← page {}: {}x{} px at ({}, {}) size {}x{} EMU",
            slide.number,
            source_page,
            image.width(),
            image.height(),
            frame.x,
            frame.y,
            frame.cx,
            frame.cy
        );
        Ok(deck.push_slide(slide))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{fit_and_center, FitAxis};

    fn grey(width: u32, height: u32) -> RasterImage {
        RasterImage::from_fn(width, height, |_, _| [128, 128, 128])
    }

    #[test]
    fn builder_appends_in_order() {
        let mut deck = Presentation::new();
        let canvas = Canvas::DEFAULT;
        for page in 1..=3 {
            let img = grey(40, 30);
            let placement = fit_and_center(canvas, img.width(), img.height()).unwrap();
            SlideBuilder::new(&mut deck)
                .add_picture_slide(canvas, &img, placement, page)
                .unwrap();
        }
        let numbers: Vec<_> = deck.slides().iter().map(|s| s.number()).collect();
        let pages: Vec<_> = deck.slides().iter().map(|s| s.source_page()).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(pages, vec![1, 2, 3]);
        assert!(deck.slides()[0].image().png.starts_with(b"\x89PNG"));
    }

    #[test]
    fn frame_matches_letterboxed_placement() {
        let mut deck = Presentation::new();
        let canvas = Canvas::new(10.0, 7.5);
        let img = grey(100, 50);
        let placement = fit_and_center(canvas, 100, 50).unwrap();
        assert_eq!(placement.axis, FitAxis::Width);
        let slide = SlideBuilder::new(&mut deck)
            .add_picture_slide(canvas, &img, placement, 1)
            .unwrap();
        let f = slide.frame();
        assert_eq!(f.x, Emu(0));
        assert_eq!(f.y, Emu(1_143_000)); // 1.25in
        assert_eq!(f.cx, Emu(9_144_000));
        assert_eq!(f.cy, Emu(4_572_000));
    }

    #[test]
    fn frame_is_clamped_to_canvas() {
        let placement = Placement {
            left: -0.000001,
            top: 0.0,
            width: 10.000001,
            height: 7.5,
            axis: FitAxis::Height,
        };
        let f = PictureFrame::from_placement(&placement, Canvas::new(10.0, 7.5));
        assert_eq!(f.x, Emu(0));
        assert_eq!(f.cx, Emu(9_144_000));
    }

    #[test]
    fn slide_xml_has_single_picture() {
        let mut deck = Presentation::new();
        let img = grey(8, 6);
        let placement = fit_and_center(Canvas::DEFAULT, 8, 6).unwrap();
        let slide = SlideBuilder::new(&mut deck)
            .add_picture_slide(Canvas::DEFAULT, &img, placement, 7)
            .unwrap();
        let (rels, image_rel) = slide.relationships();
        assert_eq!(image_rel, "rId2");
        assert!(rels.to_xml().contains("../media/image1.png"));

        let xml = slide.to_xml(&image_rel);
        assert_eq!(xml.matches("<p:pic>").count(), 1);
        assert!(!xml.contains("<p:sp>"));
        assert!(xml.contains(r#"r:embed="rId2""#));
        assert!(xml.contains(r#"descr="Page 7""#));
        assert!(xml.contains(r#"<a:ext cx="9144000" cy="6858000"/>"#));
    }
}
