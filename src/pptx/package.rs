//! Serialise a [`Presentation`] into a zipped Open Packaging Conventions
//! (`.pptx`) byte stream.
//!
//! Part order and timestamps are fixed, so the same deck always produces the
//! same bytes.

use super::parts::{self, rel, Relationships};
use super::presentation::Presentation;
use crate::error::Pdf2PptxError;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Thin wrapper over `ZipWriter` with XML and media presets.
struct PackageWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

fn entry_options(method: CompressionMethod) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(method)
        .last_modified_time(DateTime::default())
}

impl PackageWriter {
    fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    fn add_xml(&mut self, name: &str, xml: &str) -> Result<(), Pdf2PptxError> {
        self.add(name, xml.as_bytes(), CompressionMethod::Deflated)
    }

    /// PNG data is already compressed, so media is stored as-is.
    fn add_media(&mut self, name: &str, data: &[u8]) -> Result<(), Pdf2PptxError> {
        self.add(name, data, CompressionMethod::Stored)
    }

    fn add(
        &mut self,
        name: &str,
        data: &[u8],
        method: CompressionMethod,
    ) -> Result<(), Pdf2PptxError> {
        self.zip.start_file(name, entry_options(method))?;
        self.zip
            .write_all(data)
            .map_err(|e| Pdf2PptxError::Serialization {
                detail: format!("writing '{name}': {e}"),
            })
    }

    fn finish(self) -> Result<Vec<u8>, Pdf2PptxError> {
        Ok(self.zip.finish()?.into_inner())
    }
}

/// Write `deck` as a complete `.pptx` package.
pub fn write_package(deck: &Presentation) -> Result<Vec<u8>, Pdf2PptxError> {
    let slides = deck.slides();
    let mut pkg = PackageWriter::new();

    pkg.add_xml("[Content_Types].xml", &parts::content_types(slides.len()))?;
    pkg.add_xml("_rels/.rels", &parts::root_relationships().to_xml())?;

    // ── Presentation part and its relationships ─────────────────────────
    let mut pres_rels = Relationships::new();
    let master_rel = pres_rels.add(rel::SLIDE_MASTER, "slideMasters/slideMaster1.xml");
    let slide_rels: Vec<String> = slides
        .iter()
        .map(|s| pres_rels.add(rel::SLIDE, format!("slides/slide{}.xml", s.number())))
        .collect();
    pres_rels.add(rel::PRES_PROPS, "presProps.xml");
    pres_rels.add(rel::VIEW_PROPS, "viewProps.xml");
    pres_rels.add(rel::THEME, "theme/theme1.xml");
    pres_rels.add(rel::TABLE_STYLES, "tableStyles.xml");

    let (cx, cy) = deck.slide_size();
    pkg.add_xml(
        "ppt/presentation.xml",
        &parts::presentation_xml(&master_rel, &slide_rels, cx, cy),
    )?;
    pkg.add_xml("ppt/_rels/presentation.xml.rels", &pres_rels.to_xml())?;

    // ── Master, layout, theme ───────────────────────────────────────────
    let mut master_rels = Relationships::new();
    let layout_rel = master_rels.add(rel::SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");
    master_rels.add(rel::THEME, "../theme/theme1.xml");
    pkg.add_xml(
        "ppt/slideMasters/slideMaster1.xml",
        &parts::slide_master_xml(&layout_rel),
    )?;
    pkg.add_xml(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        &master_rels.to_xml(),
    )?;

    let mut layout_rels = Relationships::new();
    layout_rels.add(rel::SLIDE_MASTER, "../slideMasters/slideMaster1.xml");
    pkg.add_xml(
        "ppt/slideLayouts/slideLayout1.xml",
        &parts::blank_layout_xml(),
    )?;
    pkg.add_xml(
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        &layout_rels.to_xml(),
    )?;

    pkg.add_xml("ppt/theme/theme1.xml", &parts::theme_xml())?;
    pkg.add_xml("ppt/presProps.xml", &parts::pres_props_xml())?;
    pkg.add_xml("ppt/viewProps.xml", &parts::view_props_xml())?;
    pkg.add_xml("ppt/tableStyles.xml", &parts::table_styles_xml())?;

    // ── Slides and media ────────────────────────────────────────────────
    for slide in slides {
        let n = slide.number();
        let (rels, image_rel) = slide.relationships();
        pkg.add_xml(
            &format!("ppt/slides/slide{n}.xml"),
            &slide.to_xml(&image_rel),
        )?;
        pkg.add_xml(
            &format!("ppt/slides/_rels/slide{n}.xml.rels"),
            &rels.to_xml(),
        )?;
        pkg.add_media(
            &format!("ppt/media/{}", slide.media_name()),
            &slide.image().png,
        )?;
    }

    // ── Document properties ─────────────────────────────────────────────
    let props = deck.properties();
    pkg.add_xml(
        "docProps/core.xml",
        &parts::core_properties_xml(props.title.as_deref(), props.creator.as_deref()),
    )?;
    pkg.add_xml("docProps/app.xml", &parts::app_properties_xml(slides.len()))?;

    let bytes = pkg.finish()?;
    debug!(
        "Serialised {} slides into {} bytes",
        slides.len(),
        bytes.len()
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{fit_and_center, Canvas};
    use crate::pipeline::render::RasterImage;
    use crate::pptx::SlideBuilder;
    use std::io::Read;
    use zip::ZipArchive;

    fn deck_with_pages(n: usize) -> Presentation {
        let mut deck = Presentation::new();
        deck.set_canvas(Canvas::new(8.5, 11.0)).unwrap();
        for page in 1..=n {
            let img = RasterImage::from_fn(17, 22, |x, y| [x as u8, y as u8, page as u8]);
            let canvas = deck.canvas();
            let placement = fit_and_center(canvas, 17, 22).unwrap();
            SlideBuilder::new(&mut deck)
                .add_picture_slide(canvas, &img, placement, page)
                .unwrap();
        }
        deck
    }

    fn read_part(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut s = String::new();
        archive
            .by_name(name)
            .unwrap_or_else(|_| panic!("missing part {name}"))
            .read_to_string(&mut s)
            .unwrap();
        s
    }

    #[test]
    fn package_contains_required_parts() {
        let bytes = deck_with_pages(2).to_bytes().unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        for name in [
            "[Content_Types].xml",
            "_rels/.rels",
            "ppt/presentation.xml",
            "ppt/_rels/presentation.xml.rels",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/theme/theme1.xml",
            "ppt/slides/slide1.xml",
            "ppt/slides/slide2.xml",
            "ppt/slides/_rels/slide2.xml.rels",
            "ppt/media/image1.png",
            "ppt/media/image2.png",
            "docProps/core.xml",
            "docProps/app.xml",
        ] {
            assert!(archive.by_name(name).is_ok(), "missing {name}");
        }
        assert_eq!(archive.by_index(0).unwrap().name(), "[Content_Types].xml");
    }

    #[test]
    fn presentation_part_references_slides_in_order() {
        let bytes = deck_with_pages(3).to_bytes().unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let pres = read_part(&mut archive, "ppt/presentation.xml");
        assert!(pres.contains(r#"<p:sldSz cx="7772400" cy="10058400"/>"#));
        let first = pres.find(r#"r:id="rId2""#).unwrap();
        let third = pres.find(r#"r:id="rId4""#).unwrap();
        assert!(first < third);

        let rels = read_part(&mut archive, "ppt/_rels/presentation.xml.rels");
        assert!(rels.contains(r#"Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide2.xml""#));
    }

    #[test]
    fn serialisation_is_deterministic() {
        let a = deck_with_pages(2).to_bytes().unwrap();
        let b = deck_with_pages(2).to_bytes().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_deck_still_serialises() {
        let bytes = Presentation::new().to_bytes().unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let app = read_part(&mut archive, "docProps/app.xml");
        assert!(app.contains("<Slides>0</Slides>"));
    }

    #[test]
    fn title_lands_in_core_properties() {
        let mut deck = deck_with_pages(1);
        deck.properties_mut().title = Some("Board deck".into());
        let bytes = deck.to_bytes().unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let core = read_part(&mut archive, "docProps/core.xml");
        assert!(core.contains("<dc:title>Board deck</dc:title>"));
    }
}
