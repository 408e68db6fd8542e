//! Image encoding: [`RasterImage`] → PNG bytes for `ppt/media/`.
//!
//! PNG is lossless, so text on the rendered page stays crisp, and the
//! encoder output is a pure function of the pixels.

use super::render::RasterImage;
use image::ImageFormat;
use std::io::Cursor;
use tracing::debug;

/// Encode a rasterised page as PNG.
pub fn encode_png(img: &RasterImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.as_rgb()
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    debug!(
        "Encoded {}x{} image → {} bytes PNG",
        img.width(),
        img.height(),
        buf.len()
    );
    Ok(buf)
}
