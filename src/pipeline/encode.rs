//! Image encoding: `DynamicImage` → PNG bytes.
//!
//! Encoding happens in memory so a page is only written to disk once it is
//! complete. No compression or quality knobs are exposed; the `image`
//! crate's PNG defaults are used.

use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a rasterised page as PNG.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    debug!(
        "Encoded {}x{} image → {} bytes PNG",
        img.width(),
        img.height(),
        buf.len()
    );
    Ok(buf)
}
