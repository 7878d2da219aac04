//! PNG encoding at the process boundary.

use std::io::Cursor;

use image::{ImageFormat, RgbImage};

use crate::error::Result;

/// Encode an image to PNG bytes.
///
/// The intermediate buffer is returned by value and every other rendering
/// buffer is dropped on return, so repeated sequential requests do not
/// accumulate memory.
///
/// # Errors
///
/// Encoding failures surface as [`crate::RenderError::Encode`]; they are
/// fatal to this artifact only.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}
