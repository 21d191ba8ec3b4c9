//! Screenshot decoding.
//!
//! Decoding sits in front of the pipeline proper: callers turn file
//! bytes into a [`RasterImage`] here and hand that to
//! [`process`](crate::process). Supports whatever the `image` crate was
//! built with (PNG, JPEG, BMP, WebP).

use crate::raster::RasterImage;

/// Errors raised while decoding input bytes.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The input buffer was empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The bytes are not a recognized or intact image.
    #[error("failed to decode image")]
    Image(#[from] image::ImageError),
}

/// Decode encoded image bytes into an RGB or RGBA raster.
///
/// # Errors
///
/// Returns [`DecodeError::EmptyInput`] if `bytes` is empty.
/// Returns [`DecodeError::Image`] if the format is unrecognized or the
/// data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<RasterImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(RasterImage::from(img))
}
