//! Nearest-neighbor enlargement of the binarized image.
//!
//! Recognizers read small UI text much better after enlargement, but
//! any interpolating filter would reintroduce the gray levels that
//! binarization just removed. Each destination pixel therefore copies
//! one source pixel verbatim:
//!
//! ```text
//! out_w = ceil(w * factor)            out_h = ceil(h * factor)
//! src_x = min(floor(dx / factor), w - 1)
//! src_y = min(floor(dy / factor), h - 1)
//! ```

use crate::raster::RasterImage;
use crate::types::{Dimensions, StageError};

/// Output length for one axis: `ceil(len * factor)`.
///
/// Returns `None` when the result is zero, not finite, or does not fit
/// in a `u32`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn scaled_len(len: u32, factor: f64) -> Option<u32> {
    let scaled = (f64::from(len) * factor).ceil();
    if scaled.is_finite() && scaled >= 1.0 && scaled <= f64::from(u32::MAX) {
        Some(scaled as u32)
    } else {
        None
    }
}

/// Dimensions of the upscaled image.
///
/// # Errors
///
/// Returns [`StageError::InvalidDimension`] (carrying the source
/// dimensions) if either source dimension is zero or the scaled size
/// is not representable.
pub fn scaled_dimensions(source: Dimensions, factor: f64) -> Result<Dimensions, StageError> {
    let invalid = || StageError::InvalidDimension {
        width: source.width,
        height: source.height,
    };
    if source.width == 0 || source.height == 0 {
        return Err(invalid());
    }
    let width = scaled_len(source.width, factor).ok_or_else(invalid)?;
    let height = scaled_len(source.height, factor).ok_or_else(invalid)?;
    Ok(Dimensions { width, height })
}

/// Source index for each destination index along one axis.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn source_indices(out_len: u32, src_len: u32, factor: f64) -> Vec<usize> {
    let last = src_len as usize - 1;
    (0..out_len)
        .map(|d| {
            let src = (f64::from(d) / factor).floor() as usize;
            src.min(last)
        })
        .collect()
}

/// Enlarge `image` by `factor` using nearest-neighbor sampling.
///
/// All channels, alpha included, are copied unchanged.
///
/// # Errors
///
/// Returns [`StageError::InvalidDimension`] if the source width or
/// height is zero, or the enlarged size does not fit in a `u32`.
pub fn upscale(image: &RasterImage, factor: f64) -> Result<RasterImage, StageError> {
    let out = scaled_dimensions(image.dimensions(), factor)?;
    let channels = image.channels();

    let xs = source_indices(out.width, image.width(), factor);
    let ys = source_indices(out.height, image.height(), factor);

    let row_bytes = out.width as usize * channels;
    let mut data = Vec::with_capacity(row_bytes * out.height as usize);
    let src = image.as_raw();

    for &sy in &ys {
        for &sx in &xs {
            let start = image.offset(sx, sy);
            data.extend_from_slice(&src[start..start + channels]);
        }
    }

    RasterImage::from_raw(out.width, out.height, image.layout(), data).map_err(|_| {
        StageError::InvalidDimension {
            width: out.width,
            height: out.height,
        }
    })
}
