//! 3×3 convolution, used with a fixed sharpening kernel.
//!
//! The kernel is applied to every interior pixel; the one-pixel frame
//! (first and last row and column) is left exactly as it was. Each
//! output value is computed from a read-only snapshot of the input, so
//! results never depend on the order pixels are visited. Sums are
//! clamped to `0..=255`. Only the three color channels are convolved;
//! alpha passes through.

use serde::{Deserialize, Serialize};

use crate::raster::RasterImage;

/// A 3×3 integer convolution kernel, indexed `[row][column]`.
pub type Kernel3x3 = [[i32; 3]; 3];

/// Center-weighted sharpening kernel. Weights sum to 1, so flat regions
/// keep their color.
pub const SHARPEN_KERNEL: Kernel3x3 = [[0, -1, 0], [-1, 5, -1], [0, -1, 0]];

/// Counts gathered while convolving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvolutionStats {
    /// Interior pixels that were recomputed.
    pub interior_pixels: u64,
    /// Channel values whose weighted sum fell outside `0..=255`.
    pub clamped_channels: u64,
}

/// Apply `kernel` to the interior of `image` in place.
///
/// Images narrower or shorter than three pixels have no interior and
/// are returned unchanged.
pub fn convolve3x3(image: &mut RasterImage, kernel: &Kernel3x3) -> ConvolutionStats {
    let (width, height) = (image.width() as usize, image.height() as usize);
    let mut stats = ConvolutionStats::default();
    if width < 3 || height < 3 {
        return stats;
    }

    let channels = image.channels();
    let snapshot = image.as_raw().to_vec();
    let row_bytes = width * channels;

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let idx = (y * width + x) * channels;
            for c in 0..3 {
                let mut sum = 0i32;
                for (ky, kernel_row) in kernel.iter().enumerate() {
                    let row_start = (y + ky - 1) * row_bytes;
                    for (kx, &weight) in kernel_row.iter().enumerate() {
                        let sample = snapshot[row_start + (x + kx - 1) * channels + c];
                        sum += weight * i32::from(sample);
                    }
                }
                if !(0..=255).contains(&sum) {
                    stats.clamped_channels += 1;
                }
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let value = sum.clamp(0, 255) as u8;
                image.as_raw_mut()[idx + c] = value;
            }
            stats.interior_pixels += 1;
        }
    }

    stats
}

/// Sharpen `image` in place with [`SHARPEN_KERNEL`].
pub fn sharpen(image: &mut RasterImage) -> ConvolutionStats {
    convolve3x3(image, &SHARPEN_KERNEL)
}
