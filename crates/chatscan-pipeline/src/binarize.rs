//! Two-level thresholding driven by bubble classification.
//!
//! Every pixel's RGB channels are replaced by pure black or pure white.
//! The threshold depends on the pixel's [`PixelClass`]: bubble pixels
//! use the lower `bubble_threshold` so light text on colored bubbles
//! survives, everything else uses `generic_threshold`. Alpha is never
//! touched.
//!
//! Luminance is the unweighted channel mean `(r + g + b) / 3`, compared
//! exactly: a pixel is white only when the mean is strictly greater
//! than the threshold. The comparison is done on the channel sum
//! (`r + g + b > 3 * threshold`) so no rounding is involved.

use serde::{Deserialize, Serialize};

use crate::classify::{BubbleRule, PixelClass, classify, matching_rule};
use crate::raster::RasterImage;
use crate::types::PipelineConfig;

/// Channel value written for pixels above the threshold.
pub const WHITE: u8 = 255;

/// Channel value written for pixels at or below the threshold.
pub const BLACK: u8 = 0;

/// Pixel counts gathered while binarizing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinarizeStats {
    /// Pixels classified as [`PixelClass::Bubble`].
    pub bubble_pixels: u64,
    /// Pixels classified as [`PixelClass::Generic`].
    pub generic_pixels: u64,
    /// Pixels set to white.
    pub white_pixels: u64,
    /// Pixels set to black.
    pub black_pixels: u64,
    /// Bubble pixels claimed by each rule, indexed like
    /// [`BubbleRule::ORDERED`].
    pub rule_pixels: [u64; 5],
}

impl BinarizeStats {
    /// Pixels that `rule` claimed.
    #[must_use]
    pub const fn rule_count(&self, rule: BubbleRule) -> u64 {
        self.rule_pixels[rule.index()]
    }

    /// Every rule with its pixel count, in evaluation order.
    pub fn rule_counts(&self) -> impl Iterator<Item = (BubbleRule, u64)> {
        BubbleRule::ORDERED
            .into_iter()
            .map(|rule| (rule, self.rule_count(rule)))
    }
}

/// Sum of the three color channels.
#[must_use]
pub fn channel_sum(r: u8, g: u8, b: u8) -> u16 {
    u16::from(r) + u16::from(g) + u16::from(b)
}

/// Whether the mean of `r`, `g`, `b` is strictly above `threshold`.
#[must_use]
pub fn is_bright(r: u8, g: u8, b: u8, threshold: u8) -> bool {
    channel_sum(r, g, b) > 3 * u16::from(threshold)
}

/// The threshold that applies to a pixel of the given class.
#[must_use]
pub const fn threshold_for(class: PixelClass, config: &PipelineConfig) -> u8 {
    match class {
        PixelClass::Bubble => config.bubble_threshold,
        PixelClass::Generic => config.generic_threshold,
    }
}

/// Classify and threshold one pixel, returning the output channel value
/// and the class that decided it.
#[must_use]
pub fn binarize_pixel(r: u8, g: u8, b: u8, config: &PipelineConfig) -> (u8, PixelClass) {
    let class = classify(r, g, b);
    (threshold_pixel(r, g, b, class, config), class)
}

fn threshold_pixel(r: u8, g: u8, b: u8, class: PixelClass, config: &PipelineConfig) -> u8 {
    if is_bright(r, g, b, threshold_for(class, config)) {
        WHITE
    } else {
        BLACK
    }
}

/// Binarize `image` in place.
///
/// Zero-sized images are left as they are.
pub fn binarize(image: &mut RasterImage, config: &PipelineConfig) -> BinarizeStats {
    let channels = image.channels();
    let mut stats = BinarizeStats::default();

    for pixel in image.as_raw_mut().chunks_exact_mut(channels) {
        let (r, g, b) = (pixel[0], pixel[1], pixel[2]);
        let class = match matching_rule(r, g, b) {
            Some(rule) => {
                stats.bubble_pixels += 1;
                stats.rule_pixels[rule.index()] += 1;
                PixelClass::Bubble
            }
            None => {
                stats.generic_pixels += 1;
                PixelClass::Generic
            }
        };
        let value = threshold_pixel(r, g, b, class, config);
        if value == WHITE {
            stats.white_pixels += 1;
        } else {
            stats.black_pixels += 1;
        }
        pixel[..3].fill(value);
    }

    stats
}
