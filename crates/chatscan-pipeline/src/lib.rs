//! chatscan-pipeline: Pure screenshot preprocessing pipeline (sans-IO).
//!
//! Turns a chat screenshot into a high-contrast, enlarged bitmap that a
//! text recognizer can read reliably:
//! bubble-aware binarization -> nearest-neighbor upscale ->
//! 3×3 sharpening -> lossless encoding.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! buffers and returns encoded bytes. Reading files, running the
//! recognizer and printing transcripts live in the `chatscan` binary
//! and the `chatscan-ocr` crate.

pub mod batch;
pub mod binarize;
pub mod classify;
pub mod decode;
pub mod diagnostics;
pub mod encode;
pub mod pipeline;
pub mod raster;
pub mod sharpen;
pub mod types;
pub mod upscale;

pub use batch::process_batch;
pub use classify::{BubbleRule, PixelClass, classify};
pub use decode::{DecodeError, decode};
pub use pipeline::Pipeline;
pub use raster::{ChannelLayout, RasterError, RasterImage};
pub use sharpen::SHARPEN_KERNEL;
pub use types::{
    Dimensions, EncodedImage, OutputFormat, PipelineConfig, PreprocessError, StageError,
    StageKind, error_chain,
};

/// Run the full preprocessing pipeline on one image.
///
/// # Pipeline steps
///
/// 1. Classify each pixel and binarize it in place
/// 2. Enlarge by `config.scale_factor` (nearest neighbor)
/// 3. Sharpen the interior with [`SHARPEN_KERNEL`]
/// 4. Encode as `config.output_format`
///
/// Each step runs exactly once; nothing is retried.
///
/// # Errors
///
/// Returns [`PreprocessError::InvalidConfig`] if `config` is invalid.
/// Returns [`PreprocessError::Stage`] with
/// [`StageError::InvalidDimension`] if the image has a zero width or
/// height, or with [`StageError::Encoding`] if encoding fails.
pub fn process(
    image: RasterImage,
    config: &PipelineConfig,
) -> Result<EncodedImage, PreprocessError> {
    Pipeline::new(image, config.clone())?
        .binarize()
        .upscale()?
        .sharpen()
        .encode()
}

/// Run every stage except encoding and return the final raster.
///
/// # Errors
///
/// Same as [`process`], minus encoding failures.
pub fn process_raster(
    image: RasterImage,
    config: &PipelineConfig,
) -> Result<RasterImage, PreprocessError> {
    Ok(Pipeline::new(image, config.clone())?
        .binarize()
        .upscale()?
        .sharpen()
        .into_image())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// A blue "sent" bubble with light text on a white page.
    fn chat_screenshot() -> RasterImage {
        RasterImage::from(image::RgbaImage::from_fn(40, 20, |x, y| {
            let in_bubble = (5..35).contains(&x) && (4..16).contains(&y);
            let in_text = in_bubble && (9..12).contains(&y) && x % 4 != 0;
            match (in_bubble, in_text) {
                (true, true) => image::Rgba([245, 245, 245, 255]),
                (true, false) => image::Rgba([20, 120, 250, 255]),
                _ => image::Rgba([255, 255, 255, 255]),
            }
        }))
    }

    #[test]
    fn process_produces_png_of_scaled_size() {
        let encoded = process(chat_screenshot(), &PipelineConfig::default()).unwrap();
        assert_eq!(encoded.format(), OutputFormat::Png);
        assert_eq!(
            encoded.dimensions(),
            Dimensions {
                width: 100,
                height: 50
            }
        );
        let decoded = image::load_from_memory(encoded.bytes()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (100, 50));
    }

    #[test]
    fn process_zero_height_is_invalid_dimension() {
        let img = RasterImage::from_raw(5, 0, ChannelLayout::Rgba, Vec::new()).unwrap();
        let err = process(img, &PipelineConfig::default()).unwrap_err();
        assert!(err.is_invalid_dimension());
    }

    #[test]
    fn process_raster_output_is_black_and_white_for_flat_regions() {
        let raster = process_raster(chat_screenshot(), &PipelineConfig::default()).unwrap();
        // Output (30, 13) samples source (12, 5): the saturated bubble
        // body, which matches no bubble rule and has mean 130 -> black.
        assert_eq!(raster.pixel(30, 13), Some(&[0, 0, 0, 255][..]));
        // Page background stays white.
        assert_eq!(raster.pixel(2, 2), Some(&[255, 255, 255, 255][..]));
    }

    #[test]
    fn process_is_deterministic() {
        let a = process(chat_screenshot(), &PipelineConfig::default()).unwrap();
        let b = process(chat_screenshot(), &PipelineConfig::default()).unwrap();
        assert_eq!(a.bytes(), b.bytes());
    }
}
