//! Lossless serialization of the final buffer.

use image::{ExtendedColorType, ImageEncoder};

use crate::raster::{ChannelLayout, RasterImage};
use crate::types::{EncodedImage, OutputFormat};

const fn color_type(layout: ChannelLayout) -> ExtendedColorType {
    match layout {
        ChannelLayout::Rgb => ExtendedColorType::Rgb8,
        ChannelLayout::Rgba => ExtendedColorType::Rgba8,
    }
}

/// Encode `image` as `format`.
///
/// # Errors
///
/// Returns the encoder's [`image::ImageError`] if serialization fails,
/// for example when an axis is zero or too large for the format.
pub fn encode(
    image: &RasterImage,
    format: OutputFormat,
) -> Result<EncodedImage, image::ImageError> {
    let mut bytes = Vec::new();
    let (width, height) = (image.width(), image.height());
    let color = color_type(image.layout());

    match format {
        OutputFormat::Png => {
            let encoder = image::codecs::png::PngEncoder::new(&mut bytes);
            encoder.write_image(image.as_raw(), width, height, color)?;
        }
        OutputFormat::Bmp => {
            let encoder = image::codecs::bmp::BmpEncoder::new(&mut bytes);
            encoder.write_image(image.as_raw(), width, height, color)?;
        }
    }

    Ok(EncodedImage::new(format, image.dimensions(), bytes))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> RasterImage {
        RasterImage::from(image::RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgba([0, 0, 0, 255])
            } else {
                image::Rgba([255, 255, 255, 255])
            }
        }))
    }

    #[test]
    fn png_round_trips_losslessly() {
        let img = checker(9, 4);
        let encoded = encode(&img, OutputFormat::Png).unwrap();
        assert_eq!(encoded.format(), OutputFormat::Png);
        assert!(encoded.bytes().starts_with(b"\x89PNG"));

        let decoded = image::load_from_memory(encoded.bytes()).unwrap().to_rgba8();
        assert_eq!(decoded.as_raw(), img.as_raw());
    }

    #[test]
    fn bmp_has_bitmap_signature() {
        let img = RasterImage::from(image::RgbImage::from_pixel(5, 3, image::Rgb([255, 0, 0])));
        let encoded = encode(&img, OutputFormat::Bmp).unwrap();
        assert!(encoded.bytes().starts_with(b"BM"));
        assert_eq!(encoded.dimensions(), img.dimensions());

        let decoded = image::load_from_memory(encoded.bytes()).unwrap().to_rgb8();
        assert_eq!(decoded.as_raw(), img.as_raw());
    }

    #[test]
    fn zero_width_is_rejected_by_png_encoder() {
        let img = RasterImage::from_raw(0, 0, ChannelLayout::Rgb, Vec::new()).unwrap();
        assert!(encode(&img, OutputFormat::Png).is_err());
    }

        #[test]
    fn encoding_is_deterministic() {
        let img = checker(16, 16);
        let a = encode(&img, OutputFormat::Png).unwrap();
        let b = encode(&img, OutputFormat::Png).unwrap();
        assert_eq!(a, b);
    }
}
