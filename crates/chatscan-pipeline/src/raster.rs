//! In-memory raster buffer shared by every pipeline stage.
//!
//! [`RasterImage`] is a row-major, top-to-bottom grid of 8-bit pixels
//! with either three (RGB) or four (RGBA) interleaved channels. Each
//! stage takes exclusive ownership of the buffer it is handed, so no
//! two stages ever alias the same pixels.

use serde::{Deserialize, Serialize};

use crate::types::Dimensions;

/// Interleaved channel layout of a [`RasterImage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelLayout {
    /// Red, green, blue.
    Rgb,
    /// Red, green, blue, alpha.
    Rgba,
}

impl ChannelLayout {
    /// Number of bytes per pixel.
    #[must_use]
    pub const fn channels(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    /// Whether the layout carries an alpha channel.
    #[must_use]
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Rgba)
    }
}

/// Errors raised when constructing a [`RasterImage`] from raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RasterError {
    /// The buffer length does not equal `width * height * channels`.
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferLength {
        /// Length implied by the dimensions and layout.
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },

    /// `width * height * channels` does not fit in memory.
    #[error("image dimensions {width}x{height} are too large")]
    TooLarge {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
}

/// A width × height grid of 8-bit RGB or RGBA pixels.
///
/// Zero-sized images are representable so that the stage which cannot
/// handle them can report
/// [`StageError::InvalidDimension`](crate::StageError::InvalidDimension)
/// instead of failing at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    layout: ChannelLayout,
    data: Vec<u8>,
}

impl RasterImage {
    /// Wrap an existing interleaved pixel buffer.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::BufferLength`] if `data.len()` does not
    /// equal `width * height * layout.channels()`, or
    /// [`RasterError::TooLarge`] if that product overflows `usize`.
    pub fn from_raw(
        width: u32,
        height: u32,
        layout: ChannelLayout,
        data: Vec<u8>,
    ) -> Result<Self, RasterError> {
        let expected = buffer_len(width, height, layout)?;
        if data.len() != expected {
            return Err(RasterError::BufferLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    /// Allocate an image with every pixel set to `pixel`.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::BufferLength`] if `pixel` does not have
    /// exactly `layout.channels()` bytes, or [`RasterError::TooLarge`]
    /// if the dimensions overflow.
    pub fn filled(
        width: u32,
        height: u32,
        layout: ChannelLayout,
        pixel: &[u8],
    ) -> Result<Self, RasterError> {
        if pixel.len() != layout.channels() {
            return Err(RasterError::BufferLength {
                expected: layout.channels(),
                actual: pixel.len(),
            });
        }
        let len = buffer_len(width, height, layout)?;
        let data = pixel.iter().copied().cycle().take(len).collect();
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Width and height together.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Channel layout of the pixel buffer.
    #[must_use]
    pub const fn layout(&self) -> ChannelLayout {
        self.layout
    }

    /// Bytes per pixel.
    #[must_use]
    pub const fn channels(&self) -> usize {
        self.layout.channels()
    }

    /// Returns `true` if either dimension is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels (`width * height`).
    #[must_use]
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// The raw interleaved pixel bytes, row-major.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Consume the image and return its pixel bytes.
    #[must_use]
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// The channel bytes of the pixel at `(x, y)`, or `None` when out of
    /// bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = self.offset(x as usize, y as usize);
        self.data.get(start..start + self.channels())
    }

    /// Iterate over pixels as channel slices, row by row.
    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(self.channels())
    }

    pub(crate) fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Byte offset of the pixel at column `x`, row `y`.
    pub(crate) const fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.width as usize + x) * self.layout.channels()
    }
}

fn buffer_len(width: u32, height: u32, layout: ChannelLayout) -> Result<usize, RasterError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(layout.channels()))
        .ok_or(RasterError::TooLarge { width, height })
}

impl From<image::RgbImage> for RasterImage {
    fn from(image: image::RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            layout: ChannelLayout::Rgb,
            data: image.into_raw(),
        }
    }
}

impl From<image::RgbaImage> for RasterImage {
    fn from(image: image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            layout: ChannelLayout::Rgba,
            data: image.into_raw(),
        }
    }
}

impl From<image::DynamicImage> for RasterImage {
    /// Converts to 8-bit RGB, or RGBA when the source has alpha.
    fn from(image: image::DynamicImage) -> Self {
        match image {
            image::DynamicImage::ImageRgb8(rgb) => rgb.into(),
            image::DynamicImage::ImageRgba8(rgba) => rgba.into(),
            other if other.color().has_alpha() => other.to_rgba8().into(),
            other => other.to_rgb8().into(),
        }
    }
}

impl TryFrom<RasterImage> for image::DynamicImage {
    type Error = RasterError;

    fn try_from(image: RasterImage) -> Result<Self, Self::Error> {
        let expected = buffer_len(image.width, image.height, image.layout)?;
        let actual = image.data.len();
        let mismatch = || RasterError::BufferLength { expected, actual };
        match image.layout {
            ChannelLayout::Rgb => image::RgbImage::from_raw(image.width, image.height, image.data)
                .map(Self::ImageRgb8)
                .ok_or_else(mismatch),
            ChannelLayout::Rgba => {
                image::RgbaImage::from_raw(image.width, image.height, image.data)
                    .map(Self::ImageRgba8)
                    .ok_or_else(mismatch)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_accepts_matching_length() {
        let img = RasterImage::from_raw(2, 3, ChannelLayout::Rgb, vec![0; 18]).unwrap();
        assert_eq!(img.width(), 2);
        assert_eq!(img.height(), 3);
        assert_eq!(img.channels(), 3);
        assert_eq!(img.pixel_count(), 6);
    }

    #[test]
    fn from_raw_rejects_wrong_length() {
        let result = RasterImage::from_raw(2, 2, ChannelLayout::Rgba, vec![0; 15]);
        assert_eq!(
            result,
            Err(RasterError::BufferLength {
                expected: 16,
                actual: 15
            })
        );
    }

    #[test]
    fn zero_sized_image_is_representable() {
        let img = RasterImage::from_raw(0, 5, ChannelLayout::Rgb, Vec::new()).unwrap();
        assert!(img.is_empty());
        assert_eq!(img.pixels().count(), 0);
    }

    #[test]
    fn filled_repeats_pixel() {
        let img = RasterImage::filled(3, 2, ChannelLayout::Rgba, &[1, 2, 3, 4]).unwrap();
        assert_eq!(img.as_raw().len(), 24);
        assert!(img.pixels().all(|p| p == [1, 2, 3, 4]));
    }

    #[test]
    fn filled_rejects_wrong_pixel_width() {
        let result = RasterImage::filled(3, 2, ChannelLayout::Rgb, &[1, 2, 3, 4]);
        assert!(matches!(result, Err(RasterError::BufferLength { .. })));
    }

    #[test]
    fn pixel_indexing_is_row_major() {
        let rgba = image::RgbaImage::from_fn(4, 3, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            image::Rgba([x as u8, y as u8, 0, 255])
        });
        let img = RasterImage::from(rgba);
        assert_eq!(img.pixel(3, 2), Some(&[3, 2, 0, 255][..]));
        assert_eq!(img.pixel(4, 0), None);
        assert_eq!(img.pixel(0, 3), None);
    }

    #[test]
    fn dynamic_image_keeps_alpha_only_when_present() {
        let gray = image::DynamicImage::ImageLuma8(image::GrayImage::new(2, 2));
        assert_eq!(RasterImage::from(gray).layout(), ChannelLayout::Rgb);

        let gray_alpha = image::DynamicImage::ImageLumaA8(image::GrayAlphaImage::new(2, 2));
        assert_eq!(RasterImage::from(gray_alpha).layout(), ChannelLayout::Rgba);
    }

    #[test]
    fn dynamic_luma_expands_to_three_channels() {
        let gray = image::GrayImage::from_pixel(1, 1, image::Luma([77]));
        let img = RasterImage::from(image::DynamicImage::ImageLuma8(gray));
        assert_eq!(img.pixel(0, 0), Some(&[77, 77, 77][..]));
    }

    #[test]
    fn converts_back_into_dynamic_image() {
        let img = RasterImage::filled(2, 1, ChannelLayout::Rgba, &[1, 2, 3, 4]).unwrap();
        let dynamic = image::DynamicImage::try_from(img).unwrap();
        assert_eq!(dynamic.to_rgba8().get_pixel(1, 0).0, [1, 2, 3, 4]);
    }
}
