//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::process`] which runs everything in one call,
//! [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use chatscan_pipeline::{Pipeline, PipelineConfig, PreprocessError, RasterImage};
//! # fn run(screenshot: RasterImage) -> Result<(), PreprocessError> {
//! let encoded = Pipeline::new(screenshot, PipelineConfig::default())?
//!     .binarize()
//!     .upscale()?
//!     .sharpen()
//!     .encode()?;
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next state, moving
//! the single pixel buffer along with it. Nothing is shared between
//! states, and an earlier state can no longer be observed once it has
//! been advanced.

use crate::binarize::BinarizeStats;
use crate::raster::RasterImage;
use crate::sharpen::ConvolutionStats;
use crate::types::{
    Dimensions, EncodedImage, PipelineConfig, PreprocessError, StageError, StageKind,
};

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
///
/// Call [`binarize`](Self::binarize) to advance.
#[must_use = "pipeline stages are consumed by advancing, call .binarize() to continue"]
pub struct Pending {
    config: PipelineConfig,
    image: RasterImage,
}

impl Pending {
    /// The untouched input image.
    #[must_use]
    pub const fn image(&self) -> &RasterImage {
        &self.image
    }

    /// Threshold every pixel to black or white, in place.
    pub fn binarize(mut self) -> Binarized {
        let _span = tracing::debug_span!(
            "binarize",
            width = self.image.width(),
            height = self.image.height()
        )
        .entered();
        let stats = crate::binarize::binarize(&mut self.image, &self.config);
        tracing::debug!(
            bubble = stats.bubble_pixels,
            generic = stats.generic_pixels,
            white = stats.white_pixels,
            "binarized"
        );
        Binarized {
            config: self.config,
            image: self.image,
            stats,
        }
    }
}

// ───────────────────────── Stage 1: Binarized ────────────────────────

/// Pipeline state after binarization.
///
/// Call [`upscale`](Self::upscale) to advance. This is the fallible
/// step: zero-sized images are rejected here.
#[must_use = "pipeline stages are consumed by advancing, call .upscale() to continue"]
pub struct Binarized {
    config: PipelineConfig,
    image: RasterImage,
    stats: BinarizeStats,
}

impl Binarized {
    /// The black-and-white image.
    #[must_use]
    pub const fn image(&self) -> &RasterImage {
        &self.image
    }

    /// Pixel counts from binarization.
    #[must_use]
    pub const fn stats(&self) -> BinarizeStats {
        self.stats
    }

    /// Enlarge by `config.scale_factor` with nearest-neighbor sampling.
    ///
    /// The binarized buffer is released once the enlarged copy exists.
    ///
    /// # Errors
    ///
    /// Returns [`PreprocessError::Stage`] wrapping
    /// [`StageError::InvalidDimension`] if the image has a zero width or
    /// height.
    pub fn upscale(self) -> Result<Upscaled, PreprocessError> {
        let source = self.image.dimensions();
        let _span = tracing::debug_span!("upscale", %source, factor = self.config.scale_factor)
            .entered();
        let image = crate::upscale::upscale(&self.image, self.config.scale_factor)
            .map_err(|e| PreprocessError::stage(StageKind::Upscale, e))?;
        tracing::debug!(target_dims = %image.dimensions(), "upscaled");
        Ok(Upscaled {
            config: self.config,
            image,
            source,
        })
    }
}

// ───────────────────────── Stage 2: Upscaled ─────────────────────────

/// Pipeline state after enlargement.
///
/// Call [`sharpen`](Self::sharpen) to advance.
#[must_use = "pipeline stages are consumed by advancing, call .sharpen() to continue"]
pub struct Upscaled {
    config: PipelineConfig,
    image: RasterImage,
    source: Dimensions,
}

impl Upscaled {
    /// The enlarged image.
    #[must_use]
    pub const fn image(&self) -> &RasterImage {
        &self.image
    }

    /// Dimensions of the image before enlargement.
    #[must_use]
    pub const fn source_dimensions(&self) -> Dimensions {
        self.source
    }

    /// Apply the 3×3 sharpening kernel to the interior.
    pub fn sharpen(mut self) -> Sharpened {
        let _span = tracing::debug_span!("sharpen", dims = %self.image.dimensions()).entered();
        let stats = crate::sharpen::sharpen(&mut self.image);
        tracing::debug!(
            interior = stats.interior_pixels,
            clamped = stats.clamped_channels,
            "sharpened"
        );
        Sharpened {
            config: self.config,
            image: self.image,
            stats,
        }
    }
}

// ───────────────────────── Stage 3: Sharpened ────────────────────────

/// Pipeline state after sharpening: the final raster.
///
/// Call [`encode`](Self::encode) to serialize it, or
/// [`into_image`](Self::into_image) to keep the raw pixels.
#[must_use = "call .encode() or .into_image() to extract the result"]
pub struct Sharpened {
    config: PipelineConfig,
    image: RasterImage,
    stats: ConvolutionStats,
}

impl Sharpened {
    /// The sharpened image.
    #[must_use]
    pub const fn image(&self) -> &RasterImage {
        &self.image
    }

    /// Counts from the convolution.
    #[must_use]
    pub const fn stats(&self) -> ConvolutionStats {
        self.stats
    }

    /// Consume the pipeline and return the final raster.
    #[must_use]
    pub fn into_image(self) -> RasterImage {
        self.image
    }

    /// Serialize the final raster as `config.output_format`.
    ///
    /// # Errors
    ///
    /// Returns [`PreprocessError::Stage`] wrapping
    /// [`StageError::Encoding`] if the encoder fails.
    pub fn encode(self) -> Result<EncodedImage, PreprocessError> {
        let format = self.config.output_format;
        let _span = tracing::debug_span!("encode", %format).entered();
        let encoded = crate::encode::encode(&self.image, format).map_err(|e| {
            PreprocessError::stage(StageKind::Encode, StageError::Encoding(e))
        })?;
        tracing::debug!(bytes = encoded.bytes().len(), "encoded");
        Ok(encoded)
    }
}

// ───────────────────── Pipeline entry point ──────────────────────────

/// Incremental preprocessing pipeline.
///
/// Created via [`Pipeline::new`], which validates the configuration and
/// takes ownership of the input image without touching its pixels.
pub struct Pipeline;

impl Pipeline {
    /// Start a new pipeline for `image`.
    ///
    /// # Errors
    ///
    /// Returns [`PreprocessError::InvalidConfig`] if `config` fails
    /// [`PipelineConfig::validate`].
    pub fn new(image: RasterImage, config: PipelineConfig) -> Result<Pending, PreprocessError> {
        config.validate()?;
        Ok(Pending { config, image })
    }
}
