//! Shared types for the chatscan preprocessing pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Lossless output format handed to the text recognizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Portable Network Graphics.
    #[default]
    Png,
    /// Uncompressed Windows bitmap.
    Bmp,
}

impl OutputFormat {
    /// Conventional file extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Bmp => "bmp",
        }
    }

    /// MIME type of the encoded bytes.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Bmp => "image/bmp",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Png => f.write_str("PNG"),
            Self::Bmp => f.write_str("BMP"),
        }
    }
}

/// Configuration for the preprocessing pipeline.
///
/// The defaults reproduce the tuned values for chat screenshots; the
/// thresholds and scale factor are exposed so callers can experiment
/// (see the `chatscan-bench` tool) without touching the stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Luminance threshold for pixels classified as part of a chat
    /// bubble. Pixels brighter than this become white.
    pub bubble_threshold: u8,

    /// Luminance threshold for all other pixels.
    pub generic_threshold: u8,

    /// Nearest-neighbor enlargement factor applied after binarization.
    /// Must be finite and at least 1.0.
    pub scale_factor: f64,

    /// Encoding of the final buffer.
    pub output_format: OutputFormat,
}

impl PipelineConfig {
    /// Default luminance threshold for bubble pixels.
    pub const DEFAULT_BUBBLE_THRESHOLD: u8 = 160;
    /// Default luminance threshold for generic pixels.
    pub const DEFAULT_GENERIC_THRESHOLD: u8 = 180;
    /// Default upscale factor.
    pub const DEFAULT_SCALE_FACTOR: f64 = 2.5;
    /// Default output encoding.
    pub const DEFAULT_OUTPUT_FORMAT: OutputFormat = OutputFormat::Png;

    /// Check the invariants the stages rely on.
    ///
    /// # Errors
    ///
    /// Returns [`PreprocessError::InvalidConfig`] if `scale_factor` is
    /// not a finite number greater than or equal to 1.0.
    pub fn validate(&self) -> Result<(), PreprocessError> {
        if !self.scale_factor.is_finite() || self.scale_factor < 1.0 {
            return Err(PreprocessError::InvalidConfig(format!(
                "scale_factor must be a finite value >= 1.0, got {}",
                self.scale_factor
            )));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bubble_threshold: Self::DEFAULT_BUBBLE_THRESHOLD,
            generic_threshold: Self::DEFAULT_GENERIC_THRESHOLD,
            scale_factor: Self::DEFAULT_SCALE_FACTOR,
            output_format: Self::DEFAULT_OUTPUT_FORMAT,
        }
    }
}

/// The final, encoded pipeline output ready for the text recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    format: OutputFormat,
    dimensions: Dimensions,
    bytes: Vec<u8>,
}

impl EncodedImage {
    pub(crate) const fn new(format: OutputFormat, dimensions: Dimensions, bytes: Vec<u8>) -> Self {
        Self {
            format,
            dimensions,
            bytes,
        }
    }

    /// Encoding of [`bytes`](Self::bytes).
    #[must_use]
    pub const fn format(&self) -> OutputFormat {
        self.format
    }

    /// Pixel dimensions of the encoded image.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// The encoded file contents.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume and return the encoded file contents.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Identifies a pipeline stage in errors and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageKind {
    /// Pixel classification and black/white thresholding.
    Binarize,
    /// Nearest-neighbor enlargement.
    Upscale,
    /// 3×3 sharpening convolution.
    Sharpen,
    /// Lossless serialization of the final buffer.
    Encode,
}

impl StageKind {
    /// All stages in execution order.
    pub const ALL: [Self; 4] = [Self::Binarize, Self::Upscale, Self::Sharpen, Self::Encode];

    /// Human-readable stage name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Binarize => "binarize",
            Self::Upscale => "upscale",
            Self::Sharpen => "sharpen",
            Self::Encode => "encode",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Failure raised by an individual stage.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    /// The image has a zero (or unrepresentable) width or height.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimension {
        /// Offending width.
        width: u32,
        /// Offending height.
        height: u32,
    },

    /// The final buffer could not be serialized.
    #[error("failed to encode output image")]
    Encoding(#[from] image::ImageError),
}

/// `err` followed by each of its sources, separated by `": "`.
///
/// Error messages in this workspace describe only their own layer, so
/// this is how a full explanation is shown to users.
#[must_use]
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Errors that can occur while preprocessing one image.
///
/// No partial output accompanies an error: either every stage succeeds
/// or the caller receives only the failure.
#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    /// A stage failed; `source` carries the stage's own error.
    #[error("{stage} stage failed")]
    Stage {
        /// The stage that failed.
        stage: StageKind,
        /// What went wrong.
        #[source]
        source: StageError,
    },

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}

impl PreprocessError {
    pub(crate) const fn stage(stage: StageKind, source: StageError) -> Self {
        Self::Stage { stage, source }
    }

    /// The stage that failed, if the error came from a stage.
    #[must_use]
    pub const fn failed_stage(&self) -> Option<StageKind> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            Self::InvalidConfig(_) => None,
        }
    }

    /// Whether the root cause is a zero-sized input.
    #[must_use]
    pub const fn is_invalid_dimension(&self) -> bool {
        matches!(
            self,
            Self::Stage {
                source: StageError::InvalidDimension { .. },
                ..
            }
        )
    }

    /// Whether the root cause is an encoder failure.
    #[must_use]
    pub const fn is_encoding(&self) -> bool {
        matches!(
            self,
            Self::Stage {
                source: StageError::Encoding(_),
                ..
            }
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_constants() {
        let config = PipelineConfig::default();
        assert_eq!(config.bubble_threshold, 160);
        assert_eq!(config.generic_threshold, 180);
        assert!((config.scale_factor - 2.5).abs() < f64::EPSILON);
        assert_eq!(config.output_format, OutputFormat::Png);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_scale_factors() {
        for factor in [0.0, -2.5, 0.5, f64::NAN, f64::INFINITY] {
            let config = PipelineConfig {
                scale_factor: factor,
                ..PipelineConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(PreprocessError::InvalidConfig(_))),
                "factor {factor} should be rejected",
            );
        }
    }

    #[test]
    fn validate_accepts_identity_scale() {
        let config = PipelineConfig {
            scale_factor: 1.0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_serde_round_trip() {
        let config = PipelineConfig {
            bubble_threshold: 150,
            generic_threshold: 190,
            scale_factor: 3.0,
            output_format: OutputFormat::Bmp,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn config_missing_fields_use_defaults() {
        let config: PipelineConfig = serde_json::from_str(r#"{"scale_factor": 2.0}"#).unwrap();
        assert_eq!(config.bubble_threshold, 160);
        assert!((config.scale_factor - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stage_error_display_names_stage() {
        let err = PreprocessError::stage(
            StageKind::Upscale,
            StageError::InvalidDimension {
                width: 0,
                height: 4,
            },
        );
        assert_eq!(err.to_string(), "upscale stage failed");
        assert_eq!(
            error_chain(&err),
            "upscale stage failed: invalid image dimensions 0x4"
        );
        assert_eq!(err.failed_stage(), Some(StageKind::Upscale));
        assert!(err.is_invalid_dimension());
        assert!(!err.is_encoding());
    }

    #[test]
    fn stage_error_exposes_source() {
        let err = PreprocessError::stage(
            StageKind::Upscale,
            StageError::InvalidDimension {
                width: 0,
                height: 0,
            },
        );
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "invalid image dimensions 0x0");
        // The source is reachable through the chain only, never repeated.
        assert!(!err.to_string().contains(&source.to_string()));
        assert_eq!(error_chain(&err).matches("invalid image dimensions").count(), 1);
    }

    #[test]
    fn output_format_metadata() {
        assert_eq!(OutputFormat::Png.extension(), "png");
        assert_eq!(OutputFormat::Bmp.mime_type(), "image/bmp");
        assert_eq!(OutputFormat::Bmp.to_string(), "BMP");
    }
}
