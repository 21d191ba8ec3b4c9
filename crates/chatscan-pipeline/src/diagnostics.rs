//! Pipeline diagnostics: timing and pixel counts for each stage.
//!
//! [`process_with_diagnostics`] runs the same stages as
//! [`process`](crate::process) and additionally records how long each
//! one took and what it did. Intended for threshold tuning and
//! performance work (see the `chatscan-bench` tool).
//!
//! Time is read through the [`Clock`] trait so this crate stays free of
//! platform-specific timers. Durations are serialized as fractional
//! seconds (`f64`) for JSON compatibility, since `std::time::Duration`
//! does not implement serde traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::binarize::BinarizeStats;
use crate::pipeline::Pipeline;
use crate::raster::RasterImage;
use crate::sharpen::ConvolutionStats;
use crate::types::{
    Dimensions, EncodedImage, OutputFormat, PipelineConfig, PreprocessError, StageKind,
};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Source of monotonic time for stage measurements.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// The current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Stage 1: classification and thresholding.
    pub binarize: StageDiagnostics,
    /// Stage 2: nearest-neighbor enlargement.
    pub upscale: StageDiagnostics,
    /// Stage 3: sharpening convolution.
    pub sharpen: StageDiagnostics,
    /// Stage 4: lossless encoding.
    pub encode: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Binarization counts.
    Binarize(BinarizeStats),
    /// Enlargement geometry.
    Upscale {
        /// Input dimensions.
        from: Dimensions,
        /// Output dimensions.
        to: Dimensions,
        /// Scale factor used.
        factor: f64,
    },
    /// Convolution counts.
    Sharpen(ConvolutionStats),
    /// Encoder output.
    Encode {
        /// Output format.
        format: OutputFormat,
        /// Encoded size in bytes.
        bytes: usize,
    },
}

impl PipelineDiagnostics {
    /// Diagnostics recorded for `stage`.
    #[must_use]
    pub const fn stage(&self, stage: StageKind) -> &StageDiagnostics {
        match stage {
            StageKind::Binarize => &self.binarize,
            StageKind::Upscale => &self.upscale,
            StageKind::Sharpen => &self.sharpen,
            StageKind::Encode => &self.encode,
        }
    }

    /// Every stage with its diagnostics, in execution order.
    #[must_use]
    pub fn stages(&self) -> [(StageKind, &StageDiagnostics); 4] {
        StageKind::ALL.map(|stage| (stage, self.stage(stage)))
    }

    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<12} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        for (stage, diag) in self.stages() {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{stage:<12} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Binarize(stats) => {
            let total = stats.bubble_pixels + stats.generic_pixels;
            #[allow(clippy::cast_precision_loss)]
            let bubble_pct = if total > 0 {
                stats.bubble_pixels as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            let rules: Vec<String> = stats
                .rule_counts()
                .map(|(rule, count)| format!("{}={count}", rule.name()))
                .collect();
            format!(
                "bubble={} ({bubble_pct:.1}%) [{}] generic={} white={} black={}",
                stats.bubble_pixels,
                rules.join(" "),
                stats.generic_pixels,
                stats.white_pixels,
                stats.black_pixels,
            )
        }
        StageMetrics::Upscale { from, to, factor } => format!("{from} -> {to} (x{factor})"),
        StageMetrics::Sharpen(stats) => format!(
            "interior={} clamped_channels={}",
            stats.interior_pixels, stats.clamped_channels
        ),
        StageMetrics::Encode { format, bytes } => format!("{format} {bytes} bytes"),
    }
}

/// Run the full pipeline, timing each stage with `clock`.
///
/// Produces exactly the same encoded output as [`crate::process`].
///
/// # Errors
///
/// Same as [`crate::process`].
pub fn process_with_diagnostics<C: Clock>(
    image: RasterImage,
    config: &PipelineConfig,
    clock: &C,
) -> Result<(EncodedImage, PipelineDiagnostics), PreprocessError> {
    let start = clock.now();
    let pending = Pipeline::new(image, config.clone())?;

    let t = clock.now();
    let binarized = pending.binarize();
    let binarize = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Binarize(binarized.stats()),
    };

    let t = clock.now();
    let upscaled = binarized.upscale()?;
    let upscale = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Upscale {
            from: upscaled.source_dimensions(),
            to: upscaled.image().dimensions(),
            factor: config.scale_factor,
        },
    };

    let t = clock.now();
    let sharpened = upscaled.sharpen();
    let sharpen = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Sharpen(sharpened.stats()),
    };

    let t = clock.now();
    let encoded = sharpened.encode()?;
    let encode = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Encode {
            format: encoded.format(),
            bytes: encoded.bytes().len(),
        },
    };

    let diagnostics = PipelineDiagnostics {
        binarize,
        upscale,
        sharpen,
        encode,
        total_duration: clock.elapsed(&start),
    };
    Ok((encoded, diagnostics))
}
