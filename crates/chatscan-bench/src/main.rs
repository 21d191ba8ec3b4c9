//! chatscan-bench: CLI tool for threshold tuning and per-stage timing.
//!
//! Decodes one screenshot, runs the preprocessing pipeline on it with
//! configurable parameters and prints detailed per-stage diagnostics.
//! Useful for:
//!
//! - Tuning the bubble and generic thresholds for a new messaging app
//! - Seeing how many pixels each bubble rule claims
//! - Measuring per-stage durations at different scale factors
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin chatscan-bench -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use chatscan_pipeline::diagnostics::{Clock, PipelineDiagnostics};
use chatscan_pipeline::{OutputFormat, PipelineConfig, StageKind};
use clap::{Parser, ValueEnum};

/// Pipeline parameter experimentation and diagnostics for chatscan.
///
/// Runs the preprocessing pipeline on a given screenshot and prints
/// per-stage timing and pixel count diagnostics.
#[derive(Parser)]
#[command(name = "chatscan-bench", version)]
struct Cli {
    /// Path to the input screenshot (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Luminance threshold for chat bubble pixels.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_BUBBLE_THRESHOLD)]
    bubble_threshold: u8,

    /// Luminance threshold for all other pixels.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_GENERIC_THRESHOLD)]
    generic_threshold: u8,

    /// Nearest-neighbor upscale factor (at least 1.0).
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_SCALE_FACTOR)]
    scale_factor: f64,

    /// Output encoding.
    #[arg(long, value_enum, default_value_t = Format::Png)]
    format: Format,

    /// Write the preprocessed image from the first run to this file.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Number of runs for averaging.
    #[arg(
        long,
        default_value_t = 1,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..),
    )]
    runs: usize,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    /// The JSON must be a valid `PipelineConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,
}

/// Output encoding selection.
#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Portable Network Graphics.
    Png,
    /// Uncompressed Windows bitmap.
    Bmp,
}

/// Build a [`PipelineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<PipelineConfig, String> {
    let config = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        PipelineConfig {
            bubble_threshold: cli.bubble_threshold,
            generic_threshold: cli.generic_threshold,
            scale_factor: cli.scale_factor,
            output_format: match cli.format {
                Format::Png => OutputFormat::Png,
                Format::Bmp => OutputFormat::Bmp,
            },
        }
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    let raster = match chatscan_pipeline::decode(&image_bytes) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error decoding {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "Image: {} ({} bytes, {}, {} pixels)",
        cli.image_path.display(),
        image_bytes.len(),
        raster.dimensions(),
        raster.pixel_count(),
    );
    eprintln!("Config: {config:#?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        match chatscan_pipeline::diagnostics::process_with_diagnostics(
            raster.clone(),
            &config,
            &StdClock,
        ) {
            Ok((encoded, diagnostics)) => {
                if cli.json {
                    match serde_json::to_string_pretty(&diagnostics) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            eprintln!("Error serializing diagnostics: {e}");
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    println!("{}", diagnostics.report());
                }

                // Write the image on the first run only.
                if run == 0
                    && let Some(ref out_path) = cli.out
                {
                    match std::fs::write(out_path, encoded.bytes()) {
                        Ok(()) => eprintln!(
                            "{} written to {} ({} bytes, {})",
                            encoded.format(),
                            out_path.display(),
                            encoded.bytes().len(),
                            encoded.format().mime_type(),
                        ),
                        Err(e) => eprintln!("Error writing {}: {e}", out_path.display()),
                    }
                }

                all_diagnostics.push(diagnostics);
            }
            Err(e) => {
                eprintln!("Pipeline error: {}", chatscan_pipeline::error_chain(&e));
                return ExitCode::FAILURE;
            }
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    ExitCode::SUCCESS
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[PipelineDiagnostics]) {
    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    println!();
    println!("{:<12} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(26));

    for stage in StageKind::ALL {
        let stage_mean = all_diagnostics
            .iter()
            .map(|d| d.stage(stage).duration.as_secs_f64() * 1000.0)
            .sum::<f64>()
            / all_diagnostics.len() as f64;
        println!("{stage:<12} {stage_mean:>10.3}ms");
    }
}
