//! chatscan: preprocess chat screenshots and optionally transcribe them.
//!
//! Every input is decoded, binarized, enlarged and sharpened in
//! parallel, then written next to the original (or into `--out-dir`) as
//! `<stem>.preprocessed.<ext>`. With `--ocr` each preprocessed image is
//! also piped through `tesseract` and the recognized texts are printed
//! as one conversation, screenshots separated by a blank line.
//!
//! # Usage
//!
//! ```text
//! chatscan [OPTIONS] <IMAGES>...
//! ```
//!
//! A failure on one screenshot is reported and the rest still run; the
//! exit status is non-zero if any screenshot failed.

#![allow(clippy::print_stdout)]

mod output;
mod tesseract;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chatscan_ocr::{OcrConfig, Transcript};
use chatscan_pipeline::{OutputFormat, PipelineConfig, RasterImage};
use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::tesseract::TesseractCommand;

/// Preprocess chat screenshots for text recognition.
#[derive(Parser)]
#[command(name = "chatscan", version)]
struct Cli {
    /// Screenshots to process (PNG, JPEG, BMP, WebP).
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Directory for preprocessed images (default: next to each input).
    #[arg(long)]
    out_dir: Option<PathBuf>,

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

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    #[arg(long)]
    config_json: Option<String>,

    /// Run text recognition on each preprocessed image and print the
    /// transcript.
    #[arg(long)]
    ocr: bool,

    /// Tesseract executable.
    #[arg(long, default_value = "tesseract")]
    tesseract: PathBuf,

    /// Recognition language(s), e.g. `eng` or `eng+fra`.
    #[arg(long, default_value = OcrConfig::DEFAULT_LANGUAGE)]
    lang: String,

    /// Log pipeline stages at debug level (overridden by `RUST_LOG`).
    #[arg(short, long)]
    verbose: bool,
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
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<PipelineConfig, String> {
    let config = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("invalid --config-json: {e}"))?
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
    config
        .validate()
        .map_err(|e| chatscan_pipeline::error_chain(&e))?;
    Ok(config)
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "chatscan=debug,chatscan_pipeline=debug,chatscan_ocr=debug"
    } else {
        "chatscan=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .init();
}

/// Read and decode one input file.
fn load(path: &Path) -> Result<RasterImage, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("read failed: {e}"))?;
    chatscan_pipeline::decode(&bytes).map_err(|e| chatscan_pipeline::error_chain(&e))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            tracing::error!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let mut failures = 0usize;
    let mut paths = Vec::with_capacity(cli.images.len());
    let mut rasters = Vec::with_capacity(cli.images.len());
    for path in &cli.images {
        match load(path) {
            Ok(raster) => {
                tracing::debug!(path = %path.display(), dims = %raster.dimensions(), "decoded");
                paths.push(path.as_path());
                rasters.push(raster);
            }
            Err(e) => {
                tracing::error!(path = %path.display(), "{e}");
                failures += 1;
            }
        }
    }

    let results = chatscan_pipeline::process_batch(rasters, &config);

    let engine = TesseractCommand::new(&cli.tesseract);
    let ocr_config = OcrConfig {
        language: cli.lang.clone(),
        ..OcrConfig::default()
    };
    let mut transcript = Transcript::new();
    if cli.ocr {
        tracing::debug!(
            program = %engine.program().display(),
            lang = %ocr_config.language,
            "recognition enabled"
        );
    }

    for (path, result) in paths.into_iter().zip(results) {
        let encoded = match result {
            Ok(encoded) => encoded,
            Err(e) => {
                let e = chatscan_pipeline::error_chain(&e);
                tracing::error!(path = %path.display(), "preprocessing failed: {e}");
                failures += 1;
                continue;
            }
        };

        let out = output::output_path(path, cli.out_dir.as_deref(), encoded.format());
        if let Err(e) = std::fs::write(&out, encoded.bytes()) {
            tracing::error!(path = %out.display(), "write failed: {e}");
            failures += 1;
            continue;
        }
        tracing::info!(
            input = %path.display(),
            output = %out.display(),
            dims = %encoded.dimensions(),
            "preprocessed"
        );

        if cli.ocr {
            let id = path.display().to_string();
            if let Err(e) = transcript.recognize_into(&engine, id, &encoded, &ocr_config) {
                let e = chatscan_pipeline::error_chain(&e);
                tracing::error!(path = %path.display(), "{e}");
                failures += 1;
            }
        }
    }

    if cli.ocr {
        let text = transcript.text();
        if !text.is_empty() {
            println!("{text}");
        }
    }

    if failures > 0 {
        tracing::warn!(failures, total = cli.images.len(), "some screenshots failed");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
