//! [`OcrEngine`] backed by the `tesseract` command-line program.
//!
//! The encoded image is piped to the child's stdin and the recognized
//! text is read back from its stdout, so nothing touches the disk.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use chatscan_ocr::{OcrConfig, OcrEngine, OcrError};
use chatscan_pipeline::EncodedImage;

/// Runs an external `tesseract` executable once per image.
#[derive(Debug, Clone)]
pub struct TesseractCommand {
    program: PathBuf,
}

impl TesseractCommand {
    /// Use the executable at `program` (a bare name is looked up on `PATH`).
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The executable this engine runs.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Command-line arguments for one recognition run.
    #[must_use]
    pub fn args(config: &OcrConfig) -> Vec<String> {
        let mut args = vec![
            "stdin".to_owned(),
            "stdout".to_owned(),
            "-l".to_owned(),
            config.language.clone(),
        ];
        for (name, value) in config.variables() {
            args.push("-c".to_owned());
            args.push(format!("{name}={value}"));
        }
        args
    }
}

impl OcrEngine for TesseractCommand {
    fn recognize(&self, image: &EncodedImage, config: &OcrConfig) -> Result<String, OcrError> {
        let mut child = Command::new(&self.program)
            .args(Self::args(config))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Dropping stdin closes the pipe so tesseract sees end of input.
        // A child that exits early breaks the pipe; its exit status and
        // stderr say more than the write error, so reap it first.
        let written = child
            .stdin
            .take()
            .map_or(Ok(()), |mut stdin| stdin.write_all(image.bytes()));

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(OcrError::Engine(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim(),
            )));
        }
        written?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chatscan_pipeline::{ChannelLayout, OutputFormat, PipelineConfig, RasterImage};

    use super::*;

    #[test]
    fn args_read_stdin_and_pass_every_variable() {
        let args = TesseractCommand::args(&OcrConfig::default());
        assert_eq!(&args[..4], ["stdin", "stdout", "-l", "eng"]);
        assert_eq!(args.iter().filter(|a| *a == "-c").count(), 6);
        assert!(args.contains(&"tessedit_pageseg_mode=6".to_owned()));
        assert!(args.contains(&"textord_min_linesize=2.5".to_owned()));
    }

    #[test]
    fn allow_list_stays_a_single_argument() {
        let args = TesseractCommand::args(&OcrConfig::default());
        let whitelist = args
            .iter()
            .find(|a| a.starts_with("tessedit_char_whitelist="))
            .unwrap();
        assert!(whitelist.ends_with("<>/ "));
    }

    #[test]
    fn missing_program_is_io_error() {
        let raster = RasterImage::filled(2, 2, ChannelLayout::Rgb, &[0, 0, 0]).unwrap();
        let image = chatscan_pipeline::process(raster, &PipelineConfig::default()).unwrap();
        let engine = TesseractCommand::new("/nonexistent/chatscan-test-tesseract");
        let err = engine.recognize(&image, &OcrConfig::default()).unwrap_err();
        assert!(matches!(err, OcrError::Io(_)));
    }

    #[cfg(unix)]
    #[test]
    fn early_exit_reports_status_not_broken_pipe() {
        // An uncompressed bitmap this size overflows the pipe buffer, so the
        // write fails once the child is gone.
        let raster = RasterImage::filled(1000, 1000, ChannelLayout::Rgb, &[0, 0, 0]).unwrap();
        let config = PipelineConfig {
            scale_factor: 1.0,
            output_format: OutputFormat::Bmp,
            ..PipelineConfig::default()
        };
        let image = chatscan_pipeline::process(raster, &config).unwrap();
        assert!(image.bytes().len() > 1 << 20);

        let engine = TesseractCommand::new("/bin/false");
        let err = engine.recognize(&image, &OcrConfig::default()).unwrap_err();
        assert!(
            matches!(&err, OcrError::Engine(msg) if msg.starts_with("/bin/false exited with")),
            "expected engine error, got {err:?}",
        );
    }
}
