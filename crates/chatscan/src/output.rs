//! Where preprocessed images are written.

use std::path::{Path, PathBuf};

use chatscan_pipeline::OutputFormat;

/// `<dir>/<stem>.preprocessed.<ext>`, where `dir` is `out_dir` or the
/// input's own directory.
#[must_use]
pub fn output_path(input: &Path, out_dir: Option<&Path>, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "screenshot".into(), |s| s.to_string_lossy());
    let name = format!("{stem}.preprocessed.{}", format.extension());
    let dir = out_dir.or_else(|| input.parent()).unwrap_or(Path::new(""));
    dir.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_input_directory() {
        let path = output_path(Path::new("shots/chat.jpg"), None, OutputFormat::Png);
        assert_eq!(path, Path::new("shots/chat.preprocessed.png"));
    }

    #[test]
    fn out_dir_overrides_input_directory() {
        let path = output_path(
            Path::new("shots/chat.png"),
            Some(Path::new("out")),
            OutputFormat::Bmp,
        );
        assert_eq!(path, Path::new("out/chat.preprocessed.bmp"));
    }

    #[test]
    fn bare_file_name_stays_relative() {
        let path = output_path(Path::new("chat.webp"), None, OutputFormat::Png);
        assert_eq!(path, Path::new("chat.preprocessed.png"));
    }
}
