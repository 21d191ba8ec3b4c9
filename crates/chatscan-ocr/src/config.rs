//! Recognizer settings.
//!
//! The defaults are tuned for preprocessed chat screenshots: one block
//! of left-to-right text, a restricted character set and aggressive
//! noise removal. [`OcrConfig::variables`] renders them as the
//! Tesseract variable pairs an engine passes through verbatim.

use serde::{Deserialize, Serialize};

/// Tesseract page segmentation mode (`tessedit_pageseg_mode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSegMode {
    /// Fully automatic page segmentation, no OSD.
    Auto,
    /// Assume a single column of text of variable sizes.
    SingleColumn,
    /// Assume a single uniform block of text.
    #[default]
    SingleBlock,
    /// Treat the image as a single text line.
    SingleLine,
    /// Find as much text as possible in no particular order.
    SparseText,
}

impl PageSegMode {
    /// Numeric value understood by Tesseract.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "3",
            Self::SingleColumn => "4",
            Self::SingleBlock => "6",
            Self::SingleLine => "7",
            Self::SparseText => "11",
        }
    }
}

/// Tesseract engine mode (`tessedit_ocr_engine_mode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EngineMode {
    /// Legacy engine only.
    Legacy,
    /// Neural net LSTM engine only.
    Lstm,
    /// Legacy and LSTM engines combined.
    #[default]
    Combined,
    /// Whatever the installed traineddata supports.
    Default,
}

impl EngineMode {
    /// Numeric value understood by Tesseract.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "0",
            Self::Lstm => "1",
            Self::Combined => "2",
            Self::Default => "3",
        }
    }
}

/// Characters the recognizer may emit. Ends with a space so word gaps survive.
pub const DEFAULT_CHAR_ALLOW_LIST: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789.,!?'\"-:;()[]{}@#$%^&*+=<>/ ";

/// Settings passed to an [`OcrEngine`](crate::OcrEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract language code(s), e.g. `eng` or `eng+fra`.
    pub language: String,
    /// Page layout assumption.
    pub page_segmentation: PageSegMode,
    /// Recognition engine selection.
    pub engine_mode: EngineMode,
    /// Characters the recognizer may emit.
    pub char_allow_list: String,
    /// Keep runs of spaces between words instead of collapsing them.
    pub preserve_interword_spaces: bool,
    /// Enable heavy noise removal during line finding.
    pub heavy_noise_removal: bool,
    /// Minimum text line size, in multiples of x-height.
    pub min_line_size: f64,
}

impl OcrConfig {
    /// Default recognition language.
    pub const DEFAULT_LANGUAGE: &'static str = "eng";
    /// Default minimum line size.
    pub const DEFAULT_MIN_LINE_SIZE: f64 = 2.5;

    /// Tesseract variable pairs, in a stable order.
    #[must_use]
    pub fn variables(&self) -> Vec<(&'static str, String)> {
        let flag = |on: bool| String::from(if on { "1" } else { "0" });
        vec![
            ("tessedit_char_whitelist", self.char_allow_list.clone()),
            (
                "tessedit_pageseg_mode",
                self.page_segmentation.as_str().to_owned(),
            ),
            (
                "tessedit_ocr_engine_mode",
                self.engine_mode.as_str().to_owned(),
            ),
            (
                "preserve_interword_spaces",
                flag(self.preserve_interword_spaces),
            ),
            ("textord_heavy_nr", flag(self.heavy_noise_removal)),
            ("textord_min_linesize", self.min_line_size.to_string()),
        ]
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: Self::DEFAULT_LANGUAGE.to_owned(),
            page_segmentation: PageSegMode::default(),
            engine_mode: EngineMode::default(),
            char_allow_list: DEFAULT_CHAR_ALLOW_LIST.to_owned(),
            preserve_interword_spaces: true,
            heavy_noise_removal: true,
            min_line_size: Self::DEFAULT_MIN_LINE_SIZE,
        }
    }
}
