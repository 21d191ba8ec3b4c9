//! The recognizer boundary.

use chatscan_pipeline::EncodedImage;

use crate::config::OcrConfig;

/// Errors raised while recognizing text.
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    /// The engine ran but reported a failure.
    #[error("text recognition failed: {0}")]
    Engine(String),

    /// The engine produced only whitespace.
    #[error("No text found in image")]
    NoText,

    /// The engine could not be started or talked to.
    #[error("recognizer I/O failed")]
    Io(#[from] std::io::Error),
}

/// Something that turns a preprocessed image into text.
///
/// Implementations receive the encoded bytes exactly as the pipeline
/// produced them and pass `config` through without reinterpreting it.
pub trait OcrEngine {
    /// Recognize the text in `image`.
    ///
    /// # Errors
    ///
    /// Returns [`OcrError`] if recognition could not be performed.
    fn recognize(&self, image: &EncodedImage, config: &OcrConfig) -> Result<String, OcrError>;
}

impl<E: OcrEngine + ?Sized> OcrEngine for &E {
    fn recognize(&self, image: &EncodedImage, config: &OcrConfig) -> Result<String, OcrError> {
        (**self).recognize(image, config)
    }
}
