//! Assembling a conversation from several recognized screenshots.
//!
//! Entries keep the order in which their ids were first added.
//! Recognizing an id again replaces its text in place.

use chatscan_pipeline::EncodedImage;

use crate::config::OcrConfig;
use crate::engine::{OcrEngine, OcrError};

/// Separator placed between screenshots in [`Transcript::text`].
pub const ENTRY_SEPARATOR: &str = "\n\n";

/// Recognized text per screenshot, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<(String, String)>,
}

impl Transcript {
    /// An empty transcript.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Recognize `image` and store the trimmed text under `id`.
    ///
    /// Nothing is stored when recognition fails.
    ///
    /// # Errors
    ///
    /// Returns [`OcrError::NoText`] if the engine produced only
    /// whitespace, or whatever error the engine raised.
    pub fn recognize_into<E: OcrEngine + ?Sized>(
        &mut self,
        engine: &E,
        id: impl Into<String>,
        image: &EncodedImage,
        config: &OcrConfig,
    ) -> Result<&str, OcrError> {
        let id = id.into();
        let _span = tracing::debug_span!("recognize", %id).entered();
        let raw = engine.recognize(image, config)?;
        let text = raw.trim();
        if text.is_empty() {
            return Err(OcrError::NoText);
        }
        tracing::debug!(chars = text.len(), "recognized");
        Ok(self.insert(id, text.to_owned()))
    }

    /// Store `text` under `id`, replacing any previous text for that id.
    pub fn insert(&mut self, id: impl Into<String>, text: String) -> &str {
        let id = id.into();
        let index = match self.entries.iter().position(|(k, _)| *k == id) {
            Some(i) => {
                self.entries[i].1 = text;
                i
            }
            None => {
                self.entries.push((id, text));
                self.entries.len() - 1
            }
        };
        &self.entries[index].1
    }

    /// Remove the text stored under `id`, returning it.
    pub fn remove(&mut self, id: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == id)?;
        Some(self.entries.remove(index).1)
    }

    /// Text stored under `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == id)
            .map(|(_, v)| v.as_str())
    }

    /// Number of stored screenshots.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been recognized.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All non-blank entries joined by a blank line.
    #[must_use]
    pub fn text(&self) -> String {
        self.entries
            .iter()
            .map(|(_, text)| text.as_str())
            .filter(|text| !text.trim().is_empty())
            .collect::<Vec<_>>()
            .join(ENTRY_SEPARATOR)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;

    use chatscan_pipeline::{ChannelLayout, PipelineConfig, RasterImage};

    use super::*;

    /// Engine that replays canned responses in order.
    struct Scripted {
        responses: RefCell<Vec<Result<String, OcrError>>>,
    }

    impl Scripted {
        fn new(mut responses: Vec<Result<String, OcrError>>) -> Self {
            responses.reverse();
            Self {
                responses: RefCell::new(responses),
            }
        }
    }

    impl OcrEngine for Scripted {
        fn recognize(&self, _: &EncodedImage, _: &OcrConfig) -> Result<String, OcrError> {
            self.responses
                .borrow_mut()
                .pop()
                .unwrap_or_else(|| Err(OcrError::Engine("script exhausted".into())))
        }
    }

    fn image() -> EncodedImage {
        let raster = RasterImage::filled(2, 2, ChannelLayout::Rgb, &[255, 255, 255]).unwrap();
        chatscan_pipeline::process(raster, &PipelineConfig::default()).unwrap()
    }

    #[test]
    fn entries_are_trimmed_and_joined_with_blank_line() {
        let engine = Scripted::new(vec![Ok("  hi there\n".into()), Ok("\nsee you\n\n".into())]);
        let mut transcript = Transcript::new();
        let config = OcrConfig::default();
        transcript.recognize_into(&engine, "a", &image(), &config).unwrap();
        transcript.recognize_into(&engine, "b", &image(), &config).unwrap();
        assert_eq!(transcript.text(), "hi there\n\nsee you");
    }

    #[test]
    fn whitespace_only_output_is_no_text() {
        let engine = Scripted::new(vec![Ok(" \n\t ".into())]);
        let mut transcript = Transcript::new();
        let err = transcript
            .recognize_into(&engine, "a", &image(), &OcrConfig::default())
            .unwrap_err();
        assert!(matches!(err, OcrError::NoText));
        assert_eq!(err.to_string(), "No text found in image");
        assert!(transcript.is_empty());
    }

    #[test]
    fn engine_errors_store_nothing() {
        let engine = Scripted::new(vec![Err(OcrError::Engine("boom".into()))]);
        let mut transcript = Transcript::new();
        assert!(
            transcript
                .recognize_into(&engine, "a", &image(), &OcrConfig::default())
                .is_err()
        );
        assert_eq!(transcript.len(), 0);
    }

    #[test]
    fn remove_drops_entry_from_text() {
        let mut transcript = Transcript::new();
        transcript.insert("a", "first".into());
        transcript.insert("b", "second".into());
        assert_eq!(transcript.remove("a").as_deref(), Some("first"));
        assert_eq!(transcript.remove("a"), None);
        assert_eq!(transcript.text(), "second");
    }

    #[test]
    fn reinserting_keeps_position() {
        let mut transcript = Transcript::new();
        transcript.insert("a", "one".into());
        transcript.insert("b", "two".into());
        transcript.insert("a", "uno".into());
        assert_eq!(transcript.text(), "uno\n\ntwo");
        assert_eq!(transcript.get("a"), Some("uno"));
    }

    #[test]
    fn blank_entries_are_skipped() {
        let mut transcript = Transcript::new();
        transcript.insert("a", "one".into());
        transcript.insert("b", "   ".into());
        transcript.insert("c", "three".into());
        assert_eq!(transcript.text(), "one\n\nthree");
    }
}
