//! chatscan-ocr: text recognition boundary for preprocessed screenshots.
//!
//! This crate does not recognize text itself. It defines the settings
//! handed to a recognizer ([`OcrConfig`]), the [`OcrEngine`] trait a
//! recognizer implements, and [`Transcript`], which collects the text of
//! several screenshots into one conversation.

pub mod config;
pub mod engine;
pub mod transcript;

pub use config::{EngineMode, OcrConfig, PageSegMode};
pub use engine::{OcrEngine, OcrError};
pub use transcript::Transcript;
