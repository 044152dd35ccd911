// Speech recognition
//
// The pipeline only depends on the `Transcriber` trait; the provider-specific
// wire format lives in its own module and is normalized into `Transcript`.

pub mod deepgram;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use deepgram::{DeepgramMapper, DeepgramTranscriber};

use crate::config::TranscriberConfig;
use crate::error::Result;

/// A single recognized word with its timing in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl Word {
    pub fn new<S: Into<String>>(text: S, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// Normalized provider output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub words: Vec<Word>,
    pub detected_language: String,
}

impl Transcript {
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.text.trim().is_empty()
    }
}

/// Main trait for transcription operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file into timed words
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript>;
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    pub fn create_default(config: TranscriberConfig) -> Result<Box<dyn Transcriber>> {
        Ok(Box::new(DeepgramTranscriber::new(config)?))
    }
}
