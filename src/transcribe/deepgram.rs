use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use super::{Transcriber, Transcript, Word};
use crate::config::TranscriberConfig;
use crate::error::{Result, StreamsubError};

/// Capability flags sent with every request
const REQUEST_OPTIONS: [(&str, &str); 5] = [
    ("smart_format", "true"),
    ("punctuate", "true"),
    ("detect_language", "true"),
    ("diarize", "false"),
    ("utterances", "true"),
];

#[derive(Debug, Default, Deserialize)]
pub struct DeepgramResponse {
    #[serde(default)]
    pub results: Option<DeepgramResults>,
}

// List fields are optional because the provider may send `null` for them

#[derive(Debug, Default, Deserialize)]
pub struct DeepgramResults {
    #[serde(default)]
    pub channels: Option<Vec<DeepgramChannel>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeepgramChannel {
    #[serde(default)]
    pub alternatives: Option<Vec<DeepgramAlternative>>,
    #[serde(default)]
    pub detected_language: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeepgramAlternative {
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub words: Option<Vec<DeepgramWord>>,
}

#[derive(Debug, Deserialize)]
pub struct DeepgramWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
    /// Present when smart formatting is on; carries the sentence punctuation
    #[serde(default)]
    pub punctuated_word: Option<String>,
}

/// Maps the provider response onto `Transcript`
pub struct DeepgramMapper;

impl DeepgramMapper {
    pub fn to_transcript(response: DeepgramResponse, default_language: &str) -> Transcript {
        let channel = response
            .results
            .and_then(|results| results.channels.unwrap_or_default().into_iter().next())
            .unwrap_or_default();

        let detected_language = channel
            .detected_language
            .filter(|lang| !lang.trim().is_empty())
            .unwrap_or_else(|| default_language.to_string());

        let alternative = channel
            .alternatives
            .unwrap_or_default()
            .into_iter()
            .next()
            .unwrap_or_default();

        let words = alternative
            .words
            .unwrap_or_default()
            .into_iter()
            .map(|w| Word {
                text: w.punctuated_word.filter(|p| !p.is_empty()).unwrap_or(w.word),
                start: w.start,
                end: w.end,
            })
            .collect();

        Transcript {
            text: alternative.transcript.unwrap_or_default(),
            words,
            detected_language,
        }
    }
}

pub struct DeepgramTranscriber {
    client: Client,
    config: TranscriberConfig,
}

impl DeepgramTranscriber {
    pub fn new(config: TranscriberConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                StreamsubError::TranscriptionUnavailable("no speech recognition API key configured".to_string())
            })
    }
}

#[async_trait]
impl Transcriber for DeepgramTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
        let api_key = self.api_key()?;

        let audio = tokio::fs::read(audio_path).await.map_err(|e| {
            StreamsubError::TranscriptionUnavailable(format!(
                "failed to read audio {}: {}",
                audio_path.display(),
                e
            ))
        })?;

        debug!("Sending {} bytes of audio to {}", audio.len(), self.config.endpoint);

        let response = self
            .client
            .post(&self.config.endpoint)
            .header(AUTHORIZATION, format!("Token {}", api_key))
            .header(CONTENT_TYPE, &self.config.content_type)
            .query(&REQUEST_OPTIONS)
            .body(audio)
            .send()
            .await
            .map_err(|e| StreamsubError::TranscriptionUnavailable(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(StreamsubError::TranscriptionUnavailable(format!(
                "provider returned {}: {}",
                status, error_text
            )));
        }

        let body: DeepgramResponse = response
            .json()
            .await
            .map_err(|e| StreamsubError::TranscriptionUnavailable(format!("failed to parse response: {}", e)))?;

        let transcript = DeepgramMapper::to_transcript(body, &self.config.default_language);

        info!(
            "Transcription completed: {} words, detected language {}",
            transcript.word_count(),
            transcript.detected_language
        );

        Ok(transcript)
    }
}
