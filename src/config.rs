use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, StreamsubError};

fn default_attempt_timeout_secs() -> u64 {
    10
}

fn default_transcribe_timeout_secs() -> u64 {
    300
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub media: MediaConfig,
    pub transcriber: TranscriberConfig,
    pub translate: TranslateConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Target duration of each HLS segment in seconds
    pub hls_segment_seconds: u32,
    /// File name of the HLS playlist written into the job directory
    pub manifest_name: String,
    /// printf-style pattern for numbered segment files
    pub segment_pattern: String,
    /// Video codec used for the streaming encode
    pub video_codec: String,
    /// Audio codec used for the streaming encode
    pub stream_audio_codec: String,
    /// Audio codec used when extracting the standalone audio track
    pub audio_track_codec: String,
    /// File name of the extracted audio track
    pub audio_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriberConfig {
    /// Speech recognition endpoint
    pub endpoint: String,
    /// API key; the transcription stage fails without one
    #[serde(default)]
    pub api_key: Option<String>,
    /// Whole-request timeout in seconds
    #[serde(default = "default_transcribe_timeout_secs")]
    pub timeout_secs: u64,
    /// Language reported when the provider does not detect one
    pub default_language: String,
    /// Content type sent with the raw audio body
    pub content_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Timeout applied to each provider attempt
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,
    /// Providers in priority order
    pub providers: Vec<ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub endpoint: String,
    /// Input is cut to this many characters before calling the provider
    #[serde(default)]
    pub max_chars: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// LibreTranslate: JSON POST
    Libre,
    /// MyMemory: query-parameter GET
    MyMemory,
    /// Lingva: path-parameter GET
    Lingva,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root under which one working directory per job is created
    pub uploads_root: PathBuf,
    /// Public base URL used to build result links
    pub base_url: String,
    /// URL path under `base_url` at which `uploads_root` is served
    pub public_path: String,
    /// Target language used when the caller does not supply one
    pub default_target_language: String,
    /// File name of the source-language caption file
    pub caption_name: String,
    /// File name of the translated caption file
    pub translated_caption_name: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            hls_segment_seconds: 10,
            manifest_name: "index.m3u8".to_string(),
            segment_pattern: "segment%03d.ts".to_string(),
            video_codec: "libx264".to_string(),
            stream_audio_codec: "aac".to_string(),
            audio_track_codec: "libmp3lame".to_string(),
            audio_name: "audio.mp3".to_string(),
        }
    }
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.deepgram.com/v1/listen".to_string(),
            api_key: None,
            timeout_secs: default_transcribe_timeout_secs(),
            default_language: "en".to_string(),
            content_type: "audio/mp3".to_string(),
        }
    }
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            attempt_timeout_secs: default_attempt_timeout_secs(),
            providers: vec![
                ProviderConfig {
                    kind: ProviderKind::Libre,
                    endpoint: "https://libretranslate.de/translate".to_string(),
                    max_chars: None,
                },
                ProviderConfig {
                    kind: ProviderKind::MyMemory,
                    endpoint: "https://api.mymemory.translated.net/get".to_string(),
                    max_chars: Some(500),
                },
                ProviderConfig {
                    kind: ProviderKind::Lingva,
                    endpoint: "https://lingva.ml/api/v1".to_string(),
                    max_chars: Some(1000),
                },
            ],
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            uploads_root: PathBuf::from("./uploads/courses"),
            base_url: "http://localhost:8000".to_string(),
            public_path: "uploads/courses".to_string(),
            default_target_language: "en".to_string(),
            caption_name: "subtitles.vtt".to_string(),
            translated_caption_name: "subtitles-translated.vtt".to_string(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| StreamsubError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| StreamsubError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| StreamsubError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| StreamsubError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Fold process environment into the configuration.
    ///
    /// Called once at startup; components only ever see the resulting struct.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("DEEPGRAM_API_KEY").filter(|k| !k.trim().is_empty()) {
            debug!("Using speech recognition key from DEEPGRAM_API_KEY");
            self.transcriber.api_key = Some(key);
        }
        if let Some(url) = lookup("BASE_URL").filter(|u| !u.trim().is_empty()) {
            debug!("Using base URL from BASE_URL: {}", url);
            self.pipeline.base_url = url;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_provider_order() {
        let config = Config::default();
        let kinds: Vec<ProviderKind> = config.translate.providers.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![ProviderKind::Libre, ProviderKind::MyMemory, ProviderKind::Lingva]);
        assert_eq!(config.translate.attempt_timeout_secs, 10);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.pipeline.base_url = "https://cdn.example.com".to_string();
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.pipeline.base_url, "https://cdn.example.com");
        assert_eq!(loaded.translate.providers[1].max_chars, Some(500));
        assert!(loaded.transcriber.api_key.is_none());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::from_file("/nonexistent/streamsub.toml").unwrap_err();
        assert!(matches!(err, StreamsubError::Config(_)));
    }

    #[test]
    fn test_overrides_ignore_blank_values() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "DEEPGRAM_API_KEY" => Some("secret".to_string()),
            "BASE_URL" => Some("  ".to_string()),
            _ => None,
        });

        assert_eq!(config.transcriber.api_key.as_deref(), Some("secret"));
        assert_eq!(config.pipeline.base_url, "http://localhost:8000");
    }
}
