use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{MediaCommandBuilder, MediaProcessor};
use crate::config::MediaConfig;
use crate::error::Result;

/// Concrete implementation of media processor (FFmpeg-based)
pub struct FfmpegProcessor {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl FfmpegProcessor {
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl MediaProcessor for FfmpegProcessor {
    async fn segment_for_streaming(&self, source_path: &Path, out_dir: &Path) -> Result<PathBuf> {
        let manifest_path = out_dir.join(&self.config.manifest_name);
        let segment_pattern = out_dir.join(&self.config.segment_pattern);

        info!("Segmenting {} for streaming into {}", source_path.display(), out_dir.display());

        self.command_builder
            .segment_for_streaming(
                source_path,
                segment_pattern.as_path(),
                manifest_path.as_path(),
                &self.config.video_codec,
                &self.config.stream_audio_codec,
                self.config.hls_segment_seconds,
            )
            .execute()
            .await?;

        info!("HLS conversion done: {}", manifest_path.display());
        Ok(manifest_path)
    }

    async fn extract_audio_track(&self, source_path: &Path, out_dir: &Path) -> Result<PathBuf> {
        let audio_path = out_dir.join(&self.config.audio_name);

        info!("Extracting audio from {} to {}", source_path.display(), audio_path.display());

        self.command_builder
            .extract_audio(source_path, audio_path.as_path(), &self.config.audio_track_codec)
            .execute()
            .await?;

        info!("Audio extraction completed");
        Ok(audio_path)
    }

    async fn check_availability(&self) -> Result<()> {
        self.command_builder.version_check().execute().await?;
        info!("Media processor is available");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StreamsubError;

    fn missing_binary() -> MediaConfig {
        MediaConfig {
            binary_path: "/nonexistent/ffmpeg".to_string(),
            ..MediaConfig::default()
        }
    }

    #[tokio::test]
    async fn test_missing_encoder_fails_both_stages() {
        let dir = tempfile::tempdir().unwrap();
        let processor = FfmpegProcessor::new(missing_binary());
        let source = dir.path().join("upload.mp4");

        let err = processor.segment_for_streaming(&source, dir.path()).await.unwrap_err();
        assert!(matches!(err, StreamsubError::EncodingFailed(_)));

        let err = processor.extract_audio_track(&source, dir.path()).await.unwrap_err();
        assert!(matches!(err, StreamsubError::EncodingFailed(_)));

        assert!(processor.check_availability().await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_returns_configured_paths_on_success() {
        let dir = tempfile::tempdir().unwrap();
        // `true` ignores its arguments and exits zero
        let processor = FfmpegProcessor::new(MediaConfig {
            binary_path: "true".to_string(),
            ..MediaConfig::default()
        });
        let source = dir.path().join("upload.mp4");

        let manifest = processor.segment_for_streaming(&source, dir.path()).await.unwrap();
        assert_eq!(manifest, dir.path().join("index.m3u8"));

        let audio = processor.extract_audio_track(&source, dir.path()).await.unwrap();
        assert_eq!(audio, dir.path().join("audio.mp3"));
    }
}
