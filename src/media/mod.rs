// Media transcoding
//
// - Commands: ffmpeg invocation builder and child process execution
// - Processor: the two encodes a job needs (HLS segmenting, audio track)

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Main trait for media processing operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProcessor: Send + Sync {
    /// Encode the source into an HLS playlist plus numbered segments in
    /// `out_dir`, returning the playlist path
    async fn segment_for_streaming(&self, source_path: &Path, out_dir: &Path) -> Result<PathBuf>;

    /// Extract the audio track of the source into `out_dir`, returning its path
    async fn extract_audio_track(&self, source_path: &Path, out_dir: &Path) -> Result<PathBuf>;

    /// Check that the encoder can be launched
    async fn check_availability(&self) -> Result<()>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (FFmpeg-based)
    pub fn create_processor(config: MediaConfig) -> Box<dyn MediaProcessor> {
        Box::new(processor::FfmpegProcessor::new(config))
    }
}
