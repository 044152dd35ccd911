use thiserror::Error;

use crate::workflow::Stage;

#[derive(Error, Debug)]
pub enum StreamsubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Transcription unavailable: {0}")]
    TranscriptionUnavailable(String),

    #[error("Caption write failed: {0}")]
    CaptionWriteFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Job aborted before finishing: {0}")]
    JobAborted(String),

    #[error("{stage} stage failed: {cause}")]
    StageFailed {
        stage: Stage,
        cause: Box<StreamsubError>,
    },
}

impl StreamsubError {
    /// Tag an error with the pipeline stage it escaped from
    pub fn at_stage(self, stage: Stage) -> Self {
        match self {
            // Already tagged errors keep their original stage
            tagged @ Self::StageFailed { .. } => tagged,
            cause => Self::StageFailed {
                stage,
                cause: Box::new(cause),
            },
        }
    }

    /// Stage that failed, when this is a tagged job failure
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, StreamsubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_stage_tags_once() {
        let err = StreamsubError::EncodingFailed("exit status 1".to_string())
            .at_stage(Stage::Segment)
            .at_stage(Stage::Transcribe);

        assert_eq!(err.stage(), Some(Stage::Segment));
        assert_eq!(err.to_string(), "segment stage failed: Encoding failed: exit status 1");
    }

    #[test]
    fn test_untagged_error_has_no_stage() {
        let err = StreamsubError::Config("bad".to_string());
        assert!(err.stage().is_none());
    }
}
