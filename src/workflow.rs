use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::config::{Config, PipelineConfig};
use crate::error::{Result, StreamsubError};
use crate::media::{MediaProcessor, MediaProcessorFactory};
use crate::subtitle::{CaptionEmitter, CaptionPaths, chunk_words};
use crate::transcribe::{Transcriber, TranscriberFactory};
use crate::translate::{TranslationChain, TranslationChainFactory, TranslationOutcome};

const RESULT_FILE_NAME: &str = "result.json";

/// Pipeline step a job can fail in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Prepare,
    Segment,
    ExtractAudio,
    Transcribe,
    EmitCaptions,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Prepare => "prepare",
            Stage::Segment => "segment",
            Stage::ExtractAudio => "extract_audio",
            Stage::Transcribe => "transcribe",
            Stage::EmitCaptions => "emit_captions",
        };
        f.write_str(name)
    }
}

/// Lifecycle of a job. States only ever move forward; `Failed` is terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JobState {
    Created,
    Segmented,
    AudioExtracted,
    Transcribed,
    Translated,
    CaptionsEmitted,
    Completed,
    Failed { stage: Stage, cause: String },
}

impl JobState {
    fn ordinal(&self) -> u8 {
        match self {
            JobState::Created => 0,
            JobState::Segmented => 1,
            JobState::AudioExtracted => 2,
            JobState::Transcribed => 3,
            JobState::Translated => 4,
            JobState::CaptionsEmitted => 5,
            JobState::Completed => 6,
            JobState::Failed { .. } => 7,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed { .. })
    }
}

/// One upload being processed
#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub source_path: PathBuf,
    /// `<uploads_root>/<id>`, owned exclusively by this job
    pub work_dir: PathBuf,
    pub target_language: String,
    pub created_at: DateTime<Utc>,
    state: JobState,
}

impl Job {
    pub fn new<P: AsRef<Path>>(source_path: P, uploads_root: &Path, target_language: String) -> Self {
        let id = Uuid::new_v4();

        Self {
            id,
            source_path: source_path.as_ref().to_path_buf(),
            work_dir: uploads_root.join(id.to_string()),
            target_language,
            created_at: Utc::now(),
            state: JobState::Created,
        }
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    fn advance(&mut self, next: JobState) {
        debug_assert!(
            !self.state.is_terminal() && next.ordinal() > self.state.ordinal(),
            "invalid job transition {:?} -> {:?}",
            self.state,
            next
        );
        info!("Job {}: {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
    }

    /// Record the failure and tag the error with its stage
    fn fail(&mut self, stage: Stage, err: StreamsubError) -> StreamsubError {
        error!("Job {} failed at {} stage: {}", self.id, stage, err);
        self.advance(JobState::Failed {
            stage,
            cause: err.to_string(),
        });
        err.at_stage(stage)
    }
}

/// Final record returned once per completed job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub job_id: Uuid,
    pub transcript: String,
    pub translated_text: String,
    pub translated: bool,
    pub translation_provider: Option<String>,
    pub detected_language: String,
    pub target_language: String,
    pub media_stream_path: PathBuf,
    /// `None` when the transcript had no words to caption
    pub caption_paths: Option<CaptionPaths>,
    pub word_count: usize,
}

/// Public URLs for the files of a completed job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultLinks {
    pub video_url: String,
    pub subtitle_url: Option<String>,
    pub translated_subtitle_url: Option<String>,
}

impl PipelineResult {
    pub fn links(&self, config: &PipelineConfig) -> ResultLinks {
        let job_url = format!(
            "{}/{}/{}",
            config.base_url.trim_end_matches('/'),
            config.public_path.trim_matches('/'),
            self.job_id
        );
        let file_url = |path: &Path| {
            path.file_name()
                .map(|name| format!("{}/{}", job_url, name.to_string_lossy()))
        };

        ResultLinks {
            video_url: file_url(&self.media_stream_path).unwrap_or_else(|| job_url.clone()),
            subtitle_url: self.caption_paths.as_ref().and_then(|c| file_url(&c.original)),
            translated_subtitle_url: self
                .caption_paths
                .as_ref()
                .and_then(|c| c.translated.as_deref())
                .and_then(file_url),
        }
    }
}

/// Runs uploads through segment, audio extraction, transcription,
/// translation and caption emission
pub struct Workflow {
    config: Config,
    media: Box<dyn MediaProcessor>,
    transcriber: Box<dyn Transcriber>,
    translator: TranslationChain,
    emitter: CaptionEmitter,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let media = MediaProcessorFactory::create_processor(config.media.clone());
        let transcriber = TranscriberFactory::create_default(config.transcriber.clone())?;
        let translator = TranslationChainFactory::from_config(&config.translate)?;

        Ok(Self::with_components(config, media, transcriber, translator))
    }

    pub fn with_components(
        config: Config,
        media: Box<dyn MediaProcessor>,
        transcriber: Box<dyn Transcriber>,
        translator: TranslationChain,
    ) -> Self {
        let emitter = CaptionEmitter::new(&config.pipeline);

        Self {
            config,
            media,
            transcriber,
            translator,
            emitter,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check external dependencies before accepting work
    pub async fn check_dependencies(&self) -> Result<()> {
        self.media.check_availability().await
    }

    /// Process a single uploaded video.
    ///
    /// Stages run strictly in order and the first failure ends the job with
    /// `StreamsubError::StageFailed`. Files already written stay in the job
    /// directory.
    pub async fn process<P: AsRef<Path>>(&self, source_path: P, target_language: Option<&str>) -> Result<PipelineResult> {
        let source_path = source_path.as_ref();

        if !source_path.exists() {
            return Err(StreamsubError::FileNotFound(source_path.display().to_string()));
        }

        let target_language = target_language
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .unwrap_or(&self.config.pipeline.default_target_language)
            .to_string();

        let mut job = Job::new(source_path, &self.config.pipeline.uploads_root, target_language);
        let span = info_span!("job", job_id = %job.id);

        self.run(&mut job).instrument(span).await
    }

    async fn run(&self, job: &mut Job) -> Result<PipelineResult> {
        info!("Processing video: {}", job.source_path.display());

        fs::create_dir_all(&job.work_dir)
            .await
            .map_err(|e| job.fail(Stage::Prepare, e.into()))?;

        let media_stream_path = self
            .media
            .segment_for_streaming(&job.source_path, &job.work_dir)
            .await
            .map_err(|e| job.fail(Stage::Segment, e))?;
        job.advance(JobState::Segmented);

        let audio_path = self
            .media
            .extract_audio_track(&job.source_path, &job.work_dir)
            .await
            .map_err(|e| job.fail(Stage::ExtractAudio, e))?;
        job.advance(JobState::AudioExtracted);

        let transcript = self
            .transcriber
            .transcribe(&audio_path)
            .await
            .map_err(|e| job.fail(Stage::Transcribe, e))?;
        job.advance(JobState::Transcribed);

        let translation: TranslationOutcome = self
            .translator
            .translate(&transcript.text, &transcript.detected_language, &job.target_language)
            .await;
        if !translation.translated {
            info!("Transcript left untranslated");
        }
        job.advance(JobState::Translated);

        let chunks = chunk_words(&transcript.words);
        let caption_paths = self
            .emitter
            .emit(
                &chunks,
                &job.work_dir,
                translation.translated.then_some(translation.text.as_str()),
            )
            .map_err(|e| job.fail(Stage::EmitCaptions, e))?;
        job.advance(JobState::CaptionsEmitted);

        let result = PipelineResult {
            job_id: job.id,
            word_count: transcript.word_count(),
            transcript: transcript.text,
            translated_text: translation.text,
            translated: translation.translated,
            translation_provider: translation.provider,
            detected_language: transcript.detected_language,
            target_language: job.target_language.clone(),
            media_stream_path,
            caption_paths,
        };

        if let Err(e) = self.write_result(job, &result).await {
            warn!("Failed to write {}: {}", RESULT_FILE_NAME, e);
        }

        job.advance(JobState::Completed);
        Ok(result)
    }

    async fn write_result(&self, job: &Job, result: &PipelineResult) -> Result<()> {
        let content = serde_json::to_string_pretty(result)?;
        fs::write(job.work_dir.join(RESULT_FILE_NAME), content).await?;
        Ok(())
    }

    /// Process several uploads as independent jobs, at most `concurrency` at
    /// a time. Results come back in input order.
    pub async fn process_batch(
        self: Arc<Self>,
        sources: Vec<PathBuf>,
        target_language: Option<String>,
        concurrency: usize,
    ) -> Vec<(PathBuf, Result<PipelineResult>)> {
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let mut tasks = JoinSet::new();

        info!("Processing {} videos, {} at a time", sources.len(), concurrency.max(1));

        for (index, source) in sources.iter().cloned().enumerate() {
            let workflow = Arc::clone(&self);
            let semaphore = Arc::clone(&semaphore);
            let target_language = target_language.clone();

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let result = workflow.process(&source, target_language.as_deref()).await;
                (index, result)
            });
        }

        let mut slots: Vec<Option<Result<PipelineResult>>> = sources.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => error!("Batch job did not finish: {}", e),
            }
        }

        // A task that panicked or was cancelled leaves its slot empty
        sources
            .into_iter()
            .zip(slots)
            .map(|(source, slot)| {
                let result = slot.unwrap_or_else(|| {
                    Err(StreamsubError::JobAborted(source.display().to_string()))
                });
                (source, result)
            })
            .collect()
    }

    /// Extract the audio track only, into `out_dir`
    pub async fn extract_audio<P: AsRef<Path>>(&self, source_path: P, out_dir: P) -> Result<PathBuf> {
        let out_dir = out_dir.as_ref();
        fs::create_dir_all(out_dir).await?;
        self.media.extract_audio_track(source_path.as_ref(), out_dir).await
    }

    /// Run the translation chain on its own
    pub async fn translate_text(&self, text: &str, source_lang: &str, target_lang: &str) -> TranslationOutcome {
        self.translator.translate(text, source_lang, target_lang).await
    }
}
