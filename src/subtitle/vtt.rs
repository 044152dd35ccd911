use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::CaptionChunk;
use crate::config::PipelineConfig;
use crate::error::{Result, StreamsubError};
use crate::timecode::format_time;

const VTT_HEADER: &str = "WEBVTT";

/// Caption files written for one job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionPaths {
    pub original: PathBuf,
    pub translated: Option<PathBuf>,
}

/// Split translated text into one slice per chunk.
///
/// Translated text carries no timing, so its words are spread over the source
/// chunks in contiguous `ceil(words / chunks)`-sized slices. Trailing chunks
/// come back empty when there are too few words to reach them.
pub fn redistribute_words(text: &str, chunk_count: usize) -> Vec<String> {
    if chunk_count == 0 {
        return Vec::new();
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let per_chunk = words.len().div_ceil(chunk_count);

    (0..chunk_count)
        .map(|index| {
            let start = (index * per_chunk).min(words.len());
            let end = (start + per_chunk).min(words.len());
            words[start..end].join(" ")
        })
        .collect()
}

/// Render cues using each chunk's timing and the matching entry of `texts`
pub fn render_vtt<S: AsRef<str>>(chunks: &[CaptionChunk], texts: &[S]) -> String {
    let mut vtt_content = format!("{}\n\n", VTT_HEADER);

    for (index, (chunk, text)) in chunks.iter().zip(texts).enumerate() {
        vtt_content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            format_time(chunk.start),
            format_time(chunk.end),
            text.as_ref()
        ));
    }

    vtt_content
}

/// Writes source and translated caption files into a job directory
pub struct CaptionEmitter {
    caption_name: String,
    translated_caption_name: String,
}

impl CaptionEmitter {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            caption_name: config.caption_name.clone(),
            translated_caption_name: config.translated_caption_name.clone(),
        }
    }

    /// Write caption files for `chunks`.
    ///
    /// Returns `None` when there are no chunks to caption. The translated
    /// file is only written when `translated_text` is given.
    pub fn emit(
        &self,
        chunks: &[CaptionChunk],
        output_dir: &Path,
        translated_text: Option<&str>,
    ) -> Result<Option<CaptionPaths>> {
        if chunks.is_empty() {
            info!("No caption chunks, skipping caption files");
            return Ok(None);
        }

        let texts: Vec<String> = chunks.iter().map(CaptionChunk::text).collect();
        let original = output_dir.join(&self.caption_name);
        write_atomically(&original, &render_vtt(chunks, &texts))?;
        info!("Wrote {} cues to {}", chunks.len(), original.display());

        let translated = match translated_text {
            Some(text) => {
                let slices = redistribute_words(text, chunks.len());
                let path = output_dir.join(&self.translated_caption_name);
                write_atomically(&path, &render_vtt(chunks, &slices))?;
                info!("Wrote translated captions to {}", path.display());
                Some(path)
            }
            None => None,
        };

        Ok(Some(CaptionPaths { original, translated }))
    }
}

/// Write through a temp file in the same directory, then rename into place
fn write_atomically(path: &Path, content: &str) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let caption_error =
        |e: std::io::Error| StreamsubError::CaptionWriteFailed(format!("{}: {}", path.display(), e));

    let mut file = NamedTempFile::new_in(dir).map_err(caption_error)?;
    file.write_all(content.as_bytes()).map_err(caption_error)?;
    file.persist(path).map_err(|e| caption_error(e.error))?;

    debug!("Persisted {} bytes to {}", content.len(), path.display());
    Ok(())
}
