use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, StreamsubError};

/// Lines of encoder stderr kept in error messages
const STDERR_TAIL_LINES: usize = 20;

/// Abstract media processing command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Set video codec
    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Disable video
    pub fn no_video(self) -> Self {
        self.arg("-vn")
    }

    /// Run the command to completion.
    ///
    /// The child is killed if the returned future is dropped before it exits.
    pub async fn execute(&self) -> Result<()> {
        debug!("Executing media processing command: {} {:?}", self.binary_path, self.args);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                StreamsubError::EncodingFailed(format!(
                    "failed to launch {} for {}: {}",
                    self.binary_path, self.description, e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StreamsubError::EncodingFailed(format!(
                "{} failed ({}): {}",
                self.description,
                output.status,
                stderr_tail(&stderr)
            )));
        }

        Ok(())
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().collect();
    let skip = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[skip..].join("\n")
}

/// Builder for the encoder invocations a job needs
pub struct MediaCommandBuilder {
    binary_path: String,
}

impl MediaCommandBuilder {
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Build VOD HLS segmenting command
    pub fn segment_for_streaming<P: AsRef<Path>>(
        &self,
        video_path: P,
        segment_pattern: P,
        manifest_path: P,
        video_codec: &str,
        audio_codec: &str,
        segment_seconds: u32,
    ) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "HLS segmenting")
            .overwrite()
            .input(video_path)
            .video_codec(video_codec)
            .audio_codec(audio_codec)
            .arg("-hls_time")
            .arg(segment_seconds.to_string())
            .arg("-hls_playlist_type")
            .arg("vod")
            .arg("-hls_segment_filename")
            .arg(segment_pattern.as_ref().to_string_lossy().to_string())
            .arg("-start_number")
            .arg("0")
            .output(manifest_path)
    }

    /// Build audio extraction command
    pub fn extract_audio<P: AsRef<Path>>(&self, video_path: P, audio_path: P, audio_codec: &str) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Audio extraction")
            .input(video_path)
            .no_video()
            .audio_codec(audio_codec)
            .overwrite()
            .output(audio_path)
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check").arg("-version")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_segment_command_args() {
        let builder = MediaCommandBuilder::new("ffmpeg");
        let cmd = builder.segment_for_streaming(
            PathBuf::from("in.mp4"),
            PathBuf::from("out/segment%03d.ts"),
            PathBuf::from("out/index.m3u8"),
            "libx264",
            "aac",
            10,
        );

        assert_eq!(cmd.binary_path, "ffmpeg");
        assert_eq!(
            cmd.args,
            vec![
                "-y", "-i", "in.mp4", "-c:v", "libx264", "-c:a", "aac", "-hls_time", "10",
                "-hls_playlist_type", "vod", "-hls_segment_filename", "out/segment%03d.ts",
                "-start_number", "0", "out/index.m3u8",
            ]
        );
    }

    #[test]
    fn test_extract_audio_args() {
        let cmd = MediaCommandBuilder::new("ffmpeg").extract_audio(
            Path::new("in.mp4"),
            Path::new("out/audio.mp3"),
            "libmp3lame",
        );
        assert_eq!(cmd.args, vec!["-i", "in.mp4", "-vn", "-c:a", "libmp3lame", "-y", "out/audio.mp3"]);
    }

    #[test]
    fn test_stderr_tail() {
        let stderr: String = (0..30).map(|i| format!("line {}\n", i)).collect();
        let tail = stderr_tail(&stderr);
        assert!(tail.starts_with("line 10"));
        assert!(tail.ends_with("line 29"));
    }

    #[tokio::test]
    async fn test_launch_failure_is_encoding_error() {
        let cmd = MediaCommand::new("/nonexistent/ffmpeg", "HLS segmenting");
        let err = cmd.execute().await.unwrap_err();
        assert!(matches!(err, StreamsubError::EncodingFailed(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_status_decides_success() {
        assert!(MediaCommand::new("true", "noop").execute().await.is_ok());

        let err = MediaCommand::new("false", "noop").execute().await.unwrap_err();
        assert!(err.to_string().contains("noop failed"));
    }
}
