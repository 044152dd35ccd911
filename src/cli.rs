use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline for one uploaded video
    Process {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Target language for translated captions
        #[arg(short, long)]
        target_lang: Option<String>,
    },

    /// Run the pipeline for every video in a directory
    Batch {
        /// Input directory containing video files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Target language for translated captions
        #[arg(short, long)]
        target_lang: Option<String>,

        /// Number of jobs processed at the same time
        #[arg(long, default_value = "2")]
        concurrency: usize,
    },

    /// Extract the audio track from a video file
    Extract {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Directory the audio file is written to
        #[arg(short, long)]
        output_dir: PathBuf,
    },

    /// Translate text through the provider fallback chain
    Translate {
        /// Text to translate
        #[arg(long)]
        text: String,

        /// Source language code
        #[arg(short, long, default_value = "en")]
        source: String,

        /// Target language code
        #[arg(short, long)]
        target: String,
    },

    /// Write the default configuration to a file
    Config {
        /// Output path for the configuration file
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_process() {
        let args = Args::try_parse_from(["streamsub", "-v", "process", "-i", "lesson.mp4", "-t", "es"]).unwrap();
        assert!(args.verbose);
        match args.command {
            Commands::Process { input, target_lang } => {
                assert_eq!(input, PathBuf::from("lesson.mp4"));
                assert_eq!(target_lang.as_deref(), Some("es"));
            }
            _ => panic!("expected process command"),
        }
    }

    #[test]
    fn test_batch_defaults() {
        let args = Args::try_parse_from(["streamsub", "batch", "-i", "videos"]).unwrap();
        match args.command {
            Commands::Batch { concurrency, target_lang, .. } => {
                assert_eq!(concurrency, 2);
                assert!(target_lang.is_none());
            }
            _ => panic!("expected batch command"),
        }
    }
}
