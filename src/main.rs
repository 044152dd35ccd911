//! Streamsub - Video Streaming and Subtitle Pipeline
//!
//! Command line entry point: loads configuration, sets up logging and runs
//! uploads through the processing pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, info, warn};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use walkdir::WalkDir;

use streamsub::cli::{Args, Commands};
use streamsub::config::Config;
use streamsub::workflow::{PipelineResult, Workflow};

const VIDEO_EXTENSIONS: [&str; 7] = ["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm"];

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    info!("Starting Streamsub");

    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };
    config.apply_env_overrides();

    if let Commands::Config { output } = &args.command {
        config.save_to_file(output)?;
        println!("Configuration written to {}", output.display());
        return Ok(());
    }

    let workflow = Workflow::new(config.clone())?;

    match args.command {
        Commands::Process { input, target_lang } => {
            workflow.check_dependencies().await?;

            let result = workflow
                .process(&input, target_lang.as_deref())
                .await
                .with_context(|| format!("Failed to process {}", input.display()))?;

            print_result(&result, &config)?;
        }
        Commands::Batch {
            input_dir,
            target_lang,
            concurrency,
        } => {
            workflow.check_dependencies().await?;

            let videos = find_videos(&input_dir)?;
            info!("Found {} video files to process", videos.len());

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {elapsed} {msg}")?);
            spinner.set_message(format!("Processing {} videos", videos.len()));
            spinner.enable_steady_tick(Duration::from_millis(120));

            let results = Arc::new(workflow)
                .process_batch(videos, target_lang, concurrency)
                .await;

            spinner.finish_and_clear();

            let mut failed = 0;
            for (video, result) in results {
                match result {
                    Ok(result) => {
                        info!("Successfully processed: {}", video.display());
                        print_result(&result, &config)?;
                    }
                    Err(e) => {
                        failed += 1;
                        warn!("Failed to process {}: {}", video.display(), e);
                    }
                }
            }

            if failed > 0 {
                warn!("{} videos failed", failed);
            }
        }
        Commands::Extract { input, output_dir } => {
            let audio_path = workflow.extract_audio(&input, &output_dir).await?;
            println!("Audio extracted: {}", audio_path.display());
        }
        Commands::Translate { text, source, target } => {
            let outcome = workflow.translate_text(&text, &source, &target).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Config { .. } => {}
    }

    Ok(())
}

fn print_result(result: &PipelineResult, config: &Config) -> Result<()> {
    let output = json!({
        "result": result,
        "links": result.links(&config.pipeline),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn find_videos(input_dir: &Path) -> Result<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        anyhow::bail!("Input path is not a directory: {}", input_dir.display());
    }

    let mut videos: Vec<PathBuf> = WalkDir::new(input_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        })
        .map(|entry| entry.into_path())
        .collect();

    videos.sort();
    Ok(videos)
}

fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".streamsub").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Daily rotation
    let file_appender = rolling::daily(&log_dir, "streamsub.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
