//! Streamsub - Video Streaming and Subtitle Pipeline
//!
//! Takes an uploaded video through HLS segmenting, audio extraction,
//! speech transcription, best-effort translation and WebVTT caption
//! generation, producing one result record per job.

pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod subtitle;
pub mod timecode;
pub mod transcribe;
pub mod translate;
pub mod workflow;
