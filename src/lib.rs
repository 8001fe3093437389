//! Vidscribe - download videos from YouTube or Bilibili and transcribe them
//!
//! This library chains two external tools - yt-dlp for media acquisition and
//! Whisper for speech recognition - into one sequential, all-or-nothing
//! pipeline. Each stage returns a uniform result envelope; a failure in any
//! stage short-circuits the rest of the run.

pub mod acquire;
pub mod cli;
pub mod config;
pub mod pipeline;
pub mod platform;
pub mod runner;
pub mod subtitle;
pub mod transcribe;
pub mod utils;

pub use acquire::{Acquirer, DownloadResult};
pub use config::Config;
pub use pipeline::{Pipeline, PipelineResult};
pub use platform::{Platform, VideoReference};
pub use runner::{SystemRunner, ToolOutput, ToolRunner};
pub use transcribe::{ModelSize, Transcriber, TranscriptionResult};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Stage-level error taxonomy. Every adapter catches these at its own
/// boundary and folds them into its result envelope; nothing propagates
/// past a stage as a raised error.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    /// A precondition was not met before any external tool ran
    #[error("{0}")]
    Validation(String),

    /// An external tool exited non-zero; the message carries its stderr
    #[error("{tool} failed: {stderr}")]
    ToolInvocation { tool: &'static str, stderr: String },

    /// An external tool's captured output did not match the expected shape
    #[error("{0}")]
    Protocol(String),

    /// The recognition model failed to initialize
    #[error("Failed to load Whisper model: {0}")]
    ModelLoad(String),

    /// Recognition logic failed after the model was loaded
    #[error("Transcription failed: {0}")]
    Processing(String),

    /// Uncategorized failure
    #[error("{0}")]
    Generic(String),
}
