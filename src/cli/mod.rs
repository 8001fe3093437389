use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::transcribe::ModelSize;

#[derive(Parser)]
#[command(
    name = "vidscribe",
    about = "Download videos from YouTube or Bilibili and transcribe them with Whisper",
    version,
    long_about = "Chains yt-dlp and Whisper into one sequential pipeline. Every \
                  subcommand prints exactly one JSON result envelope on stdout and \
                  exits 0 on success, 1 on failure; progress goes to stderr."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download a video's audio and transcribe it in one run
    Run {
        /// Video URL or bare Bilibili id (BV…/av…)
        #[arg(value_name = "URL")]
        url: String,

        /// Whisper model size
        #[arg(short, long, value_enum)]
        model: Option<ModelSize>,

        /// Language hint for transcription (auto-detect if not specified)
        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,

        /// Base output directory
        #[arg(short, long, value_name = "DIR", env = "VIDSCRIBE_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,

        /// Keep the downloaded audio file after transcription
        #[arg(long)]
        keep_files: bool,
    },

    /// Download a video's audio stream only
    Download {
        /// Video URL or bare Bilibili id (BV…/av…)
        #[arg(value_name = "URL")]
        url: String,

        /// Base output directory
        #[arg(short, long, value_name = "DIR", env = "VIDSCRIBE_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,

        /// Quality hint forwarded to the downloader
        #[arg(long, value_name = "QUALITY")]
        quality: Option<String>,
    },

    /// Transcribe an existing audio file
    Transcribe {
        /// Path to the audio file
        #[arg(value_name = "AUDIO")]
        audio: PathBuf,

        /// Whisper model size
        #[arg(short, long, value_enum)]
        model: Option<ModelSize>,

        /// Language hint for transcription (auto-detect if not specified)
        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,

        /// Output directory (defaults to the audio file's directory)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },
}
