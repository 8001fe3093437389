use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::transcribe::ModelSize;

/// Pipeline configuration, passed explicitly into each component. Loaded
/// from an optional `config.yaml` and then overridden by CLI flags; no
/// component reads globals or the environment directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base output directory; `downloads/` and `transcripts/` live below it
    pub output_dir: PathBuf,

    /// Audio/video quality hint forwarded to the downloader
    pub quality: String,

    /// Whisper model size
    pub model: ModelSize,

    /// Language hint; absent means the engine auto-detects
    pub language: Option<String>,

    /// Keep the downloaded audio artifact after a successful run
    pub keep_files: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: std::env::temp_dir().join("vidscribe"),
            quality: "best".to_string(),
            model: ModelSize::Base,
            language: None,
            keep_files: false,
        }
    }
}

impl Config {
    /// Load configuration from file or fall back to defaults
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => {
                let content = fs_err::read_to_string(&path)
                    .context("Failed to read config file")?;
                let config: Config = serde_yaml::from_str(&content)
                    .context("Failed to parse config file")?;
                Ok(config)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Locate the config file: current directory first for easy testing,
    /// then the platform config directory
    fn config_path() -> Option<PathBuf> {
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir().map(|dir| dir.join("vidscribe").join("config.yaml"))
    }

    /// Directory for downloaded audio artifacts
    pub fn downloads_dir(&self) -> PathBuf {
        self.output_dir.join("downloads")
    }

    /// Directory for subtitle and transcript artifacts
    pub fn transcripts_dir(&self) -> PathBuf {
        self.output_dir.join("transcripts")
    }
}
