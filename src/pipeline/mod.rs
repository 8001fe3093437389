use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::acquire::{Acquirer, DownloadResult};
use crate::config::Config;
use crate::platform::VideoReference;
use crate::runner::SystemRunner;
use crate::transcribe::whisper::WhisperCliEngine;
use crate::transcribe::{ModelSize, Transcriber, TranscriptionResult};

/// Acquisition stage boundary, kept as a trait so the orchestrator's
/// short-circuit behavior is testable with fakes
#[async_trait]
pub trait AcquisitionStage: Send + Sync {
    async fn acquire(&self, reference: &VideoReference, download_dir: &Path) -> DownloadResult;
}

#[async_trait]
impl AcquisitionStage for Acquirer {
    async fn acquire(&self, reference: &VideoReference, download_dir: &Path) -> DownloadResult {
        Acquirer::acquire(self, reference, download_dir).await
    }
}

/// Transcription stage boundary
#[async_trait]
pub trait TranscriptionStage: Send + Sync {
    async fn transcribe(
        &self,
        audio_path: &Path,
        model: ModelSize,
        language: Option<&str>,
        output_dir: Option<&Path>,
    ) -> TranscriptionResult;
}

#[async_trait]
impl TranscriptionStage for Transcriber {
    async fn transcribe(
        &self,
        audio_path: &Path,
        model: ModelSize,
        language: Option<&str>,
        output_dir: Option<&Path>,
    ) -> TranscriptionResult {
        Transcriber::transcribe(self, audio_path, model, language, output_dir).await
    }
}

/// Terminal envelope of a whole pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_info: Option<DownloadResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcription: Option<TranscriptionResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PipelineResult {
    fn failed(error: String) -> Self {
        Self {
            success: false,
            video_info: None,
            transcription: None,
            error: Some(error),
        }
    }
}

/// Orchestrator: acquire, then transcribe, then apply the retention
/// policy. Strictly sequential; the first failing stage ends the run and
/// no later stage is invoked. No retries, no partial success.
pub struct Pipeline {
    acquisition: Arc<dyn AcquisitionStage>,
    transcription: Arc<dyn TranscriptionStage>,
    config: Config,
}

impl Pipeline {
    /// Build the production pipeline: yt-dlp acquisition and Whisper CLI
    /// transcription over a shared process runner
    pub fn new(config: Config) -> Self {
        let runner = Arc::new(SystemRunner::new());
        let acquirer = Acquirer::new(runner.clone(), &config.quality);
        let transcriber = Transcriber::new(Arc::new(WhisperCliEngine::new(runner)));

        Self {
            acquisition: Arc::new(acquirer),
            transcription: Arc::new(transcriber),
            config,
        }
    }

    /// Build a pipeline with injected stages
    pub fn with_stages(
        acquisition: Arc<dyn AcquisitionStage>,
        transcription: Arc<dyn TranscriptionStage>,
        config: Config,
    ) -> Self {
        Self {
            acquisition,
            transcription,
            config,
        }
    }

    /// Run the full pipeline for one raw video reference
    pub async fn run(&self, raw_reference: &str) -> PipelineResult {
        let reference = VideoReference::classify(raw_reference);
        tracing::info!(
            "Starting pipeline for {} (platform: {})",
            reference.canonical_url,
            reference.platform
        );

        let download = self
            .acquisition
            .acquire(&reference, &self.config.downloads_dir())
            .await;
        if !download.success {
            let cause = download.error.as_deref().unwrap_or("Unknown error");
            return PipelineResult::failed(format!("Download failed: {}", cause));
        }

        // audio_path is present whenever acquisition reports success; a
        // success envelope without one is a broken adapter
        let audio_path = match &download.audio_path {
            Some(path) => path.clone(),
            None => {
                return PipelineResult::failed(
                    "Download failed: downloader reported no audio path".to_string(),
                )
            }
        };
        tracing::info!(
            "Downloaded: {}",
            download.title.as_deref().unwrap_or("<untitled>")
        );

        let transcription = self
            .transcription
            .transcribe(
                &audio_path,
                self.config.model,
                self.config.language.as_deref(),
                Some(&self.config.transcripts_dir()),
            )
            .await;
        if !transcription.success {
            let cause = transcription.error.as_deref().unwrap_or("Unknown error");
            return PipelineResult::failed(format!("Transcription failed: {}", cause));
        }
        tracing::info!(
            "Transcribed ({})",
            transcription.language.as_deref().unwrap_or("language unknown")
        );

        self.finalize(&audio_path);

        PipelineResult {
            success: true,
            video_info: Some(download),
            transcription: Some(transcription),
            error: None,
        }
    }

    /// Retention policy: drop the intermediate audio artifact unless the
    /// caller asked to keep it. A failed deletion is logged but does not
    /// downgrade an otherwise successful run.
    fn finalize(&self, audio_path: &Path) {
        if self.config.keep_files {
            return;
        }

        match fs_err::remove_file(audio_path) {
            Ok(()) => tracing::info!("Cleaned up audio file {}", audio_path.display()),
            Err(e) => tracing::warn!("Could not clean up audio file: {}", e),
        }
    }
}
