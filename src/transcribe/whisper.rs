use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

use super::{ModelSize, Recognition, SpeechEngine};
use crate::runner::ToolRunner;
use crate::subtitle::TranscriptSegment;
use crate::StageError;

/// Speech engine backed by the OpenAI Whisper command-line tool. The CLI
/// writes its JSON result next to nothing we keep, so each run gets a
/// scratch directory that is dropped afterwards.
pub struct WhisperCliEngine {
    runner: Arc<dyn ToolRunner>,
}

impl WhisperCliEngine {
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        Self { runner }
    }
}

/// Shape of the JSON document the Whisper CLI emits
#[derive(Debug, Deserialize)]
struct WhisperOutput {
    text: String,
    segments: Vec<WhisperSegment>,
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
}

#[async_trait]
impl SpeechEngine for WhisperCliEngine {
    /// The CLI loads its model lazily inside the recognition run, so
    /// initialization here can only verify the tool itself answers.
    /// Model failures that surface mid-run (bad download, corrupt cache)
    /// are reclassified from the run's stderr in `recognize`.
    async fn load_model(&self, size: ModelSize) -> Result<(), StageError> {
        let probe = self
            .runner
            .run("whisper", &["--help".to_string()])
            .await
            .map_err(|e| StageError::ModelLoad(e.to_string()))?;

        if !probe.exit_ok {
            return Err(StageError::ModelLoad(format!(
                "whisper is not available for model '{}': {}",
                size,
                probe.stderr.trim()
            )));
        }

        Ok(())
    }

    async fn recognize(
        &self,
        audio_path: &Path,
        size: ModelSize,
        language: Option<&str>,
    ) -> Result<Recognition, StageError> {
        let scratch = tempfile::tempdir().map_err(|e| StageError::Processing(e.to_string()))?;

        let mut args = vec![
            audio_path.to_string_lossy().into_owned(),
            "--model".to_string(),
            size.as_str().to_string(),
            "--output_format".to_string(),
            "json".to_string(),
            "--output_dir".to_string(),
            scratch.path().to_string_lossy().into_owned(),
        ];
        if let Some(lang) = language {
            args.push("--language".to_string());
            args.push(lang.to_string());
        }

        let output = self
            .runner
            .run("whisper", &args)
            .await
            .map_err(|e| StageError::Processing(e.to_string()))?;

        if !output.exit_ok {
            let stderr = output.stderr.trim().to_string();
            // A crash inside the CLI's model initialization (failed
            // download, corrupt cache) leaves a load_model/checksum trace
            // on stderr; that is a model error, not a recognition one.
            if stderr.contains("load_model") || stderr.contains("checksum") {
                return Err(StageError::ModelLoad(stderr));
            }
            return Err(StageError::Processing(stderr));
        }

        let stem = audio_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "transcript".to_string());
        let json_path = scratch.path().join(format!("{}.json", stem));

        let content = fs_err::read_to_string(&json_path).map_err(|e| {
            StageError::Protocol(format!("Unexpected whisper output: {}", e))
        })?;
        let parsed: WhisperOutput = serde_json::from_str(&content).map_err(|e| {
            StageError::Protocol(format!("Unexpected whisper output: {}", e))
        })?;

        let segments = parsed
            .segments
            .into_iter()
            .map(|s| TranscriptSegment {
                start: s.start,
                end: s.end,
                text: s.text,
            })
            .collect();

        Ok(Recognition {
            text: parsed.text,
            segments,
            language: parsed.language,
        })
    }
}
