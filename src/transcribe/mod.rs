use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::subtitle::{self, TranscriptSegment};
use crate::StageError;

pub mod whisper;

/// Whisper model sizes, from fastest to most accurate
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelSize {
    Tiny,
    Base,
    Small,
    Medium,
    Large,
}

impl ModelSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelSize::Tiny => "tiny",
            ModelSize::Base => "base",
            ModelSize::Small => "small",
            ModelSize::Medium => "medium",
            ModelSize::Large => "large",
        }
    }
}

impl std::fmt::Display for ModelSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw output of one recognition run, before any file is written
#[derive(Debug, Clone)]
pub struct Recognition {
    pub text: String,
    pub segments: Vec<TranscriptSegment>,
    pub language: Option<String>,
}

/// Speech recognition capability. Model initialization and recognition
/// are separate calls so their failures stay distinguishable; tests
/// substitute a deterministic fake.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Initialize the engine for the requested model size
    async fn load_model(&self, size: ModelSize) -> Result<(), StageError>;

    /// Recognize speech in an audio file. An absent language hint means
    /// the engine auto-detects.
    async fn recognize(
        &self,
        audio_path: &Path,
        size: ModelSize,
        language: Option<&str>,
    ) -> Result<Recognition, StageError>;
}

/// Result envelope for the transcription stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<TranscriptSegment>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srt_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txt_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TranscriptionResult {
    fn failed(error: String) -> Self {
        Self {
            success: false,
            transcript: None,
            segments: None,
            srt_path: None,
            txt_path: None,
            language: None,
            duration: None,
            error: Some(error),
        }
    }
}

/// Transcription adapter: runs the speech engine over a downloaded audio
/// file and writes the derived subtitle and transcript artifacts
pub struct Transcriber {
    engine: Arc<dyn SpeechEngine>,
}

impl Transcriber {
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        Self { engine }
    }

    /// Transcribe `audio_path` with the given model size. Output files land
    /// in `output_dir`, defaulting to the audio file's own directory;
    /// existing files at the derived paths are overwritten.
    ///
    /// Never raises past this boundary: every failure is converted into a
    /// `success=false` envelope.
    pub async fn transcribe(
        &self,
        audio_path: &Path,
        model: ModelSize,
        language: Option<&str>,
        output_dir: Option<&Path>,
    ) -> TranscriptionResult {
        match self
            .run_transcription(audio_path, model, language, output_dir)
            .await
        {
            Ok(result) => result,
            Err(e) => TranscriptionResult::failed(e.to_string()),
        }
    }

    async fn run_transcription(
        &self,
        audio_path: &Path,
        model: ModelSize,
        language: Option<&str>,
        output_dir: Option<&Path>,
    ) -> Result<TranscriptionResult, StageError> {
        // Precondition check before any model is touched
        if !audio_path.exists() {
            return Err(StageError::Validation(format!(
                "Audio file not found: {}",
                audio_path.display()
            )));
        }

        let output_dir = output_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| audio_path.parent().unwrap_or(Path::new(".")).to_path_buf());
        fs_err::create_dir_all(&output_dir)
            .map_err(|e| StageError::Generic(e.to_string()))?;

        tracing::info!("Loading Whisper model: {}", model);
        self.engine.load_model(model).await?;

        tracing::info!("Transcribing {}", audio_path.display());
        let recognition = self.engine.recognize(audio_path, model, language).await?;

        // Output names share the audio file's stem
        let stem = audio_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "transcript".to_string());
        let srt_path = output_dir.join(format!("{}.srt", stem));
        let txt_path = output_dir.join(format!("{}.txt", stem));

        let srt_content = subtitle::render_srt(&recognition.segments);
        fs_err::write(&srt_path, srt_content).map_err(|e| StageError::Generic(e.to_string()))?;
        fs_err::write(&txt_path, &recognition.text)
            .map_err(|e| StageError::Generic(e.to_string()))?;

        let duration = recognition.segments.last().map(|s| s.end).unwrap_or(0.0);

        Ok(TranscriptionResult {
            success: true,
            transcript: Some(recognition.text),
            segments: Some(recognition.segments),
            srt_path: Some(srt_path),
            txt_path: Some(txt_path),
            language: recognition.language,
            duration: Some(duration),
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FakeEngine {
        load_error: Option<String>,
        recognize_error: Option<String>,
        touched: AtomicBool,
    }

    impl FakeEngine {
        fn ok() -> Self {
            Self {
                load_error: None,
                recognize_error: None,
                touched: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl SpeechEngine for FakeEngine {
        async fn load_model(&self, _size: ModelSize) -> Result<(), StageError> {
            self.touched.store(true, Ordering::SeqCst);
            match &self.load_error {
                Some(e) => Err(StageError::ModelLoad(e.clone())),
                None => Ok(()),
            }
        }

        async fn recognize(
            &self,
            _audio_path: &Path,
            _size: ModelSize,
            _language: Option<&str>,
        ) -> Result<Recognition, StageError> {
            if let Some(e) = &self.recognize_error {
                return Err(StageError::Processing(e.clone()));
            }
            Ok(Recognition {
                text: " hello world".to_string(),
                segments: vec![
                    TranscriptSegment {
                        start: 0.0,
                        end: 1.5,
                        text: " hello ".to_string(),
                    },
                    TranscriptSegment {
                        start: 1.5,
                        end: 3.0,
                        text: "world".to_string(),
                    },
                ],
                language: Some("en".to_string()),
            })
        }
    }

    fn touch(path: &Path) {
        fs_err::write(path, b"audio").unwrap();
    }

    #[tokio::test]
    async fn test_missing_audio_skips_engine() {
        let engine = Arc::new(FakeEngine::ok());
        let transcriber = Transcriber::new(engine.clone());

        let result = transcriber
            .transcribe(Path::new("/nonexistent/a.m4a"), ModelSize::Base, None, None)
            .await;

        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Audio file not found: /nonexistent/a.m4a")
        );
        assert!(!engine.touched.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_transcribe_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("clip.m4a");
        touch(&audio);

        let transcriber = Transcriber::new(Arc::new(FakeEngine::ok()));
        let result = transcriber
            .transcribe(&audio, ModelSize::Base, None, None)
            .await;

        assert!(result.success);
        assert_eq!(result.language.as_deref(), Some("en"));
        assert_eq!(result.duration, Some(3.0));
        assert_eq!(result.transcript.as_deref(), Some(" hello world"));

        let segments = result.segments.as_deref().unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].start, 0.0);
        assert_eq!(segments[0].text, " hello ");
        assert_eq!(segments[1].end, 3.0);

        // Defaults to the audio file's own directory
        let srt_path = result.srt_path.unwrap();
        assert_eq!(srt_path, dir.path().join("clip.srt"));
        let srt = fs_err::read_to_string(&srt_path).unwrap();
        assert_eq!(
            srt,
            "1\n00:00:00,000 --> 00:00:01,500\nhello\n\n2\n00:00:01,500 --> 00:00:03,000\nworld\n"
        );

        let txt = fs_err::read_to_string(result.txt_path.unwrap()).unwrap();
        assert_eq!(txt, " hello world");
    }

    #[tokio::test]
    async fn test_transcribe_overwrites_existing_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("clip.m4a");
        touch(&audio);
        fs_err::write(dir.path().join("clip.txt"), "stale").unwrap();

        let transcriber = Transcriber::new(Arc::new(FakeEngine::ok()));
        let result = transcriber
            .transcribe(&audio, ModelSize::Base, None, None)
            .await;

        assert!(result.success);
        let txt = fs_err::read_to_string(dir.path().join("clip.txt")).unwrap();
        assert_eq!(txt, " hello world");
    }

    #[tokio::test]
    async fn test_transcribe_honors_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("clip.m4a");
        touch(&audio);
        let out = dir.path().join("transcripts");

        let transcriber = Transcriber::new(Arc::new(FakeEngine::ok()));
        let result = transcriber
            .transcribe(&audio, ModelSize::Base, None, Some(&out))
            .await;

        assert!(result.success);
        assert_eq!(result.srt_path.unwrap(), out.join("clip.srt"));
        assert!(out.join("clip.txt").exists());
    }

    #[tokio::test]
    async fn test_model_load_failure_is_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("clip.m4a");
        touch(&audio);

        let transcriber = Transcriber::new(Arc::new(FakeEngine {
            load_error: Some("no such model".to_string()),
            recognize_error: None,
            touched: AtomicBool::new(false),
        }));
        let result = transcriber
            .transcribe(&audio, ModelSize::Large, None, None)
            .await;

        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Failed to load Whisper model: no such model")
        );
    }

    #[tokio::test]
    async fn test_recognition_failure_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("clip.m4a");
        touch(&audio);

        let transcriber = Transcriber::new(Arc::new(FakeEngine {
            load_error: None,
            recognize_error: Some("decode error".to_string()),
            touched: AtomicBool::new(false),
        }));
        let result = transcriber
            .transcribe(&audio, ModelSize::Base, None, None)
            .await;

        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Transcription failed: decode error")
        );
        assert!(result.srt_path.is_none());
    }
}
