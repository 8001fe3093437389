use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::platform::{Platform, VideoReference};
use crate::runner::ToolRunner;
use crate::StageError;

/// Result envelope for the acquisition stage. On failure only `success`,
/// `error` and `url` are populated; absent optionals are skipped when the
/// envelope is serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadResult {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,

    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DownloadResult {
    fn failed(url: &str, error: String) -> Self {
        Self {
            success: false,
            platform: None,
            video_id: None,
            title: None,
            audio_path: None,
            duration: None,
            url: url.to_string(),
            error: Some(error),
        }
    }
}

/// Acquisition adapter: drives yt-dlp to fetch an audio-only stream and
/// captures its positional output into a `DownloadResult`
pub struct Acquirer {
    runner: Arc<dyn ToolRunner>,
    quality: String,
}

impl Acquirer {
    pub fn new(runner: Arc<dyn ToolRunner>, quality: &str) -> Self {
        Self {
            runner,
            quality: quality.to_string(),
        }
    }

    /// Download the referenced video's audio into `download_dir`.
    ///
    /// Never raises past this boundary: every failure is converted into a
    /// `success=false` envelope. No retries.
    pub async fn acquire(&self, reference: &VideoReference, download_dir: &Path) -> DownloadResult {
        match self.run_download(reference, download_dir).await {
            Ok(result) => result,
            Err(e) => DownloadResult::failed(&reference.canonical_url, e.to_string()),
        }
    }

    async fn run_download(
        &self,
        reference: &VideoReference,
        download_dir: &Path,
    ) -> Result<DownloadResult, StageError> {
        fs_err::create_dir_all(download_dir)
            .map_err(|e| StageError::Generic(e.to_string()))?;

        let url = &reference.canonical_url;
        let output_template = download_dir.join("%(id)s.%(ext)s");

        tracing::info!("Downloading audio for {} ({})", url, reference.platform);
        tracing::debug!("Quality hint: {}", self.quality);

        // id/title/duration print before the download, the file path after
        // the move, so captured stdout reads positionally:
        // id, title, duration, path.
        let args = vec![
            "--format".to_string(),
            "bestaudio/best".to_string(),
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            "m4a".to_string(),
            "--output".to_string(),
            output_template.to_string_lossy().into_owned(),
            "--print".to_string(),
            "id".to_string(),
            "--print".to_string(),
            "title".to_string(),
            "--print".to_string(),
            "duration".to_string(),
            "--print".to_string(),
            "after_move:filepath".to_string(),
            url.clone(),
        ];

        let output = self
            .runner
            .run("yt-dlp", &args)
            .await
            .map_err(|e| StageError::Generic(e.to_string()))?;

        if !output.exit_ok {
            return Err(StageError::ToolInvocation {
                tool: "yt-dlp",
                stderr: output.stderr,
            });
        }

        let stdout = output.stdout.trim();
        let lines: Vec<&str> = stdout.lines().collect();
        if lines.len() < 4 {
            return Err(StageError::Protocol(format!(
                "Unexpected yt-dlp output: {}",
                stdout
            )));
        }

        Ok(DownloadResult {
            success: true,
            platform: Some(reference.platform),
            video_id: Some(lines[0].to_string()),
            title: Some(lines[1].to_string()),
            duration: Some(parse_duration(lines[2])?),
            audio_path: Some(PathBuf::from(lines[3])),
            url: url.clone(),
            error: None,
        })
    }
}

/// Coerce the reported duration to whole non-negative seconds. An empty
/// line defaults to 0; non-numeric text is a protocol violation.
fn parse_duration(raw: &str) -> Result<u64, StageError> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "NA" {
        return Ok(0);
    }

    let seconds: f64 = raw.parse().map_err(|_| {
        StageError::Protocol(format!("Unexpected yt-dlp duration: {}", raw))
    })?;

    Ok(seconds.max(0.0) as u64)
}
