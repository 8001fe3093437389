use serde::{Deserialize, Serialize};

/// Video platform resolved from a raw reference string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Bilibili,
    Unknown,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Bilibili => "bilibili",
            Platform::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A video reference classified and normalized once per run. Immutable
/// after construction; the canonical URL is what gets handed to yt-dlp.
#[derive(Debug, Clone)]
pub struct VideoReference {
    pub raw: String,
    pub platform: Platform,
    pub canonical_url: String,
}

impl VideoReference {
    /// Classify a raw reference and normalize it to a canonical URL.
    ///
    /// Classification is case-sensitive substring/prefix matching in fixed
    /// priority order: YouTube host markers first, then Bilibili hosts,
    /// short links, or bare `BV…`/`av…` ids. Anything else is `unknown`,
    /// which is a valid outcome - yt-dlp may still accept the raw URL.
    pub fn classify(raw: &str) -> Self {
        let platform = detect_platform(raw);

        // Bare Bilibili ids expand to a full video URL; everything else
        // passes through untouched.
        let canonical_url = if platform == Platform::Bilibili
            && (raw.starts_with("BV") || raw.starts_with("av"))
        {
            format!("https://www.bilibili.com/video/{}", raw)
        } else {
            raw.to_string()
        };

        Self {
            raw: raw.to_string(),
            platform,
            canonical_url,
        }
    }
}

fn detect_platform(url: &str) -> Platform {
    if url.contains("youtube.com") || url.contains("youtu.be") {
        Platform::Youtube
    } else if url.contains("bilibili.com")
        || url.contains("b23.tv")
        || url.starts_with("BV")
        || url.starts_with("av")
    {
        Platform::Bilibili
    } else {
        Platform::Unknown
    }
}
