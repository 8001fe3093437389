use crate::runner::command_available;

/// Check if the current environment has the required external tools.
/// Returns human-readable warnings for anything missing.
pub async fn check_dependencies() -> Vec<String> {
    let mut missing = Vec::new();

    if !command_available("yt-dlp").await {
        missing.push("yt-dlp - required for video download".to_string());
    }

    if !command_available("whisper").await {
        missing.push("whisper - required for transcription".to_string());
    }

    missing
}

/// Format a second count for status output on stderr
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30), "30s");
        assert_eq!(format_duration(90), "1m 30s");
        assert_eq!(format_duration(3661), "1h 1m 1s");
        assert_eq!(format_duration(0), "0s");
    }
}
