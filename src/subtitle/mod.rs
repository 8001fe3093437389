use serde::{Deserialize, Serialize};

/// A single timed span of recognized speech. Start must precede end;
/// sequences are ordered by start and non-overlapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time in seconds
    pub start: f64,

    /// End time in seconds
    pub end: f64,

    /// Segment text
    pub text: String,
}

/// Convert fractional seconds to the SRT timestamp format `HH:MM:SS,mmm`.
/// Every component is truncated, never rounded.
pub fn format_timestamp(seconds: f64) -> String {
    let hours = (seconds / 3600.0).floor() as u64;
    let minutes = ((seconds % 3600.0) / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    let millis = ((seconds % 1.0) * 1000.0).floor() as u64;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Render an ordered segment sequence as an SRT subtitle body.
///
/// Each segment becomes a 4-line entry: 1-based index, timing line,
/// trimmed text, blank separator. Pure and deterministic; callers can
/// test it without touching any recognition engine.
pub fn render_srt(segments: &[TranscriptSegment]) -> String {
    let mut lines = Vec::with_capacity(segments.len() * 4);

    for (i, segment) in segments.iter().enumerate() {
        lines.push((i + 1).to_string());
        lines.push(format!(
            "{} --> {}",
            format_timestamp(segment.start),
            format_timestamp(segment.end)
        ));
        lines.push(segment.text.trim().to_string());
        // Empty line between subtitles
        lines.push(String::new());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp_truncates() {
        assert_eq!(format_timestamp(3725.6789), "01:02:05,678");
        assert_eq!(format_timestamp(0.0), "00:00:00,000");
        assert_eq!(format_timestamp(59.9999), "00:00:59,999");
    }

    #[test]
    fn test_format_timestamp_padding() {
        assert_eq!(format_timestamp(1.5), "00:00:01,500");
        assert_eq!(format_timestamp(3600.0), "01:00:00,000");
    }

    #[test]
    fn test_render_srt_structure() {
        let segments = vec![
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
        ];

        let expected = "1\n00:00:00,000 --> 00:00:01,500\nhello\n\n\
                        2\n00:00:01,500 --> 00:00:03,000\nworld\n";
        assert_eq!(render_srt(&segments), expected);
    }

    #[test]
    fn test_render_srt_preserves_internal_whitespace() {
        let segments = vec![TranscriptSegment {
            start: 0.0,
            end: 2.0,
            text: "  two  words  ".to_string(),
        }];

        assert_eq!(render_srt(&segments), "1\n00:00:00,000 --> 00:00:02,000\ntwo  words\n");
    }

    #[test]
    fn test_render_srt_empty_input() {
        assert_eq!(render_srt(&[]), "");
    }

    #[test]
    fn test_render_srt_idempotent() {
        let segments = vec![TranscriptSegment {
            start: 12.34,
            end: 56.78,
            text: "again".to_string(),
        }];

        assert_eq!(render_srt(&segments), render_srt(&segments));
    }
}
