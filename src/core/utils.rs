use crate::core::config::download::{FILENAME_SUFFIX_RESERVE_BYTES, MAX_FILENAME_BYTES, PLACEHOLDER_TITLE};

/// Cleans a video title for use inside a filename.
///
/// Characters that are illegal on common filesystems (`/ \ : * ? " < > |`) and
/// control characters are removed, whitespace runs collapse to one space,
/// leading/trailing spaces and dots are trimmed, and the result is capped at
/// `max_chars` characters. An empty result becomes the placeholder title.
///
/// # Example
///
/// ```
/// use mediabot::core::utils::sanitize_title;
///
/// assert_eq!(sanitize_title("AC/DC: Live *at* Donington?", 80), "ACDC Live at Donington");
/// assert_eq!(sanitize_title("???", 80), "video");
/// ```
pub fn sanitize_title(title: &str, max_chars: usize) -> String {
    let mut cleaned = String::with_capacity(title.len());
    let mut last_was_space = false;

    for c in title.chars() {
        match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => {}
            c if c.is_control() || c.is_whitespace() => {
                if !last_was_space {
                    cleaned.push(' ');
                    last_was_space = true;
                }
            }
            c => {
                cleaned.push(c);
                last_was_space = false;
            }
        }
    }

    let trimmed = trim_edges(&cleaned);
    let capped: String = trimmed.chars().take(max_chars).collect();
    let capped = trim_edges(&capped);

    if capped.is_empty() {
        PLACEHOLDER_TITLE.to_string()
    } else {
        capped.to_string()
    }
}

// Spaces and dots at either end are problematic on Windows.
fn trim_edges(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == '.')
}

/// Builds the output file stem `<sanitized-title>_<content-id>_<timestamp>`.
///
/// The content id is stripped of anything but ASCII alphanumerics, `-` and `_`
/// so that ids from any extractor stay filesystem-safe. Filesystems limit names
/// in bytes, so the title is additionally cut on a char boundary until the stem
/// plus any yt-dlp suffix fits in [`MAX_FILENAME_BYTES`].
pub fn output_stem(title: &str, content_id: &str, timestamp_ms: i64, max_title_chars: usize) -> String {
    let safe_id: String = content_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(64)
        .collect();
    let tail = if safe_id.is_empty() {
        format!("_{}", timestamp_ms)
    } else {
        format!("_{}_{}", safe_id, timestamp_ms)
    };

    let title_budget = MAX_FILENAME_BYTES
        .saturating_sub(FILENAME_SUFFIX_RESERVE_BYTES)
        .saturating_sub(tail.len());
    let safe_title = sanitize_title(title, max_title_chars);
    let safe_title = match trim_edges(truncate_bytes(&safe_title, title_budget)) {
        "" => PLACEHOLDER_TITLE,
        t => t,
    };

    format!("{}{}", safe_title, tail)
}

// Longest prefix of `s` that fits in `max_bytes` without splitting a char.
fn truncate_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Formats a duration in seconds as `m:ss` or `h:mm:ss`.
///
/// # Example
///
/// ```
/// use mediabot::core::utils::format_duration;
///
/// assert_eq!(format_duration(65), "1:05");
/// assert_eq!(format_duration(3725), "1:02:05");
/// ```
pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Truncates text to at most `max_chars` characters, appending an ellipsis when cut.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sanitize_title_strips_illegal_characters() {
        assert_eq!(sanitize_title("a/b\\c:d*e?f\"g<h>i|j", 80), "abcdefghij");
        assert_eq!(sanitize_title("line\nbreak\ttab", 80), "line break tab");
        assert_eq!(sanitize_title("  many    spaces  ", 80), "many spaces");
    }

    #[test]
    fn test_sanitize_title_keeps_non_latin_scripts() {
        assert_eq!(sanitize_title("မြန်မာ သီချင်း", 80), "မြန်မာ သီချင်း");
        assert_eq!(sanitize_title("Привет, мир!", 80), "Привет, мир!");
    }

    #[test]
    fn test_sanitize_title_caps_length() {
        let long = "x".repeat(500);
        assert_eq!(sanitize_title(&long, 80).chars().count(), 80);

        let cyrillic = "я".repeat(200);
        assert_eq!(sanitize_title(&cyrillic, 10), "я".repeat(10));
    }

    #[test]
    fn test_sanitize_title_trims_after_cap() {
        assert_eq!(sanitize_title("abc   def", 4), "abc");
        assert_eq!(sanitize_title("...hidden...", 80), "hidden");
    }

    #[test]
    fn test_sanitize_title_placeholder() {
        assert_eq!(sanitize_title("", 80), "video");
        assert_eq!(sanitize_title("   ", 80), "video");
        assert_eq!(sanitize_title("/:*?", 80), "video");
        assert_eq!(sanitize_title("...", 80), "video");
    }

    #[test]
    fn test_output_stem() {
        assert_eq!(output_stem("My Video", "abc123", 1700000000000, 80), "My Video_abc123_1700000000000");
        assert_eq!(output_stem("", "id/../x", 1, 80), "video_idx_1");
        assert_eq!(output_stem("T", "", 5, 80), "T_5");
    }

    #[test]
    fn test_output_stem_fits_filesystem_byte_limit() {
        // 80 Burmese chars are 240 bytes
        let burmese = "မြန်မာ".repeat(40);
        let stem = output_stem(&burmese, "dQw4w9WgXcQ", 1_760_000_000_000, 80);
        assert!(stem.len() + ".webm".len() <= MAX_FILENAME_BYTES);
        assert!(stem.len() + FILENAME_SUFFIX_RESERVE_BYTES <= MAX_FILENAME_BYTES);
        assert!(stem.ends_with("_dQw4w9WgXcQ_1760000000000"));
        assert!(stem.starts_with("မြန်"));

        let emoji = "🎵".repeat(80);
        let stem = output_stem(&emoji, "abc123", 1_760_000_000_000, 80);
        assert!(stem.len() + FILENAME_SUFFIX_RESERVE_BYTES <= MAX_FILENAME_BYTES);
        assert!(stem.starts_with("🎵"));

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(format!("{}.f399.webm.part", stem)), b"x").unwrap();
    }

    #[test]
    fn test_truncate_bytes_respects_char_boundaries() {
        assert_eq!(truncate_bytes("abc", 10), "abc");
        assert_eq!(truncate_bytes("яяя", 5), "яя");
        assert_eq!(truncate_bytes("🎵🎵", 3), "");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(600), "10:00");
        assert_eq!(format_duration(3600), "1:00:00");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdefghij", 5), "abcd…");
    }
}
