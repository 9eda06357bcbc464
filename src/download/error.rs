use std::fmt;

use crate::core::error::ErrorKind;
use crate::download::ytdlp_errors::{analyze_ytdlp_error, summarize_output, YtDlpErrorType};

/// Structured error type for extraction and download operations.
///
/// Classified variants carry the summarized yt-dlp output line that triggered them.
#[derive(Debug)]
pub enum DownloadError {
    /// Sign-in or fresh cookies required
    AuthRequired(String),
    /// Private or members-only content
    PrivateOrMembersOnly(String),
    /// Removed, region-blocked or unsupported
    Unavailable(String),
    /// No format matched, even after the broadened retry
    FormatUnavailable(String),
    /// Output exceeds the size ceiling (already deleted if it was produced)
    FileTooLarge { size_bytes: Option<u64>, limit_mb: u64 },
    /// Filesystem rejected the output name
    FilenameTooLong(String),
    /// yt-dlp could not be started
    Process(String),
    /// yt-dlp succeeded but no output file was found
    FileNotFound(String),
    /// Metadata JSON could not be parsed
    Metadata(String),
    /// Anything yt-dlp reported that does not match a known pattern
    Unknown(String),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::FileTooLarge {
                size_bytes: Some(size),
                limit_mb,
            } => write!(f, "file is {} bytes, over the {} MB limit", size, limit_mb),
            DownloadError::FileTooLarge {
                size_bytes: None,
                limit_mb,
            } => write!(f, "file is over the {} MB limit", limit_mb),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl std::error::Error for DownloadError {}

impl DownloadError {
    /// Builds a classified error from yt-dlp output (stderr, optionally with stdout appended).
    pub fn from_ytdlp_output(output: &str, limit_mb: u64) -> Self {
        let summary = summarize_output(output);
        match analyze_ytdlp_error(output) {
            YtDlpErrorType::AuthRequired => DownloadError::AuthRequired(summary),
            YtDlpErrorType::PrivateOrMembersOnly => DownloadError::PrivateOrMembersOnly(summary),
            YtDlpErrorType::Unavailable => DownloadError::Unavailable(summary),
            YtDlpErrorType::FormatUnavailable => DownloadError::FormatUnavailable(summary),
            YtDlpErrorType::FileTooLarge => DownloadError::FileTooLarge {
                size_bytes: None,
                limit_mb,
            },
            YtDlpErrorType::FilenameTooLong => DownloadError::FilenameTooLong(summary),
            YtDlpErrorType::Unknown => DownloadError::Unknown(summary),
        }
    }

    /// Returns subcategory for logs
    pub fn subcategory(&self) -> &'static str {
        match self {
            DownloadError::AuthRequired(_) => "auth_required",
            DownloadError::PrivateOrMembersOnly(_) => "private",
            DownloadError::Unavailable(_) => "unavailable",
            DownloadError::FormatUnavailable(_) => "format_unavailable",
            DownloadError::FileTooLarge { .. } => "file_too_large",
            DownloadError::FilenameTooLong(_) => "filename_too_long",
            DownloadError::Process(_) => "process",
            DownloadError::FileNotFound(_) => "file_not_found",
            DownloadError::Metadata(_) => "metadata",
            DownloadError::Unknown(_) => "unknown",
        }
    }

    /// Returns the inner message
    pub fn message(&self) -> &str {
        match self {
            DownloadError::AuthRequired(msg)
            | DownloadError::PrivateOrMembersOnly(msg)
            | DownloadError::Unavailable(msg)
            | DownloadError::FormatUnavailable(msg)
            | DownloadError::FilenameTooLong(msg)
            | DownloadError::Process(msg)
            | DownloadError::FileNotFound(msg)
            | DownloadError::Metadata(msg)
            | DownloadError::Unknown(msg) => msg,
            DownloadError::FileTooLarge { .. } => "file too large",
        }
    }

    /// User-facing category
    pub fn kind(&self) -> ErrorKind {
        match self {
            DownloadError::AuthRequired(_) => ErrorKind::AuthRequired,
            DownloadError::PrivateOrMembersOnly(_) => ErrorKind::PrivateContent,
            DownloadError::Unavailable(_) => ErrorKind::Unavailable,
            DownloadError::FormatUnavailable(_) => ErrorKind::FormatUnavailable,
            DownloadError::FileTooLarge { .. } => ErrorKind::FileTooLarge,
            DownloadError::FilenameTooLong(_) => ErrorKind::FilenameTooLong,
            DownloadError::Process(_)
            | DownloadError::FileNotFound(_)
            | DownloadError::Metadata(_)
            | DownloadError::Unknown(_) => ErrorKind::Generic,
        }
    }

    /// Whether one retry with a broadened selector is worth trying
    pub fn is_format_unavailable(&self) -> bool {
        matches!(self, DownloadError::FormatUnavailable(_))
    }
}
