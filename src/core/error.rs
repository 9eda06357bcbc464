use thiserror::Error;

use crate::catalog::CatalogError;
use crate::download::error::DownloadError;
use crate::download::photo_post::PhotoPostError;

/// Centralized error types for the application
///
/// Layer-specific errors (extraction, photo posts, catalog) are folded into this
/// enum with `#[from]` conversions. [`AppError::kind`] maps any of them onto the
/// closed set of failures a chat user can be told about.
///
/// # Example
///
/// ```no_run
/// use mediabot::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {} ({:?})", err, err.kind());
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// yt-dlp extraction and download errors
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    /// Photo-post scraping errors
    #[error("Photo post error: {0}")]
    PhotoPost(#[from] PhotoPostError),

    /// Movie catalog errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// HTTP/Fetch errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Failure categories shown to chat users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AuthRequired,
    PrivateContent,
    Unavailable,
    FormatUnavailable,
    FileTooLarge,
    FilenameTooLong,
    PhotoParseFailed,
    PhotoImagesNotFound,
    ApiKeyMissing,
    Generic,
}

impl ErrorKind {
    /// Localization key of the user-facing message
    pub fn i18n_key(&self) -> &'static str {
        match self {
            ErrorKind::AuthRequired => "error-auth-required",
            ErrorKind::PrivateContent => "error-private",
            ErrorKind::Unavailable => "error-unavailable",
            ErrorKind::FormatUnavailable => "error-format-unavailable",
            ErrorKind::FileTooLarge => "error-file-too-large",
            ErrorKind::FilenameTooLong => "error-filename-too-long",
            ErrorKind::PhotoParseFailed => "error-photo-parse-failed",
            ErrorKind::PhotoImagesNotFound => "error-photo-no-images",
            ErrorKind::ApiKeyMissing => "error-api-key-missing",
            ErrorKind::Generic => "error-generic",
        }
    }
}

impl AppError {
    /// User-facing category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Download(e) => e.kind(),
            AppError::PhotoPost(e) => e.kind(),
            AppError::Catalog(e) => e.kind(),
            _ => ErrorKind::Generic,
        }
    }
}
