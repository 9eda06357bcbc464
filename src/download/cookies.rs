//! Cookie configuration for yt-dlp
//!
//! Turns the configured [`CookiesSource`] into command-line arguments. Inline
//! base64 cookies are decoded once at startup into a file inside the download
//! directory.

use base64::{engine::general_purpose, Engine as _};
use std::path::{Path, PathBuf};

use crate::core::config::CookiesSource;
use crate::core::error::{AppError, AppResult};

/// File name used for decoded inline cookies
pub const INLINE_COOKIES_FILE: &str = ".cookies.txt";

/// Resolved cookie arguments passed to every yt-dlp invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieArgs {
    args: Vec<String>,
}

impl CookieArgs {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn as_args(&self) -> &[String] {
        &self.args
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

/// Prepares cookie arguments, writing inline cookies to disk when needed.
///
/// A cookies file that is missing or not in Netscape format is logged and
/// skipped rather than failing startup. Invalid base64 is a startup error.
pub fn prepare_cookies(source: &CookiesSource, download_dir: &Path) -> AppResult<CookieArgs> {
    match source {
        CookiesSource::None => Ok(CookieArgs::none()),
        CookiesSource::Browser(browser) => Ok(CookieArgs {
            args: vec!["--cookies-from-browser".to_string(), browser.clone()],
        }),
        CookiesSource::File(path) => {
            if !path.exists() {
                log::error!("Cookies file not found: {}", path.display());
                return Ok(CookieArgs::none());
            }
            if !validate_cookies_file_format(path) {
                log::warn!(
                    "Cookies file {} does not look like a Netscape cookie file, passing it anyway",
                    path.display()
                );
            }
            Ok(file_args(path))
        }
        CookiesSource::Inline(encoded) => {
            let target = write_inline_cookies(encoded, download_dir)?;
            if !validate_cookies_file_format(&target) {
                log::warn!("Decoded YTDL_COOKIES_B64 is not a Netscape cookie file");
            }
            log::info!("Inline cookies written to {}", target.display());
            Ok(file_args(&target))
        }
    }
}

fn file_args(path: &Path) -> CookieArgs {
    CookieArgs {
        args: vec!["--cookies".to_string(), path.to_string_lossy().to_string()],
    }
}

/// Decodes base64 cookies (whitespace ignored) into `<download_dir>/.cookies.txt`.
pub fn write_inline_cookies(encoded: &str, download_dir: &Path) -> AppResult<PathBuf> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let decoded = general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| AppError::Config(format!("YTDL_COOKIES_B64 is not valid base64: {}", e)))?;

    std::fs::create_dir_all(download_dir)?;
    let target = download_dir.join(INLINE_COOKIES_FILE);
    std::fs::write(&target, decoded)?;
    Ok(target)
}

/// Validates Netscape HTTP Cookie File format.
///
/// The Netscape format starts with "# Netscape HTTP Cookie File" or "# HTTP Cookie File"
/// and contains lines in the format: domain\tflag\tpath\tsecure\texpiration\tname\tvalue
pub fn validate_cookies_file_format(cookies_file: &Path) -> bool {
    if let Ok(contents) = std::fs::read_to_string(cookies_file) {
        let has_header = contents.lines().any(|line| {
            line.trim().starts_with("# Netscape HTTP Cookie File") || line.trim().starts_with("# HTTP Cookie File")
        });

        let has_cookies = contents.lines().any(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#') && trimmed.split('\t').count() >= 7
        });

        has_header && has_cookies
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const NETSCAPE: &str =
        "# Netscape HTTP Cookie File\n.youtube.com\tTRUE\t/\tTRUE\t0\tPREF\tf1=50000000\n";

    #[test]
    fn test_inline_cookies_are_decoded() {
        let dir = tempdir().unwrap();
        let encoded = general_purpose::STANDARD.encode(NETSCAPE);
        // Line-wrapped base64 is accepted
        let wrapped = format!("{}\n{}", &encoded[..10], &encoded[10..]);

        let args = prepare_cookies(&CookiesSource::Inline(wrapped), dir.path()).unwrap();
        let target = dir.path().join(INLINE_COOKIES_FILE);
        assert_eq!(
            args.as_args(),
            &["--cookies".to_string(), target.to_string_lossy().to_string()]
        );
        assert_eq!(std::fs::read_to_string(&target).unwrap(), NETSCAPE);
        assert!(validate_cookies_file_format(&target));
    }

    #[test]
    fn test_invalid_base64_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(prepare_cookies(&CookiesSource::Inline("%%%not base64%%%".into()), dir.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let dir = tempdir().unwrap();
        let args = prepare_cookies(&CookiesSource::File(dir.path().join("nope.txt")), dir.path()).unwrap();
        assert!(args.is_empty());
    }

    #[test]
    fn test_browser_args() {
        let args = prepare_cookies(&CookiesSource::Browser("firefox".into()), Path::new("/tmp")).unwrap();
        assert_eq!(args.as_args(), &["--cookies-from-browser".to_string(), "firefox".to_string()]);
    }

    #[test]
    fn test_validate_rejects_plain_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.txt");
        std::fs::write(&path, "hello").unwrap();
        assert!(!validate_cookies_file_format(&path));
    }
}
