use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::error::{AppError, AppResult};

/// Runtime configuration, built once at startup and passed to every component.
///
/// Values come from environment variables (a `.env` file is loaded by `main`
/// before [`Config::from_env`] runs). Everything except the bot token has a
/// default so the CLI subcommands work without a Telegram setup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token (`BOT_TOKEN`, falls back to `TELOXIDE_TOKEN`)
    pub bot_token: Option<String>,
    /// Self-hosted Bot API gateway (`BOT_API_URL` or `TELEGRAM_API_URL`)
    pub bot_api_url: Option<String>,
    /// Log file path (`LOG_FILE_PATH`, default `app.log`)
    pub log_file_path: String,
    pub ytdlp: YtDlpConfig,
    pub tmdb: TmdbConfig,
}

/// Settings for the yt-dlp subprocess and the files it produces.
#[derive(Debug, Clone)]
pub struct YtDlpConfig {
    pub bin: String,
    pub plugin_dir: String,
    pub js_runtime: String,
    pub download_dir: PathBuf,
    pub max_file_size_mb: u64,
    pub max_title_chars: usize,
    pub cookies: CookiesSource,
}

/// Where yt-dlp should take authentication cookies from.
///
/// Priority when several variables are set: inline base64 > file > browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookiesSource {
    None,
    /// Base64-encoded Netscape cookie file, materialized into the download dir at startup
    Inline(String),
    File(PathBuf),
    Browser(String),
}

/// TMDB catalog settings.
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub api_key: Option<String>,
    pub language: String,
    pub region: Option<String>,
    pub base_url: String,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let first = |keys: &[&str]| keys.iter().find_map(|k| get(*k));

        let max_file_size_mb = match get("MAX_FILE_SIZE_MB") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|v| *v > 0)
                .ok_or_else(|| AppError::Config(format!("MAX_FILE_SIZE_MB must be a positive integer, got {raw:?}")))?,
            None => download::DEFAULT_MAX_FILE_SIZE_MB,
        };

        let max_title_chars = match get("MAX_TITLE_CHARS") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|v| *v > 0)
                .ok_or_else(|| AppError::Config(format!("MAX_TITLE_CHARS must be a positive integer, got {raw:?}")))?,
            None => download::DEFAULT_MAX_TITLE_CHARS,
        };

        let download_dir = get("DOWNLOAD_FOLDER").unwrap_or_else(|| "./downloads".to_string());
        let download_dir = PathBuf::from(shellexpand::tilde(&download_dir).to_string());

        let cookies = if let Some(b64) = get("YTDL_COOKIES_B64") {
            CookiesSource::Inline(b64)
        } else if let Some(file) = get("YTDL_COOKIES_FILE") {
            CookiesSource::File(PathBuf::from(shellexpand::tilde(&file).to_string()))
        } else if let Some(browser) = get("YTDL_COOKIES_BROWSER") {
            CookiesSource::Browser(browser)
        } else {
            CookiesSource::None
        };

        let bot_api_url = first(&["BOT_API_URL", "TELEGRAM_API_URL"]);
        if let Some(ref raw) = bot_api_url {
            url::Url::parse(raw).map_err(|e| AppError::Config(format!("Invalid BOT_API_URL {raw:?}: {e}")))?;
        }

        Ok(Self {
            bot_token: first(&["BOT_TOKEN", "TELOXIDE_TOKEN"]),
            bot_api_url,
            log_file_path: get("LOG_FILE_PATH").unwrap_or_else(|| "app.log".to_string()),
            ytdlp: YtDlpConfig {
                bin: get("YTDL_BIN").unwrap_or_else(|| "yt-dlp".to_string()),
                plugin_dir: get("YTDL_PLUGIN_DIR").unwrap_or_else(|| "./custom_plugins".to_string()),
                js_runtime: get("YTDL_JS_RUNTIME").unwrap_or_else(|| "node".to_string()),
                download_dir,
                max_file_size_mb,
                max_title_chars,
                cookies,
            },
            tmdb: TmdbConfig {
                api_key: get("TMDB_API_KEY"),
                language: get("TMDB_LANGUAGE").unwrap_or_else(|| "en-US".to_string()),
                region: get("TMDB_REGION"),
                base_url: get("TMDB_BASE_URL").unwrap_or_else(|| tmdb::DEFAULT_BASE_URL.to_string()),
            },
        })
    }

    /// Returns the bot token or a configuration error when it is missing.
    pub fn require_bot_token(&self) -> AppResult<&str> {
        self.bot_token
            .as_deref()
            .ok_or_else(|| AppError::Config("BOT_TOKEN environment variable not set".to_string()))
    }
}

impl YtDlpConfig {
    /// Size ceiling in bytes.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}

/// Download limits
pub mod download {
    /// Telegram Bot API upload ceiling for regular bots
    pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 50;

    /// Title characters kept in output filenames
    pub const DEFAULT_MAX_TITLE_CHARS: usize = 80;

    /// Placeholder used when a title sanitizes to nothing
    pub const PLACEHOLDER_TITLE: &str = "video";

    /// Filename length limit of ext4/APFS, in bytes
    pub const MAX_FILENAME_BYTES: usize = 255;

    /// Bytes kept free after the stem for yt-dlp suffixes such as `.f399.webm.part`
    pub const FILENAME_SUFFIX_RESERVE_BYTES: usize = 24;

    /// Photo-post images surfaced per message (Telegram media group limit)
    pub const MAX_PHOTO_IMAGES: usize = 10;
}

/// Ephemeral store settings
pub mod stores {
    use super::Duration;

    /// Lifetime of link tokens and search results (10 minutes)
    pub const TTL_SECS: u64 = 600;

    pub fn ttl() -> Duration {
        Duration::from_secs(TTL_SECS)
    }
}

/// Movie catalog settings
pub mod tmdb {
    use super::Duration;

    pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

    pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w342";

    /// Results kept per search
    pub const MAX_RESULTS: usize = 5;

    /// HTTP timeout in milliseconds
    pub const TIMEOUT_MS: u64 = 8000;

    pub fn timeout() -> Duration {
        Duration::from_millis(TIMEOUT_MS)
    }
}

/// Network settings for the Telegram client and page fetches
pub mod network {
    use super::Duration;

    /// Request timeout in seconds. Uploads of large videos go through this client too.
    pub const REQUEST_TIMEOUT_SECS: u64 = 300;

    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }

    /// Timeout for photo-post page fetches
    pub const PAGE_TIMEOUT_SECS: u64 = 15;

    pub fn page_timeout() -> Duration {
        Duration::from_secs(PAGE_TIMEOUT_SECS)
    }

    /// Browser-like user agent for page scraping
    pub const USER_AGENT: &str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
}

/// Dispatcher restart policy
pub mod retry {
    use super::Duration;

    /// Maximum number of retries for dispatcher reconnection
    pub const MAX_DISPATCHER_RETRIES: u32 = 5;

    /// Delay between dispatcher retry attempts (in seconds)
    pub const DISPATCHER_RETRY_DELAY_SECS: u64 = 5;

    pub fn dispatcher_delay() -> Duration {
        Duration::from_secs(DISPATCHER_RETRY_DELAY_SECS)
    }

    /// Base for exponential backoff calculation
    pub const EXPONENTIAL_BACKOFF_BASE: u64 = 2;

    /// Attempts to reach the Bot API at startup (5 seconds apart)
    pub const STARTUP_MAX_RETRIES: u32 = 60;
}
