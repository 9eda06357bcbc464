//! Logging initialization and configuration checking
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - Cookies configuration logging at startup

use anyhow::Result;
use simplelog::{ColorChoice, CombinedLogger, LevelFilter, TermLogger, TerminalMode, WriteLogger};
use std::fs::File;

use crate::core::config::{CookiesSource, YtDlpConfig};

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            simplelog::Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Debug, simplelog::Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs which cookie source yt-dlp will use, with troubleshooting hints when none is set.
pub fn log_cookies_configuration(config: &YtDlpConfig) {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("🍪 Cookies Configuration Check");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    match &config.cookies {
        CookiesSource::Inline(_) => {
            log::info!("✅ YTDL_COOKIES_B64: set");
            log::info!(
                "   Will be written to {}",
                config.download_dir.join(crate::download::cookies::INLINE_COOKIES_FILE).display()
            );
        }
        CookiesSource::File(path) => {
            if path.exists() {
                log::info!("✅ YTDL_COOKIES_FILE: {}", path.display());
            } else {
                log::error!("❌ YTDL_COOKIES_FILE: {} (FILE NOT FOUND!)", path.display());
                log::error!("   Current directory: {:?}", std::env::current_dir());
                log::error!("   Age-restricted and members-only videos will fail");
            }
        }
        CookiesSource::Browser(browser) => {
            log::info!("✅ YTDL_COOKIES_BROWSER: {}", browser);
            log::info!("   Will extract cookies from browser");
        }
        CookiesSource::None => {
            log::warn!("⚠️  No cookies configured");
            log::warn!("   Videos that require sign-in will be reported as auth-required.");
            log::warn!("   Set YTDL_COOKIES_FILE, YTDL_COOKIES_B64 or YTDL_COOKIES_BROWSER to fix.");
        }
    }

    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}
