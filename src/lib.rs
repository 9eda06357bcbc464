//! mediabot - Telegram bot for YouTube/TikTok downloads and movie search
//!
//! Links are downloaded by the external `yt-dlp` binary, TikTok photo posts
//! are scraped from the page, and `/movie` queries go to TMDB.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging and string helpers
//! - `storage`: Short-lived in-memory stores (link tokens, search results)
//! - `download`: yt-dlp adapter, quality policy and photo-post scraper
//! - `catalog`: Movie catalog client with response cache
//! - `telegram`: Bot setup, dispatcher schema and handlers
//! - `i18n`: Localized user-facing text

pub mod catalog;
pub mod cli;
pub mod core;
pub mod download;
pub mod i18n;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, Config};
pub use telegram::{schema, HandlerDeps};
