//! Media extraction: the yt-dlp adapter and the TikTok photo-post scraper

pub mod cookies;
pub mod error;
pub mod photo_post;
pub mod quality;
pub mod ytdlp;
pub mod ytdlp_errors;

// Re-exports for convenience
pub use error::DownloadError;
pub use photo_post::{PhotoPost, PhotoPostClient, PhotoPostError};
pub use quality::{resolve_quality, Quality, ResolvedQuality};
pub use ytdlp::{DownloadRequest, DownloadedFile, VideoInfo, YtDlp};
