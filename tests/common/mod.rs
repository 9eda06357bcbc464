//! Common test utilities
//!
//! This module is shared across all integration tests: a scripted fake
//! yt-dlp binary and a wiremock stand-in for the Telegram Bot API.

#![allow(dead_code)]

pub mod fake_ytdlp;
pub mod telegram_mock;

pub use fake_ytdlp::FakeYtDlp;
pub use telegram_mock::TelegramMock;
