//! Telegram bot integration and handlers

pub mod bot;
pub mod callback;
pub mod downloads;
pub mod handlers;
pub mod keyboard;
pub mod movies;
pub mod photos;
pub mod preview;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use handlers::{schema, HandlerDeps, HandlerError};
