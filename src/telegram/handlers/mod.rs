//! Telegram bot handler tree configuration
//!
//! This module provides the main dispatcher schema for the Telegram bot.
//! The handlers are organized in a testable way, allowing integration tests
//! to call the same handler functions as production code.

mod commands;
mod schema;
mod types;

pub use commands::{handle_help_command, handle_start_command};
pub use schema::{handle_callback, schema};
pub use types::{delete_status, message_lang, report_error, update_status, HandlerDeps, HandlerError};
