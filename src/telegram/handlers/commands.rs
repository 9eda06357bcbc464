//! Command handler implementations (/start, /help)

use fluent_templates::fluent_bundle::FluentArgs;
use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{message_lang, HandlerDeps, HandlerError};
use crate::i18n;

/// Handle /start command
pub async fn handle_start_command(bot: &Bot, msg: &Message) -> Result<(), HandlerError> {
    let lang = message_lang(msg);
    log::info!("/start from chat {} (language {})", msg.chat.id, lang);
    bot.send_message(msg.chat.id, i18n::t(&lang, "start-welcome")).await?;
    Ok(())
}

/// Handle /help command
pub async fn handle_help_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let lang = message_lang(msg);
    let mut args = FluentArgs::new();
    args.set("limit", deps.max_file_size_mb());
    bot.send_message(msg.chat.id, i18n::t_args(&lang, "help-text", &args))
        .await?;
    Ok(())
}
