//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::commands::{handle_help_command, handle_start_command};
use super::types::{HandlerDeps, HandlerError};
use crate::telegram::bot::Command;
use crate::telegram::callback::CallbackAction;
use crate::telegram::downloads::{answer, handle_download_callback};
use crate::telegram::movies::{handle_details_command, handle_movie_callback, handle_movie_command};
use crate::telegram::preview::handle_text_message;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// The same schema is used in production and can be used in integration tests.
///
/// # Arguments
/// * `deps` - Handler dependencies (yt-dlp adapter, stores, catalog)
///
/// # Returns
/// The complete handler tree for the bot
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_messages = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        .branch(command_handler(deps_commands))
        .branch(message_handler(deps_messages))
        .branch(callback_handler(deps_callback))
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);

                let result = match cmd {
                    Command::Start => handle_start_command(&bot, &msg).await,
                    Command::Help => handle_help_command(&bot, &msg, &deps).await,
                    Command::Movie(query) => handle_movie_command(&bot, &msg, &deps, &query).await,
                    Command::Details(arg) => handle_details_command(&bot, &msg, &deps, &arg).await,
                };
                if let Err(e) = result {
                    log::error!("Command handler failed in chat {}: {}", msg.chat.id, e);
                }
                Ok(())
            }
        },
    ))
}

/// Handler for free text (links and everything else)
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_text_message(&bot, &msg, &deps).await {
                    log::error!("Message handler failed in chat {}: {}", msg.chat.id, e);
                }
                Ok(())
            }
        })
}

fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            if let Err(e) = handle_callback(&bot, &q, &deps).await {
                log::error!("Callback handler failed for {:?}: {}", q.data, e);
            }
            Ok(())
        }
    })
}

/// Routes a callback query by its payload. Unknown payloads are acknowledged and ignored.
pub async fn handle_callback(bot: &Bot, q: &CallbackQuery, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let data = q.data.as_deref().unwrap_or_default();

    match CallbackAction::parse(data) {
        CallbackAction::Download { quality, token } => handle_download_callback(bot, q, deps, quality, &token).await,
        CallbackAction::MovieDetails(index) => handle_movie_callback(bot, q, deps, index).await,
        CallbackAction::Unknown => {
            log::debug!("Ignoring unknown callback payload {:?}", data);
            answer(bot, q, None).await;
            Ok(())
        }
    }
}
