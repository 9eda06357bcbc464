//! Handler types, dependencies, and reply helpers

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{Message, MessageId};
use unic_langid::LanguageIdentifier;

use crate::catalog::MovieCatalog;
use crate::core::error::AppError;
use crate::download::{PhotoPostClient, YtDlp};
use crate::i18n;
use crate::storage::{LinkStore, SearchStore};

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub ytdlp: Arc<YtDlp>,
    pub photo_client: Arc<PhotoPostClient>,
    pub links: Arc<dyn LinkStore>,
    pub searches: Arc<dyn SearchStore>,
    pub catalog: Arc<dyn MovieCatalog>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(
        ytdlp: Arc<YtDlp>,
        photo_client: Arc<PhotoPostClient>,
        links: Arc<dyn LinkStore>,
        searches: Arc<dyn SearchStore>,
        catalog: Arc<dyn MovieCatalog>,
    ) -> Self {
        Self {
            ytdlp,
            photo_client,
            links,
            searches,
            catalog,
        }
    }

    /// Size ceiling quoted in user-facing messages
    pub fn max_file_size_mb(&self) -> u64 {
        self.ytdlp.config().max_file_size_mb
    }
}

/// Reply language for the sender of a message.
pub fn message_lang(msg: &Message) -> LanguageIdentifier {
    i18n::user_lang(msg.from.as_ref().and_then(|u| u.language_code.as_deref()))
}

/// Logs a handler failure and tells the user in their language.
///
/// When a status message exists it is edited in place; otherwise, or if the
/// edit fails, a new message is sent.
pub async fn report_error(
    bot: &Bot,
    chat_id: ChatId,
    status: Option<MessageId>,
    lang: &LanguageIdentifier,
    deps: &HandlerDeps,
    err: &AppError,
) -> Result<(), teloxide::RequestError> {
    let kind = err.kind();
    log::error!("Request in chat {} failed ({:?}): {}", chat_id, kind, err);
    let text = i18n::error_message(lang, kind, deps.max_file_size_mb());

    if let Some(message_id) = status {
        match bot.edit_message_text(chat_id, message_id, text.clone()).await {
            Ok(_) => return Ok(()),
            Err(e) => log::warn!("Failed to edit status message {} in chat {}: {}", message_id.0, chat_id, e),
        }
    }
    bot.send_message(chat_id, text).await?;
    Ok(())
}

/// Edits a status message, logging instead of failing.
pub async fn update_status(bot: &Bot, chat_id: ChatId, message_id: MessageId, text: String) {
    if let Err(e) = bot.edit_message_text(chat_id, message_id, text).await {
        log::warn!("Failed to update status message in chat {}: {}", chat_id, e);
    }
}

/// Deletes a status message, logging instead of failing.
pub async fn delete_status(bot: &Bot, chat_id: ChatId, message_id: MessageId) {
    if let Err(e) = bot.delete_message(chat_id, message_id).await {
        log::warn!("Failed to delete status message in chat {}: {}", chat_id, e);
    }
}
