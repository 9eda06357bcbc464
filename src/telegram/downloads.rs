//! Quality-button presses: download with yt-dlp and deliver the file

use std::path::Path;

use fluent_templates::fluent_bundle::FluentArgs;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId};
use unic_langid::LanguageIdentifier;

use crate::core::error::AppError;
use crate::download::{resolve_quality, DownloadRequest, DownloadedFile, Quality, ResolvedQuality};
use crate::i18n;
use crate::telegram::handlers::{delete_status, report_error, update_status, HandlerDeps, HandlerError};

/// Note telling the user which tier replaced the requested one.
pub fn adjusted_quality_note(lang: &LanguageIdentifier, requested: Quality, resolved: &ResolvedQuality) -> String {
    let mut args = FluentArgs::new();
    args.set("requested", requested.to_string());
    args.set("used", resolved.label());
    i18n::t_args(lang, "quality-adjusted", &args)
}

/// Handles a `dl:<quality>:<token>` press.
pub async fn handle_download_callback(
    bot: &Bot,
    q: &CallbackQuery,
    deps: &HandlerDeps,
    quality: Quality,
    token: &str,
) -> Result<(), HandlerError> {
    let lang = i18n::user_lang(q.from.language_code.as_deref());

    let Some(chat_id) = q.message.as_ref().map(|m| m.chat().id) else {
        answer(bot, q, None).await;
        return Ok(());
    };

    let Some(url) = deps.links.get(token).await else {
        log::info!("Link token {} expired or unknown (chat {})", token, chat_id);
        answer(bot, q, Some(i18n::t(&lang, "link-expired"))).await;
        return Ok(());
    };

    answer(bot, q, Some(i18n::t(&lang, "download-started"))).await;
    log::info!("Download {} at {} for chat {}", url, quality, chat_id);

    let status = bot.send_message(chat_id, i18n::t(&lang, "download-checking")).await?;
    download_and_send(bot, chat_id, status.id, &lang, deps, &url, quality).await
}

async fn download_and_send(
    bot: &Bot,
    chat_id: ChatId,
    status: MessageId,
    lang: &LanguageIdentifier,
    deps: &HandlerDeps,
    url: &str,
    quality: Quality,
) -> Result<(), HandlerError> {
    // Metadata is fetched again: the token only remembers the URL
    let info = match deps.ytdlp.fetch_metadata(url).await {
        Ok(info) => info,
        Err(e) => {
            report_error(bot, chat_id, Some(status), lang, deps, &AppError::from(e)).await?;
            return Ok(());
        }
    };

    let resolved = resolve_quality(quality, &info.available_heights);
    if resolved.is_adjusted() {
        bot.send_message(chat_id, adjusted_quality_note(lang, quality, &resolved))
            .await?;
    }

    let mut args = FluentArgs::new();
    args.set("title", info.title.clone());
    args.set("quality", resolved.label());
    update_status(bot, chat_id, status, i18n::t_args(lang, "download-progress", &args)).await;

    let request = DownloadRequest {
        url,
        quality,
        title: &info.title,
        content_id: &info.id,
        available_heights: &info.available_heights,
    };
    let file = match deps.ytdlp.download(&request).await {
        Ok(file) => file,
        Err(e) => {
            report_error(bot, chat_id, Some(status), lang, deps, &AppError::from(e)).await?;
            return Ok(());
        }
    };

    let sent = send_file(bot, chat_id, lang, &file, &info.title).await;
    remove_downloaded_file(&file.path).await;

    match sent {
        Ok(()) => {
            log::info!("Delivered {} ({} bytes) to chat {}", url, file.size_bytes, chat_id);
            delete_status(bot, chat_id, status).await;
        }
        Err(e) => {
            report_error(bot, chat_id, Some(status), lang, deps, &AppError::from(e)).await?;
        }
    }
    Ok(())
}

async fn send_file(
    bot: &Bot,
    chat_id: ChatId,
    lang: &LanguageIdentifier,
    file: &DownloadedFile,
    title: &str,
) -> Result<(), teloxide::RequestError> {
    let input = InputFile::file(file.path.clone());

    if matches!(file.resolved, ResolvedQuality::Audio) {
        bot.send_audio(chat_id, input).title(title.to_string()).await?;
    } else {
        let mut args = FluentArgs::new();
        args.set("title", title.to_string());
        bot.send_video(chat_id, input)
            .caption(i18n::t_args(lang, "download-done", &args))
            .supports_streaming(true)
            .await?;
    }
    Ok(())
}

/// Deletes a delivered file if it is still there.
pub async fn remove_downloaded_file(path: &Path) {
    match tokio::fs::try_exists(path).await {
        Ok(true) => {
            if let Err(e) = tokio::fs::remove_file(path).await {
                log::warn!("Failed to delete {}: {}", path.display(), e);
            } else {
                log::debug!("Deleted {}", path.display());
            }
        }
        Ok(false) => {}
        Err(e) => log::warn!("Cannot check {}: {}", path.display(), e),
    }
}

/// Acknowledges a callback; failures are logged and swallowed.
pub async fn answer(bot: &Bot, q: &CallbackQuery, text: Option<String>) {
    let request = bot.answer_callback_query(q.id.clone());
    let result = match text {
        Some(text) => request.text(text).await,
        None => request.await,
    };
    if let Err(e) = result {
        log::warn!("Failed to answer callback query {:?}: {}", q.id, e);
    }
}
