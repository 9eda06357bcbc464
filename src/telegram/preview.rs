//! Link recognition and the quality-picker preview
//!
//! A recognised link is inspected with yt-dlp, stored under a short token and
//! answered with the video title, duration and quality buttons. The thumbnail
//! is used as the preview photo when yt-dlp reports one.

use once_cell::sync::Lazy;
use regex::Regex;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, InputFile};
use unic_langid::LanguageIdentifier;

use crate::core::error::AppError;
use crate::core::utils::truncate_text;
use crate::download::photo_post::{is_photo_post_url, is_short_tiktok_link};
use crate::download::VideoInfo;
use crate::i18n;
use crate::telegram::handlers::{delete_status, message_lang, report_error, HandlerDeps, HandlerError};
use crate::telegram::keyboard::quality_keyboard;
use crate::telegram::photos::send_photo_post;

/// Title length shown in the preview caption (captions are capped at 1024 chars)
const PREVIEW_TITLE_CHARS: usize = 200;

static URL_REGEX: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"https?://[^\s<>]+").ok());

/// Sites handled by the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    YouTube,
    TikTok,
}

/// Classifies a URL by host.
pub fn classify_url(raw: &str) -> Option<LinkKind> {
    let url = url::Url::parse(raw).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    if host == "youtu.be" || host == "youtube.com" || host.ends_with(".youtube.com") {
        Some(LinkKind::YouTube)
    } else if host == "tiktok.com" || host.ends_with(".tiktok.com") {
        Some(LinkKind::TikTok)
    } else {
        None
    }
}

/// Returns the first supported link in a message.
pub fn find_link(text: &str) -> Option<(LinkKind, String)> {
    let regex = URL_REGEX.as_ref()?;
    regex.find_iter(text).find_map(|m| {
        let candidate = m.as_str().trim_end_matches(['.', ',', ')', '!', '?']);
        classify_url(candidate).map(|kind| (kind, candidate.to_string()))
    })
}

/// Handles a plain text message: a supported link gets a preview, anything else a hint.
pub async fn handle_text_message(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let lang = message_lang(msg);
    let chat_id = msg.chat.id;

    let Some((kind, url)) = find_link(text) else {
        bot.send_message(chat_id, i18n::t(&lang, "not-a-link")).await?;
        return Ok(());
    };
    log::info!("Link from chat {}: {} ({:?})", chat_id, url, kind);

    match kind {
        LinkKind::YouTube => send_preview(bot, chat_id, &lang, deps, &url).await,
        LinkKind::TikTok => {
            let url = if is_short_tiktok_link(&url) {
                deps.photo_client.resolve_short_link(&url).await
            } else {
                url
            };
            if is_photo_post_url(&url) {
                send_photo_post(bot, chat_id, &lang, deps, &url).await
            } else {
                send_preview(bot, chat_id, &lang, deps, &url).await
            }
        }
    }
}

/// Caption shown above the quality buttons.
pub fn preview_caption(lang: &LanguageIdentifier, info: &VideoInfo) -> String {
    let duration = info
        .duration_label
        .clone()
        .unwrap_or_else(|| i18n::t(lang, "duration-unknown"));

    let mut args = fluent_templates::fluent_bundle::FluentArgs::new();
    args.set("title", truncate_text(&info.title, PREVIEW_TITLE_CHARS));
    args.set("duration", duration);
    i18n::t_args(lang, "preview-caption", &args)
}

/// Probes the link and sends the quality picker.
pub async fn send_preview(
    bot: &Bot,
    chat_id: ChatId,
    lang: &LanguageIdentifier,
    deps: &HandlerDeps,
    url: &str,
) -> Result<(), HandlerError> {
    let status = bot.send_message(chat_id, i18n::t(lang, "link-checking")).await?;

    let info = match deps.ytdlp.fetch_metadata(url).await {
        Ok(info) => info,
        Err(e) => {
            report_error(bot, chat_id, Some(status.id), lang, deps, &AppError::from(e)).await?;
            return Ok(());
        }
    };

    let token = deps.links.put(url).await;
    let caption = preview_caption(lang, &info);
    let keyboard = quality_keyboard(lang, &token);

    delete_status(bot, chat_id, status.id).await;
    send_caption_with_keyboard(bot, chat_id, info.thumbnail_url.as_deref(), caption, keyboard).await?;
    Ok(())
}

/// Sends the caption on the thumbnail photo, or as text when there is no usable thumbnail.
async fn send_caption_with_keyboard(
    bot: &Bot,
    chat_id: ChatId,
    thumbnail_url: Option<&str>,
    caption: String,
    keyboard: InlineKeyboardMarkup,
) -> Result<(), teloxide::RequestError> {
    if let Some(thumbnail) = thumbnail_url.and_then(|t| url::Url::parse(t).ok()) {
        match bot
            .send_photo(chat_id, InputFile::url(thumbnail))
            .caption(caption.clone())
            .reply_markup(keyboard.clone())
            .await
        {
            Ok(_) => return Ok(()),
            Err(e) => log::warn!("Failed to send thumbnail preview to chat {}, falling back to text: {}", chat_id, e),
        }
    }

    bot.send_message(chat_id, caption).reply_markup(keyboard).await?;
    Ok(())
}
