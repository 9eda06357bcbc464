//! `/movie` search and result details

use fluent_templates::fluent_bundle::FluentArgs;
use teloxide::prelude::*;
use teloxide::types::InputFile;
use unic_langid::LanguageIdentifier;

use crate::catalog::MovieSummary;
use crate::core::error::AppError;
use crate::core::utils::truncate_text;
use crate::i18n;
use crate::storage::{select_result, DetailsError};
use crate::telegram::downloads::answer;
use crate::telegram::handlers::{message_lang, report_error, HandlerDeps, HandlerError};
use crate::telegram::keyboard::movie_keyboard;

const CAPTION_MAX_CHARS: usize = 1024;

/// Numbered result list sent after a search.
pub fn render_results(lang: &LanguageIdentifier, query: &str, items: &[MovieSummary]) -> String {
    let mut args = FluentArgs::new();
    args.set("query", query.to_string());
    let mut lines = vec![i18n::t_args(lang, "movie-results-header", &args)];

    for (i, movie) in items.iter().enumerate() {
        let mut args = FluentArgs::new();
        args.set("index", i + 1);
        args.set("title", movie.title.clone());
        args.set("year", movie.year.clone());
        args.set("rating", movie.rating.clone());
        lines.push(i18n::t_args(lang, "movie-result-line", &args));
    }

    lines.push(String::new());
    lines.push(i18n::t(lang, "movie-results-footer"));
    lines.join("\n")
}

/// Detail card for one result.
pub fn render_details(lang: &LanguageIdentifier, movie: &MovieSummary) -> String {
    let overview = if movie.overview.trim().is_empty() {
        i18n::t(lang, "movie-no-overview")
    } else {
        movie.overview.clone()
    };

    let mut args = FluentArgs::new();
    args.set("title", movie.title.clone());
    args.set("year", movie.year.clone());
    args.set("rating", movie.rating.clone());
    args.set("overview", overview);
    i18n::t_args(lang, "movie-details", &args)
}

/// User-facing text for a detail request that cannot be served.
pub fn details_error_text(lang: &LanguageIdentifier, err: &DetailsError) -> String {
    match err {
        DetailsError::NoSearch | DetailsError::OutOfRange { len: 0, .. } => i18n::t(lang, "details-no-search"),
        DetailsError::OutOfRange { len, .. } => {
            let mut args = FluentArgs::new();
            args.set("count", *len);
            i18n::t_args(lang, "details-out-of-range", &args)
        }
    }
}

/// Handles `/movie <query>`.
pub async fn handle_movie_command(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
    query: &str,
) -> Result<(), HandlerError> {
    let lang = message_lang(msg);
    let chat_id = msg.chat.id;
    let query = query.trim();

    if query.is_empty() {
        bot.send_message(chat_id, i18n::t(&lang, "movie-usage")).await?;
        return Ok(());
    }

    let items = match deps.catalog.search(query).await {
        Ok(items) => items,
        Err(e) => {
            report_error(bot, chat_id, None, &lang, deps, &AppError::from(e)).await?;
            return Ok(());
        }
    };
    log::info!("Movie search {:?} in chat {}: {} result(s)", query, chat_id, items.len());

    // Stored even when empty so an older list is no longer reachable
    deps.searches.put(chat_id.0, query, items.clone()).await;

    if items.is_empty() {
        let mut args = FluentArgs::new();
        args.set("query", query.to_string());
        bot.send_message(chat_id, i18n::t_args(&lang, "movie-no-results", &args))
            .await?;
        return Ok(());
    }

    bot.send_message(chat_id, render_results(&lang, query, &items))
        .reply_markup(movie_keyboard(items.len()))
        .await?;
    Ok(())
}

/// Handles `/details <n>`.
pub async fn handle_details_command(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
    arg: &str,
) -> Result<(), HandlerError> {
    let lang = message_lang(msg);

    match arg.trim().parse::<usize>() {
        Ok(index) => show_details(bot, msg.chat.id, &lang, deps, index).await,
        Err(_) => {
            bot.send_message(msg.chat.id, i18n::t(&lang, "details-usage")).await?;
            Ok(())
        }
    }
}

/// Handles a `mv:<n>` press.
pub async fn handle_movie_callback(
    bot: &Bot,
    q: &CallbackQuery,
    deps: &HandlerDeps,
    index: usize,
) -> Result<(), HandlerError> {
    answer(bot, q, None).await;

    let Some(chat_id) = q.message.as_ref().map(|m| m.chat().id) else {
        return Ok(());
    };
    let lang = i18n::user_lang(q.from.language_code.as_deref());
    show_details(bot, chat_id, &lang, deps, index).await
}

async fn show_details(
    bot: &Bot,
    chat_id: ChatId,
    lang: &LanguageIdentifier,
    deps: &HandlerDeps,
    index: usize,
) -> Result<(), HandlerError> {
    let entry = deps.searches.get(chat_id.0).await;

    let movie = match select_result(entry.as_ref(), index) {
        Ok(movie) => movie,
        Err(e) => {
            log::debug!("Details {} in chat {} rejected: {}", index, chat_id, e);
            bot.send_message(chat_id, details_error_text(lang, &e)).await?;
            return Ok(());
        }
    };

    let text = render_details(lang, movie);
    if let Some(poster) = movie.poster_url.as_deref().and_then(|p| url::Url::parse(p).ok()) {
        match bot
            .send_photo(chat_id, InputFile::url(poster))
            .caption(truncate_text(&text, CAPTION_MAX_CHARS))
            .await
        {
            Ok(_) => return Ok(()),
            Err(e) => log::warn!("Failed to send poster to chat {}, falling back to text: {}", chat_id, e),
        }
    }

    bot.send_message(chat_id, text).await?;
    Ok(())
}
