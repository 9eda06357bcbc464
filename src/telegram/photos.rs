//! TikTok photo posts, delivered as a media group

use teloxide::prelude::*;
use teloxide::types::{InputFile, InputMedia, InputMediaPhoto};
use unic_langid::LanguageIdentifier;

use crate::core::error::AppError;
use crate::core::utils::truncate_text;
use crate::download::PhotoPost;
use crate::i18n;
use crate::telegram::handlers::{delete_status, report_error, HandlerDeps, HandlerError};

const CAPTION_MAX_CHARS: usize = 1024;

/// Builds the album; the caption goes on the first photo.
pub fn build_media_group(post: &PhotoPost) -> Vec<InputMedia> {
    post.image_urls
        .iter()
        .filter_map(|raw| match url::Url::parse(raw) {
            Ok(url) => Some(url),
            Err(e) => {
                log::warn!("Skipping invalid image URL {}: {}", raw, e);
                None
            }
        })
        .enumerate()
        .map(|(i, url)| {
            let photo = InputMediaPhoto::new(InputFile::url(url));
            let photo = if i == 0 {
                photo.caption(truncate_text(&post.title, CAPTION_MAX_CHARS))
            } else {
                photo
            };
            InputMedia::Photo(photo)
        })
        .collect()
}

/// Fetches a photo post and sends its images.
pub async fn send_photo_post(
    bot: &Bot,
    chat_id: ChatId,
    lang: &LanguageIdentifier,
    deps: &HandlerDeps,
    url: &str,
) -> Result<(), HandlerError> {
    let status = bot.send_message(chat_id, i18n::t(lang, "photo-fetching")).await?;

    let post = match deps.photo_client.fetch_photo_post(url).await {
        Ok(post) => post,
        Err(e) => {
            report_error(bot, chat_id, Some(status.id), lang, deps, &AppError::from(e)).await?;
            return Ok(());
        }
    };

    let media = build_media_group(&post);
    if media.is_empty() {
        let err = AppError::from(crate::download::PhotoPostError::ImagesNotFound);
        report_error(bot, chat_id, Some(status.id), lang, deps, &err).await?;
        return Ok(());
    }

    match bot.send_media_group(chat_id, media).await {
        Ok(messages) => {
            log::info!("Sent {} photo(s) from {} to chat {}", messages.len(), url, chat_id);
            delete_status(bot, chat_id, status.id).await;
        }
        Err(e) => {
            report_error(bot, chat_id, Some(status.id), lang, deps, &AppError::from(e)).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_media_group_captions_first_photo_only() {
        let post = PhotoPost {
            title: "Trip".into(),
            image_urls: vec![
                "https://p16.tiktokcdn.com/a.jpeg".into(),
                "not a url".into(),
                "https://p16.tiktokcdn.com/b.jpeg".into(),
            ],
        };

        let media = build_media_group(&post);
        assert_eq!(media.len(), 2);
        match (&media[0], &media[1]) {
            (InputMedia::Photo(first), InputMedia::Photo(second)) => {
                assert_eq!(first.caption.as_deref(), Some("Trip"));
                assert_eq!(second.caption, None);
            }
            other => panic!("unexpected media {:?}", other),
        }
    }
}
