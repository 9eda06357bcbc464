//! Inline keyboards

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use unic_langid::LanguageIdentifier;

use crate::download::quality::{Quality, OFFERED_QUALITIES};
use crate::i18n;
use crate::telegram::callback::{download_payload, movie_payload};

/// Shorthand for a callback button.
pub fn cb(text: impl Into<String>, data: impl Into<String>) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text.into(), data.into())
}

pub fn keyboard_stats(keyboard: &InlineKeyboardMarkup) -> (usize, usize) {
    let rows = keyboard.inline_keyboard.len();
    let buttons = keyboard.inline_keyboard.iter().map(|row| row.len()).sum();
    (rows, buttons)
}

fn quality_label(lang: &LanguageIdentifier, quality: Quality) -> String {
    match quality {
        Quality::Height(height) => {
            let mut args = fluent_templates::fluent_bundle::FluentArgs::new();
            args.set("height", height);
            i18n::t_args(lang, "button-height", &args)
        }
        Quality::Best => i18n::t(lang, "button-best"),
        Quality::Mp3 => i18n::t(lang, "button-mp3"),
    }
}

/// Quality picker for a stored link: the three heights on one row, best and mp3 below.
pub fn quality_keyboard(lang: &LanguageIdentifier, token: &str) -> InlineKeyboardMarkup {
    let (heights, others): (Vec<Quality>, Vec<Quality>) = OFFERED_QUALITIES
        .iter()
        .copied()
        .partition(|q| matches!(q, Quality::Height(_)));

    let row = |qualities: Vec<Quality>| {
        qualities
            .into_iter()
            .map(|q| cb(quality_label(lang, q), download_payload(q, token)))
            .collect::<Vec<_>>()
    };

    InlineKeyboardMarkup::new(vec![row(heights), row(others)])
}

/// One numbered detail button per search result.
pub fn movie_keyboard(count: usize) -> InlineKeyboardMarkup {
    let buttons: Vec<InlineKeyboardButton> = (1..=count).map(|i| cb(i.to_string(), movie_payload(i))).collect();
    InlineKeyboardMarkup::new(vec![buttons])
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    fn payloads(keyboard: &InlineKeyboardMarkup) -> Vec<String> {
        keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|b| match &b.kind {
                InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_quality_keyboard() {
        let lang = i18n::lang_from_code("en");
        let keyboard = quality_keyboard(&lang, "tok123");

        assert_eq!(keyboard_stats(&keyboard), (2, 5));
        assert_eq!(
            payloads(&keyboard),
            vec!["dl:720:tok123", "dl:480:tok123", "dl:360:tok123", "dl:best:tok123", "dl:mp3:tok123"]
        );
        assert_eq!(keyboard.inline_keyboard[0][0].text, "🎥 720p");
    }

    #[test]
    fn test_movie_keyboard() {
        let keyboard = movie_keyboard(3);
        assert_eq!(keyboard_stats(&keyboard), (1, 3));
        assert_eq!(payloads(&keyboard), vec!["mv:1", "mv:2", "mv:3"]);
    }
}
