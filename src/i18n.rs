use std::collections::HashMap;

use fluent_templates::{
    fluent_bundle::{FluentArgs, FluentValue},
    static_loader, Loader,
};
use once_cell::sync::Lazy;
use unic_langid::LanguageIdentifier;

use crate::core::error::ErrorKind;

static_loader! {
    static LOCALES = {
        locales: "./locales",
        fallback_language: "en",
        // Telegram renders the bidi isolation marks as garbage
        customise: |bundle| bundle.set_use_isolating(false),
    };
}

/// Supported languages (code, human-readable name).
pub static SUPPORTED_LANGS: &[(&str, &str)] = &[("en", "English"), ("my", "မြန်မာ")];

/// Default language identifier used as a fallback.
static DEFAULT_LANG: Lazy<LanguageIdentifier> = Lazy::new(|| "en".parse().unwrap_or_default());

/// Normalizes a language code into a LanguageIdentifier (falls back to default).
pub fn lang_from_code(code: &str) -> LanguageIdentifier {
    match is_language_supported(code) {
        Some(supported) => supported.parse().unwrap_or_else(|_| DEFAULT_LANG.clone()),
        None => DEFAULT_LANG.clone(),
    }
}

/// Resolves the reply language from the sender's Telegram `language_code`.
pub fn user_lang(telegram_lang_code: Option<&str>) -> LanguageIdentifier {
    telegram_lang_code
        .map(lang_from_code)
        .unwrap_or_else(|| DEFAULT_LANG.clone())
}

/// Returns a localized string for the given key.
/// Converts literal `\n` sequences to actual newlines for proper Telegram formatting.
pub fn t(lang: &LanguageIdentifier, key: &str) -> String {
    let text = LOCALES
        .lookup(lang, key)
        .unwrap_or_else(|| LOCALES.lookup(&DEFAULT_LANG, key).unwrap_or_else(|| key.to_string()));
    text.replace("\\n", "\n")
}

/// Returns a localized string with arguments for interpolation.
/// Converts literal `\n` sequences to actual newlines for proper Telegram formatting.
pub fn t_args(lang: &LanguageIdentifier, key: &str, args: &FluentArgs) -> String {
    let args_map: HashMap<String, FluentValue> = args.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();

    let text = LOCALES.lookup_with_args(lang, key, &args_map).unwrap_or_else(|| {
        LOCALES
            .lookup_with_args(&DEFAULT_LANG, key, &args_map)
            .unwrap_or_else(|| key.to_string())
    });
    text.replace("\\n", "\n")
}

/// User-facing message for an error category.
pub fn error_message(lang: &LanguageIdentifier, kind: ErrorKind, limit_mb: u64) -> String {
    let mut args = FluentArgs::new();
    args.set("limit", limit_mb);
    t_args(lang, kind.i18n_key(), &args)
}

/// Checks if a language code is supported by the bot.
/// Returns the normalized language code if supported, None otherwise.
pub fn is_language_supported(code: &str) -> Option<&'static str> {
    // "en-US" -> "en", "my-MM" -> "my"
    let normalized = code.split(['-', '_']).next().unwrap_or(code).to_lowercase();

    SUPPORTED_LANGS
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(&normalized))
        .map(|(c, _)| *c)
}
