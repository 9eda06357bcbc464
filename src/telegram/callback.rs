//! Inline-button payloads
//!
//! Telegram caps callback data at 64 bytes, so payloads carry short codes and
//! link tokens instead of URLs:
//! - `dl:<720|480|360|best|mp3>:<token>` for quality buttons
//! - `mv:<n>` for movie detail buttons (1-indexed)

use crate::download::Quality;

const DOWNLOAD_PREFIX: &str = "dl";
const MOVIE_PREFIX: &str = "mv";

/// Decoded callback payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Download { quality: Quality, token: String },
    MovieDetails(usize),
    /// Anything else; acknowledged and ignored
    Unknown,
}

impl CallbackAction {
    pub fn parse(data: &str) -> Self {
        let mut parts = data.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(DOWNLOAD_PREFIX), Some(code), Some(token)) if !token.is_empty() => match Quality::parse(code) {
                Some(quality) => CallbackAction::Download {
                    quality,
                    token: token.to_string(),
                },
                None => CallbackAction::Unknown,
            },
            (Some(MOVIE_PREFIX), Some(index), None) => index
                .parse::<usize>()
                .map(CallbackAction::MovieDetails)
                .unwrap_or(CallbackAction::Unknown),
            _ => CallbackAction::Unknown,
        }
    }
}

pub fn download_payload(quality: Quality, token: &str) -> String {
    format!("{}:{}:{}", DOWNLOAD_PREFIX, quality.code(), token)
}

pub fn movie_payload(index: usize) -> String {
    format!("{}:{}", MOVIE_PREFIX, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::quality::OFFERED_QUALITIES;
    use crate::storage::links::generate_token;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_download() {
        assert_eq!(
            CallbackAction::parse("dl:720:loyw3v28ab12cd"),
            CallbackAction::Download {
                quality: Quality::Height(720),
                token: "loyw3v28ab12cd".to_string()
            }
        );
        assert_eq!(
            CallbackAction::parse("dl:mp3:tok"),
            CallbackAction::Download {
                quality: Quality::Mp3,
                token: "tok".to_string()
            }
        );
    }

    #[test]
    fn test_parse_movie() {
        assert_eq!(CallbackAction::parse("mv:3"), CallbackAction::MovieDetails(3));
        assert_eq!(CallbackAction::parse("mv:x"), CallbackAction::Unknown);
    }

    #[test]
    fn test_unknown_payloads() {
        for data in ["", "dl", "dl:720", "dl:720:", "dl:hd:tok", "pv:set:1", "mv:1:2", "menu"] {
            assert_eq!(CallbackAction::parse(data), CallbackAction::Unknown, "{:?}", data);
        }
    }

    #[test]
    fn test_payloads_fit_telegram_limit() {
        let token = generate_token();
        for quality in OFFERED_QUALITIES {
            let payload = download_payload(quality, &token);
            assert!(payload.len() <= 64, "{} is too long", payload);
            assert_eq!(
                CallbackAction::parse(&payload),
                CallbackAction::Download {
                    quality,
                    token: token.clone()
                }
            );
        }
        assert_eq!(CallbackAction::parse(&movie_payload(5)), CallbackAction::MovieDetails(5));
    }
}
