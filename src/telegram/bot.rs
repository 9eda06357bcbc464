//! Bot initialization and command registration
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Localized command menu setup

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use teloxide::utils::command::BotCommands;

use crate::core::config::{self, Config};
use crate::i18n;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "show the welcome message")]
    Start,
    #[command(description = "show what the bot can do")]
    Help,
    #[command(description = "search for a film")]
    Movie(String),
    #[command(description = "show one result of the last search")]
    Details(String),
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Missing token, invalid URL or HTTP client failure
pub fn create_bot(config: &Config) -> anyhow::Result<Bot> {
    let token = config.require_bot_token()?;
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;

    let bot = match config.bot_api_url.as_deref() {
        Some(bot_api_url) => {
            log::info!("Using custom Bot API URL: {}", bot_api_url);
            let url = url::Url::parse(bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
            Bot::with_client(token, client).set_api_url(url)
        }
        None => Bot::with_client(token, client),
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI for every supported language
///
/// The English list is also registered without a language code so it is
/// shown to users whose language is not supported.
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(command_list("en")).await?;

    for (code, _) in i18n::SUPPORTED_LANGS {
        bot.set_my_commands(command_list(code)).language_code(code.to_string()).await?;
    }

    Ok(())
}

fn command_list(lang_code: &str) -> Vec<BotCommand> {
    let lang = i18n::lang_from_code(lang_code);
    vec![
        BotCommand::new("start", i18n::t(&lang, "cmd-start")),
        BotCommand::new("help", i18n::t(&lang, "cmd-help")),
        BotCommand::new("movie", i18n::t(&lang, "cmd-movie")),
        BotCommand::new("details", i18n::t(&lang, "cmd-details")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_descriptions() {
        let command_list = format!("{}", Command::descriptions());

        assert!(command_list.contains("Available commands"));
        assert!(command_list.contains("/start"));
        assert!(command_list.contains("/movie"));
        assert!(command_list.contains("/details"));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start", "bot").unwrap(), Command::Start);
        assert_eq!(
            Command::parse("/movie the matrix", "bot").unwrap(),
            Command::Movie("the matrix".to_string())
        );
        assert_eq!(Command::parse("/details 2", "bot").unwrap(), Command::Details("2".to_string()));
        assert!(Command::parse("/unknown", "bot").is_err());
    }

    #[test]
    fn test_command_list_is_localized() {
        let en = command_list("en");
        let my = command_list("my");
        assert_eq!(en.len(), 4);
        assert_eq!(en[2].command, "movie");
        assert_ne!(en[2].description, my[2].description);
    }

    #[test]
    fn test_create_bot_requires_token() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert!(create_bot(&config).is_err());
    }
}
