//! Telegram Bot API stand-in built on wiremock

use serde_json::{json, Value};
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, Message};
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const CHAT_ID: i64 = 123456789;
pub const USER_ID: u64 = 123456789;

pub struct TelegramMock {
    pub server: MockServer,
    pub bot: Bot,
}

fn bot_message(message_id: i32) -> Value {
    json!({
        "message_id": message_id,
        "from": { "id": 987654321, "is_bot": true, "first_name": "TestBot", "username": "test_bot" },
        "chat": { "id": CHAT_ID, "type": "private", "first_name": "Test" },
        "date": 1735992000,
        "text": "Response"
    })
}

impl TelegramMock {
    /// Starts the server with every method the bot uses answered successfully.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let bot = Bot::new("test_token_12345:ABCDEF").set_api_url(server.uri().parse().unwrap());

        let ok_true = json!({ "ok": true, "result": true });
        for name in ["answerCallbackQuery", "deleteMessage", "setMyCommands"] {
            Mock::given(method("POST"))
                .and(path_regex(format!("(?i)/bot[^/]+/{}", name)))
                .respond_with(ResponseTemplate::new(200).set_body_json(ok_true.clone()))
                .mount(&server)
                .await;
        }

        Mock::given(method("POST"))
            .and(path_regex("(?i)/bot[^/]+/sendMediaGroup"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": [bot_message(50), bot_message(51)] })),
            )
            .mount(&server)
            .await;

        // sendMessage, editMessageText, sendPhoto, sendVideo, sendAudio
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": bot_message(42) })))
            .mount(&server)
            .await;

        Self { server, bot }
    }

    /// Makes `sendPhoto` fail so callers fall back to text.
    pub async fn reject_photos(&self) {
        Mock::given(method("POST"))
            .and(path_regex("(?i)/bot[^/]+/sendPhoto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: wrong file identifier/HTTP URL specified"
            })))
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    /// Requests to one Bot API method, in order.
    pub async fn requests(&self, api_method: &str) -> Vec<Request> {
        let suffix = format!("/{}", api_method.to_lowercase());
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path().to_lowercase().ends_with(&suffix))
            .collect()
    }

    /// JSON bodies of requests to one method (multipart uploads are skipped).
    pub async fn json_bodies(&self, api_method: &str) -> Vec<Value> {
        self.requests(api_method)
            .await
            .iter()
            .filter_map(|r| serde_json::from_slice(&r.body).ok())
            .collect()
    }

    /// Texts of every sendMessage and editMessageText call, in order.
    pub async fn texts(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| {
                let path = r.url.path().to_lowercase();
                path.ends_with("/sendmessage") || path.ends_with("/editmessagetext")
            })
            .filter_map(|r| serde_json::from_slice::<Value>(&r.body).ok())
            .filter_map(|body| body["text"].as_str().map(str::to_string))
            .collect()
    }
}

/// Builds an incoming text message from a user with the given language.
pub fn text_message(text: &str, language_code: &str) -> Message {
    let json = json!({
        "message_id": 1,
        "date": 1735992000,
        "chat": { "id": CHAT_ID, "type": "private", "first_name": "Test", "username": "testuser" },
        "from": {
            "id": USER_ID,
            "is_bot": false,
            "first_name": "Test",
            "username": "testuser",
            "language_code": language_code
        },
        "text": text
    });
    serde_json::from_value(json).expect("Failed to deserialize message")
}

/// Builds a button press on a bot message.
pub fn callback(data: &str, language_code: &str) -> CallbackQuery {
    let json = json!({
        "id": "callback_123",
        "from": {
            "id": USER_ID,
            "is_bot": false,
            "first_name": "Test",
            "username": "testuser",
            "language_code": language_code
        },
        "message": bot_message(42),
        "chat_instance": "chat_instance_123",
        "data": data
    });
    serde_json::from_value(json).expect("Failed to deserialize callback")
}

/// Every callback payload in an inline keyboard.
pub fn callback_payloads(body: &Value) -> Vec<String> {
    body["reply_markup"]["inline_keyboard"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(|button| button["callback_data"].as_str().map(str::to_string))
        .collect()
}
