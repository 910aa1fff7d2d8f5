//! Telegram Bot API client.

use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;

use crate::service::Notifier;

use super::error::TelegramError;

/// Default base URL for the Bot API.
const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Body of a `sendMessage` call.
#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

/// Configuration for the Telegram client.
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot token issued by BotFather
    pub bot_token: String,
    /// Destination chat
    pub chat_id: String,
    /// Base URL for the Bot API
    pub api_base: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl TelegramConfig {
    /// Create a new config for the given bot and chat.
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"********")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Client that posts messages to one Telegram chat.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    send_url: Url,
    chat_id: String,
}

impl TelegramClient {
    /// Create a new Telegram client.
    pub fn new(config: TelegramConfig) -> Result<Self, TelegramError> {
        let mut send_url =
            Url::parse(&config.api_base).map_err(|e| TelegramError::InvalidUrl(e.to_string()))?;
        send_url
            .path_segments_mut()
            .map_err(|_| TelegramError::InvalidUrl(config.api_base.clone()))?
            .pop_if_empty()
            .push(&format!("bot{}", config.bot_token))
            .push("sendMessage");

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            send_url,
            chat_id: config.chat_id,
        })
    }

    /// Send a Markdown message to the configured chat.
    pub async fn send_message(&self, text: &str) -> Result<(), TelegramError> {
        tracing::info!(chat_id = %self.chat_id, "sending Telegram message");

        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "Markdown",
        };

        let response = self
            .http
            .post(self.send_url.clone())
            .json(&body)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TelegramError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send(&self, message: &str) -> Result<(), TelegramError> {
        self.send_message(message).await
    }
}
