//! Telegram notification error types.

/// Errors that can occur when sending a Telegram message.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// Bot API returned an error status
    #[error("Telegram API error {status}: {message}")]
    Api { status: u16, message: String },

    /// API base could not be used to build a request
    #[error("invalid Telegram API base: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the bot token
        TelegramError::Http(err.without_url())
    }
}
