//! Telegram Bot API notifier.
//!
//! Sends formatted status messages to a single chat through `sendMessage`.

mod client;
mod error;

pub use client::{TelegramClient, TelegramConfig};
pub use error::TelegramError;
