//! Status message formatting.
//!
//! Turns a departure board into the Markdown message sent to Telegram.
//! Formatting never fails: missing optional fields fall back to
//! placeholders and unparsable times simply omit the delay.

mod badge;
mod format;

pub use badge::{StatusBadge, delay_minutes};
pub use format::{format_board, format_service_line, no_services_message};
