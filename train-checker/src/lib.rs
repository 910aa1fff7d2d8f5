//! Train departure status checker.
//!
//! Polls a Huxley departures API on cron schedules for a route and its
//! reverse, formats the departure board as a status message, and posts it
//! to a Telegram chat. The same check is available on demand over HTTP.

pub mod config;
pub mod darwin;
pub mod domain;
pub mod scheduler;
pub mod service;
pub mod status;
pub mod telegram;
pub mod web;
