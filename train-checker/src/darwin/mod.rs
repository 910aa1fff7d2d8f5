//! Departure board lookup client.
//!
//! This module provides an HTTP client for a JSON proxy of the National
//! Rail Darwin API, which provides real-time train departure information.
//!
//! Key characteristics of the departures API:
//! - Times are in "HH:MM" format (UK local time)
//! - The estimated departure is either a time or a status word such as
//!   "On time", "Delayed" or "Cancelled"
//! - A successful response may carry a `null` body instead of a board

mod client;
mod error;
mod types;

pub use client::{DarwinClient, DarwinConfig};
pub use error::DarwinError;
pub use types::{DepartureBoard, Location, ServiceEntry};
