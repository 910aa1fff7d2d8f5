//! Domain types for the train checker.
//!
//! Types here enforce their invariants at construction time, so code that
//! receives them can trust their validity.

mod station;
mod time;

pub use station::{InvalidStationCode, StationCode, StationPair};
pub use time::{ClockTime, TimeError};
