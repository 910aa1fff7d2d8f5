//! Clock time handling for departure boards.
//!
//! The departures API provides times as "HH:MM" strings with no date, so
//! differences between them are taken within a single day.

use chrono::{NaiveTime, Timelike};
use std::fmt;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time of day with minute precision.
///
/// # Examples
///
/// ```
/// use train_checker::domain::ClockTime;
///
/// let time = ClockTime::parse_hhmm("14:30").unwrap();
/// assert_eq!(time.to_string(), "14:30");
///
/// assert!(ClockTime::parse_hhmm("1430").is_err());
/// assert!(ClockTime::parse_hhmm("On time").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// Parse a time from strict "HH:MM" format.
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        // Must be exactly 5 characters: HH:MM
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();

        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }

        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| TimeError::new("invalid time"))
    }

    /// Truncate a wall-clock time to the minute.
    pub fn from_time(time: NaiveTime) -> Self {
        // hour/minute come from a valid NaiveTime, so this cannot fail
        Self(NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(NaiveTime::MIN))
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Minutes since midnight.
    pub fn minutes_of_day(&self) -> i64 {
        self.hour() as i64 * 60 + self.minute() as i64
    }

    /// Whole minutes from `earlier` to `self` on the same day.
    ///
    /// Negative when `self` is the earlier time; there is no midnight
    /// wrap, so `00:10` is 1425 minutes before `23:55`.
    pub fn minutes_since(&self, earlier: ClockTime) -> i64 {
        self.minutes_of_day() - earlier.minutes_of_day()
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockTime({:02}:{:02})", self.hour(), self.minute())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}
