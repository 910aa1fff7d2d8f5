//! Departure status classification.

use std::fmt;

use crate::domain::ClockTime;

/// Presentation category of a service's estimated departure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusBadge<'a> {
    OnTime,
    Cancelled,
    /// An estimated time ("08:45") or any other status label ("Delayed").
    Other(&'a str),
}

impl<'a> StatusBadge<'a> {
    /// Classify an estimated-departure value, ignoring case and
    /// surrounding whitespace.
    pub fn classify(etd: &'a str) -> Self {
        let normalized = etd.trim().to_lowercase();
        match normalized.as_str() {
            "on time" => StatusBadge::OnTime,
            "cancelled" => StatusBadge::Cancelled,
            _ => StatusBadge::Other(etd),
        }
    }
}

impl fmt::Display for StatusBadge<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusBadge::OnTime => f.write_str("🟢 *On time*"),
            StatusBadge::Cancelled => f.write_str("🔴 *Cancelled*"),
            StatusBadge::Other(raw) => write!(f, "🟠 *{raw}*"),
        }
    }
}

/// Minutes a service is running late, when both times are clock times and
/// the estimate is after the schedule.
///
/// Returns `None` for status labels, malformed times, and services that
/// are on time or early.
pub fn delay_minutes(std: &str, etd: &str) -> Option<i64> {
    let scheduled = ClockTime::parse_hhmm(std.trim()).ok()?;
    let estimated = ClockTime::parse_hhmm(etd.trim()).ok()?;
    let delay = estimated.minutes_since(scheduled);
    (delay > 0).then_some(delay)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_sentinels_case_insensitively() {
        assert_eq!(StatusBadge::classify("On time"), StatusBadge::OnTime);
        assert_eq!(StatusBadge::classify("ON TIME"), StatusBadge::OnTime);
        assert_eq!(StatusBadge::classify("on time "), StatusBadge::OnTime);
        assert_eq!(StatusBadge::classify("Cancelled"), StatusBadge::Cancelled);
        assert_eq!(StatusBadge::classify("cAnCeLlEd"), StatusBadge::Cancelled);
    }

    #[test]
    fn classify_other_keeps_raw_value() {
        assert_eq!(StatusBadge::classify("08:45"), StatusBadge::Other("08:45"));
        assert_eq!(StatusBadge::classify("Delayed"), StatusBadge::Other("Delayed"));
        assert_eq!(StatusBadge::classify(""), StatusBadge::Other(""));
    }

    #[test]
    fn badge_display() {
        assert_eq!(StatusBadge::OnTime.to_string(), "🟢 *On time*");
        assert_eq!(StatusBadge::Cancelled.to_string(), "🔴 *Cancelled*");
        assert_eq!(StatusBadge::Other("08:45").to_string(), "🟠 *08:45*");
    }

    #[test]
    fn delay_when_late() {
        assert_eq!(delay_minutes("08:30", "08:45"), Some(15));
        assert_eq!(delay_minutes("00:00", "23:59"), Some(1439));
    }

    #[test]
    fn no_delay_when_early_or_on_time() {
        assert_eq!(delay_minutes("08:30", "08:20"), None);
        assert_eq!(delay_minutes("08:30", "08:30"), None);
        // Times are compared within one day
        assert_eq!(delay_minutes("08:00", "01:00"), None);
        assert_eq!(delay_minutes("23:55", "00:10"), None);
    }

    #[test]
    fn no_delay_for_labels_or_bad_times() {
        assert_eq!(delay_minutes("08:30", "Delayed"), None);
        assert_eq!(delay_minutes("08:30", "On time"), None);
        assert_eq!(delay_minutes("", "08:45"), None);
        assert_eq!(delay_minutes("8:30", "08:45"), None);
    }
}
