//! Station code types.

use std::fmt;

use serde::Serialize;

/// Error returned when a station code is empty or whitespace.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station code: {reason}")]
pub struct InvalidStationCode {
    reason: &'static str,
}

/// A normalized station code, as accepted by the departures API.
///
/// Usually a 3-letter CRS code such as `EUS`, but the upstream API also
/// accepts longer identifiers, so the only guarantees are that the code is
/// non-empty, has no surrounding whitespace and is upper-case.
///
/// # Examples
///
/// ```
/// use train_checker::domain::StationCode;
///
/// let eus = StationCode::parse_normalized(" eus ").unwrap();
/// assert_eq!(eus.as_str(), "EUS");
///
/// assert!(StationCode::parse_normalized("").is_err());
/// assert!(StationCode::parse_normalized("   ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StationCode(String);

impl StationCode {
    /// Trim and upper-case a station code.
    pub fn parse_normalized(s: &str) -> Result<Self, InvalidStationCode> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InvalidStationCode {
                reason: "must not be empty",
            });
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationCode({})", self.0)
    }
}

impl fmt::Display for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An ordered origin → destination pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationPair {
    pub origin: StationCode,
    pub destination: StationCode,
}

impl StationPair {
    pub fn new(origin: StationCode, destination: StationCode) -> Self {
        Self {
            origin,
            destination,
        }
    }

    /// The same journey in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            origin: self.destination.clone(),
            destination: self.origin.clone(),
        }
    }
}

impl fmt::Display for StationPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.origin, self.destination)
    }
}
