//! Departure lookup error types.

use std::fmt;

/// Errors from the departures HTTP client.
#[derive(Debug)]
pub enum DarwinError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an error status code
    ApiError { status: u16, message: String },

    /// Rate limited by the API
    RateLimited,

    /// Invalid access token
    Unauthorized,

    /// Base URL could not be used to build a request
    InvalidUrl(String),
}

impl fmt::Display for DarwinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DarwinError::Http(e) => write!(f, "HTTP error: {e}"),
            DarwinError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            DarwinError::ApiError { status, message } => {
                write!(f, "API error {status}: {message}")
            }
            DarwinError::RateLimited => write!(f, "rate limited by departures API"),
            DarwinError::Unauthorized => write!(f, "unauthorized (invalid access token)"),
            DarwinError::InvalidUrl(msg) => write!(f, "invalid base URL: {msg}"),
        }
    }
}

impl std::error::Error for DarwinError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DarwinError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DarwinError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the access token
        DarwinError::Http(err.without_url())
    }
}

impl DarwinError {
    /// HTTP status reported by the upstream API, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            DarwinError::ApiError { status, .. } => Some(*status),
            DarwinError::RateLimited => Some(429),
            DarwinError::Unauthorized => Some(401),
            DarwinError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
