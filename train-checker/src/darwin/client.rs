//! Departures HTTP client.
//!
//! Queries a Huxley-style JSON proxy of the Darwin Live Departure Boards
//! service. The access token travels as a query parameter, so every URL
//! that reaches a log line goes through [`DarwinClient::departures_url`]
//! with the token replaced.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use tokio::sync::Semaphore;

use crate::domain::{ClockTime, StationCode};
use crate::service::DepartureLookup;

use super::error::DarwinError;
use super::types::DepartureBoard;

/// Default minutes window for results.
const DEFAULT_TIME_WINDOW: u16 = 60;

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Placeholder written in place of the access token in logs.
const REDACTED: &str = "********";

/// Configuration for the departures client.
#[derive(Clone)]
pub struct DarwinConfig {
    /// Access token passed as the `accessToken` query parameter
    pub access_token: String,
    /// Base URL of the departures API
    pub base_url: String,
    /// Minutes window for results
    pub time_window: u16,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl DarwinConfig {
    /// Create a new config for the given API base URL and access token.
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: base_url.into(),
            time_window: DEFAULT_TIME_WINDOW,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }

    /// Set the minutes window for results.
    pub fn with_time_window(mut self, minutes: u16) -> Self {
        self.time_window = minutes;
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl std::fmt::Debug for DarwinConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DarwinConfig")
            .field("access_token", &REDACTED)
            .field("base_url", &self.base_url)
            .field("time_window", &self.time_window)
            .field("max_concurrent", &self.max_concurrent)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Departures API client.
///
/// Uses a semaphore to limit concurrent requests and avoid rate limiting.
#[derive(Clone)]
pub struct DarwinClient {
    http: reqwest::Client,
    base_url: Url,
    access_token: String,
    time_window: u16,
    semaphore: Arc<Semaphore>,
}

impl DarwinClient {
    /// Create a new client with the given configuration.
    pub fn new(config: DarwinConfig) -> Result<Self, DarwinError> {
        let base_url =
            Url::parse(&config.base_url).map_err(|e| DarwinError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(DarwinError::InvalidUrl(format!(
                "{} cannot be used as a base",
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url,
            access_token: config.access_token,
            time_window: config.time_window,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// Build the departures URL for a station pair.
    ///
    /// Path segments are percent-encoded, so station codes taken from a
    /// request path cannot alter the query.
    fn departures_url(
        &self,
        token: &str,
        time: ClockTime,
        origin: &StationCode,
        destination: &StationCode,
    ) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                "departures",
                origin.as_str(),
                "to",
                destination.as_str(),
            ]);
        }
        url.query_pairs_mut()
            .append_pair("accessToken", token)
            .append_pair("time", &time.to_string())
            .append_pair("timeWindow", &self.time_window.to_string())
            .append_pair("expand", "true");
        url
    }

    /// The request URL as it may appear in logs.
    pub fn redacted_url(
        &self,
        time: ClockTime,
        origin: &StationCode,
        destination: &StationCode,
    ) -> String {
        self.departures_url(REDACTED, time, origin, destination)
            .to_string()
    }

    /// Get the departure board from `origin` filtered to services calling
    /// at `destination`.
    ///
    /// Returns `Ok(None)` when the API answers successfully with an empty
    /// or `null` body.
    pub async fn get_departures_to(
        &self,
        time: ClockTime,
        origin: &StationCode,
        destination: &StationCode,
    ) -> Result<Option<DepartureBoard>, DarwinError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| DarwinError::ApiError {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let url = self.departures_url(&self.access_token, time, origin, destination);
        tracing::info!(
            url = %self.redacted_url(time, origin, destination),
            "requesting train status"
        );

        let response = self.http.get(url).send().await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                reason = status.canonical_reason().unwrap_or(""),
                body = %body,
                "error from departures API"
            );

            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(DarwinError::Unauthorized);
            }
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(DarwinError::RateLimited);
            }
            return Err(DarwinError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(None);
        }

        serde_json::from_str(trimmed)
            .map(Some)
            .map_err(|e| DarwinError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })
    }
}

#[async_trait]
impl DepartureLookup for DarwinClient {
    async fn lookup(
        &self,
        time: ClockTime,
        origin: &StationCode,
        destination: &StationCode,
    ) -> Result<Option<DepartureBoard>, DarwinError> {
        self.get_departures_to(time, origin, destination).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;

    fn code(s: &str) -> StationCode {
        StationCode::parse_normalized(s).unwrap()
    }

    fn time(s: &str) -> ClockTime {
        ClockTime::parse_hhmm(s).unwrap()
    }

    /// Serve `router` on an ephemeral local port and return its base URL.
    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn config_builder() {
        let config = DarwinConfig::new("http://localhost:8080", "test-token")
            .with_time_window(120)
            .with_max_concurrent(10)
            .with_timeout(60);

        assert_eq!(config.access_token, "test-token");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.time_window, 120);
        assert_eq!(config.max_concurrent, 10);
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn config_defaults() {
        let config = DarwinConfig::new("http://localhost:8080", "test-token");

        assert_eq!(config.time_window, DEFAULT_TIME_WINDOW);
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn config_debug_hides_token() {
        let config = DarwinConfig::new("http://localhost:8080", "super-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains(REDACTED));
    }

    #[test]
    fn rejects_unusable_base_url() {
        assert!(DarwinClient::new(DarwinConfig::new("not a url", "t")).is_err());
        assert!(DarwinClient::new(DarwinConfig::new("mailto:someone@example.com", "t")).is_err());
    }

    #[test]
    fn builds_departures_url() {
        let client =
            DarwinClient::new(DarwinConfig::new("https://huxley.example.com", "abc123")).unwrap();
        let url = client.departures_url("abc123", time("08:05"), &code("EUS"), &code("BHM"));

        assert_eq!(
            url.as_str(),
            "https://huxley.example.com/departures/EUS/to/BHM\
             ?accessToken=abc123&time=08%3A05&timeWindow=60&expand=true"
        );
    }

    #[test]
    fn keeps_base_path_prefix() {
        let client =
            DarwinClient::new(DarwinConfig::new("https://example.com/huxley/", "t")).unwrap();
        let url = client.departures_url("t", time("08:05"), &code("EUS"), &code("BHM"));
        assert_eq!(url.path(), "/huxley/departures/EUS/to/BHM");
    }

    #[test]
    fn encodes_station_codes() {
        let client = DarwinClient::new(DarwinConfig::new("https://example.com", "t")).unwrap();
        let url = client.departures_url("t", time("08:05"), &code("A?B"), &code("C/D"));
        assert_eq!(url.path(), "/departures/A%3FB/to/C%2FD");
        assert_eq!(url.query_pairs().count(), 4);
    }

    #[test]
    fn redacted_url_hides_token() {
        let client =
            DarwinClient::new(DarwinConfig::new("https://example.com", "super-secret")).unwrap();
        let redacted = client.redacted_url(time("08:05"), &code("EUS"), &code("BHM"));

        assert!(!redacted.contains("super-secret"));
        assert!(redacted.contains("accessToken=********"));
    }

    #[tokio::test]
    async fn fetches_board() {
        let router = Router::new().route(
            "/departures/:origin/to/:destination",
            get(
                |Path((origin, destination)): Path<(String, String)>,
                 Query(params): Query<HashMap<String, String>>| async move {
                    assert_eq!(params.get("accessToken").map(String::as_str), Some("tok"));
                    assert_eq!(params.get("time").map(String::as_str), Some("08:05"));
                    assert_eq!(params.get("timeWindow").map(String::as_str), Some("60"));
                    assert_eq!(params.get("expand").map(String::as_str), Some("true"));
                    Json(serde_json::json!({
                        "locationName": "London Euston",
                        "crs": origin,
                        "filtercrs": destination,
                        "trainServices": [{"std": "08:30", "etd": "On time"}]
                    }))
                },
            ),
        );
        let base = spawn_upstream(router).await;
        let client = DarwinClient::new(DarwinConfig::new(base, "tok")).unwrap();

        let board = client
            .get_departures_to(time("08:05"), &code("EUS"), &code("BHM"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(board.crs.as_deref(), Some("EUS"));
        assert_eq!(board.filter_crs.as_deref(), Some("BHM"));
        assert_eq!(board.services().len(), 1);
    }

    #[tokio::test]
    async fn null_body_is_absent_board() {
        let router = Router::new().route(
            "/departures/:origin/to/:destination",
            get(|| async { "null" }),
        );
        let base = spawn_upstream(router).await;
        let client = DarwinClient::new(DarwinConfig::new(base, "tok")).unwrap();

        let board = client
            .get_departures_to(time("08:05"), &code("EUS"), &code("BHM"))
            .await
            .unwrap();

        assert!(board.is_none());
    }

    #[tokio::test]
    async fn error_status_is_api_error() {
        let router = Router::new().route(
            "/departures/:origin/to/:destination",
            get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let base = spawn_upstream(router).await;
        let client = DarwinClient::new(DarwinConfig::new(base, "tok")).unwrap();

        let err = client
            .get_departures_to(time("08:05"), &code("EUS"), &code("BHM"))
            .await
            .unwrap_err();

        match err {
            DarwinError::ApiError { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn unauthorized_status() {
        let router = Router::new().route(
            "/departures/:origin/to/:destination",
            get(|| async { StatusCode::UNAUTHORIZED }),
        );
        let base = spawn_upstream(router).await;
        let client = DarwinClient::new(DarwinConfig::new(base, "tok")).unwrap();

        let err = client
            .get_departures_to(time("08:05"), &code("EUS"), &code("BHM"))
            .await
            .unwrap_err();

        assert!(matches!(err, DarwinError::Unauthorized));
    }

    #[tokio::test]
    async fn malformed_body_is_json_error() {
        let router = Router::new().route(
            "/departures/:origin/to/:destination",
            get(|| async { "{not json" }),
        );
        let base = spawn_upstream(router).await;
        let client = DarwinClient::new(DarwinConfig::new(base, "tok")).unwrap();

        let err = client
            .get_departures_to(time("08:05"), &code("EUS"), &code("BHM"))
            .await
            .unwrap_err();

        assert!(matches!(err, DarwinError::Json { .. }));
    }

    #[tokio::test]
    async fn transport_error_does_not_leak_token() {
        // Nothing listens on port 9 locally
        let client = DarwinClient::new(
            DarwinConfig::new("http://127.0.0.1:9", "super-secret").with_timeout(2),
        )
        .unwrap();

        let err = client
            .get_departures_to(time("08:05"), &code("EUS"), &code("BHM"))
            .await
            .unwrap_err();

        assert!(matches!(err, DarwinError::Http(_)));
        assert!(!err.to_string().contains("super-secret"));
    }
}
