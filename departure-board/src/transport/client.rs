//! Departures HTTP client.
//!
//! Provides async methods for querying a `transport.rest` API. Handles
//! concurrency limiting, retries of transient failures, and conversion to
//! domain types.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::domain::DepartureRecord;

use super::DeparturesSource;
use super::convert::{StationMatch, convert_departures, convert_locations};
use super::error::FetchError;
use super::types::{DeparturesResponse, LocationDto};

/// Default base URL: the public Deutsche Bahn instance.
pub const DEFAULT_BASE_URL: &str = "https://v6.db.transport.rest";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 2;

/// Configuration for the transport client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Attempts per request, including the first
    pub max_retries: u32,
    /// Pause between attempts
    pub retry_delay: Duration,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
}

impl TransportConfig {
    /// Create a config for the given API base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 10,
            max_retries: 3,
            retry_delay: Duration::from_secs(2),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the retry policy. `max_retries` is clamped to at least one attempt.
    pub fn with_retries(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries.max(1);
        self.retry_delay = retry_delay;
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n.max(1);
        self
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Client for a `transport.rest` departures API.
///
/// Uses a semaphore to limit concurrent requests, since the public
/// instances are rate limited.
#[derive(Debug, Clone)]
pub struct TransportClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
    max_retries: u32,
    retry_delay: Duration,
}

impl TransportClient {
    /// Create a new client with the given configuration.
    pub fn new(config: TransportConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
            max_retries: config.max_retries.max(1),
            retry_delay: config.retry_delay,
        })
    }

    /// Get upcoming departures at a stop.
    ///
    /// # Arguments
    ///
    /// * `station_id` - HAFAS stop id, e.g. "958956"
    /// * `within_minutes` - How far ahead to list departures
    pub async fn get_departures(
        &self,
        station_id: &str,
        within_minutes: u32,
    ) -> Result<Vec<DepartureRecord>, FetchError> {
        let url = format!("{}/stops/{}/departures", self.base_url, station_id);
        let query = [("duration", within_minutes.to_string())];

        let response: DeparturesResponse = self
            .with_retries(station_id, || self.get_json(&url, &query))
            .await?;

        Ok(convert_departures(&response))
    }

    /// Search stops by name.
    ///
    /// Used to find the station ids to put in the configuration.
    pub async fn locate(&self, query: &str, results: u8) -> Result<Vec<StationMatch>, FetchError> {
        let url = format!("{}/locations", self.base_url);
        let params = [
            ("query", query.to_string()),
            ("results", results.to_string()),
            ("poi", "false".to_string()),
            ("addresses", "false".to_string()),
        ];

        let locations: Vec<LocationDto> = self
            .with_retries(query, || self.get_json(&url, &params))
            .await?;

        Ok(convert_locations(locations))
    }

    /// Run `request` until it succeeds, fails permanently, or attempts run out.
    async fn with_retries<T, F, Fut>(&self, label: &str, mut request: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut attempt = 1;
        loop {
            match request().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    warn!(
                        target_id = label,
                        attempt,
                        max_attempts = self.max_retries,
                        error = %e,
                        "request failed, retrying in {:?}",
                        self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Perform one GET and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| FetchError::HttpStatus {
                status: 0,
                message: "request limiter closed".to_string(),
            })?;

        debug!(url, "GET");
        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| FetchError::MalformedResponse {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

impl DeparturesSource for TransportClient {
    fn fetch_departures(
        &self,
        station_id: &str,
        within_minutes: u32,
    ) -> impl Future<Output = Result<Vec<DepartureRecord>, FetchError>> + Send {
        self.get_departures(station_id, within_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = TransportConfig::new("http://localhost:8080")
            .with_timeout(5)
            .with_retries(5, Duration::from_millis(500))
            .with_max_concurrent(4);

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_delay, Duration::from_millis(500));
        assert_eq!(config.max_concurrent, 4);
    }

    #[test]
    fn config_defaults() {
        let config = TransportConfig::default();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay, Duration::from_secs(2));
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
    }

    #[test]
    fn retries_are_at_least_one_attempt() {
        let config = TransportConfig::default().with_retries(0, Duration::ZERO);
        assert_eq!(config.max_retries, 1);
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = TransportClient::new(TransportConfig::new("http://localhost:8080/")).unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_errors_then_succeeds() {
        let client = TransportClient::new(
            TransportConfig::default().with_retries(3, Duration::from_secs(2)),
        )
        .unwrap();

        let mut calls = 0;
        let result: Result<u32, FetchError> = client
            .with_retries("test", || {
                calls += 1;
                let n = calls;
                async move {
                    if n < 3 {
                        Err(FetchError::RateLimited)
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let client = TransportClient::new(
            TransportConfig::default().with_retries(2, Duration::from_secs(2)),
        )
        .unwrap();

        let mut calls = 0;
        let result: Result<(), FetchError> = client
            .with_retries("test", || {
                calls += 1;
                async { Err(FetchError::RateLimited) }
            })
            .await;

        assert!(matches!(result, Err(FetchError::RateLimited)));
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let client = TransportClient::new(TransportConfig::default()).unwrap();

        let mut calls = 0;
        let result: Result<(), FetchError> = client
            .with_retries("test", || {
                calls += 1;
                async {
                    Err(FetchError::HttpStatus {
                        status: 404,
                        message: "unknown stop".into(),
                    })
                }
            })
            .await;

        assert!(matches!(result, Err(FetchError::HttpStatus { status: 404, .. })));
        assert_eq!(calls, 1);
    }

    // Requests against the live API would go here, but they depend on the
    // network and the public instance's rate limit. They should be marked
    // with #[ignore] and run separately.
}
