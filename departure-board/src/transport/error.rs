//! Fetch error types.

/// Errors from fetching departures.
///
/// Fetch errors are scoped to one category's poll: the previous cached
/// data stays in place and the next slow tick tries again.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed (connection refused, timeout, etc.)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// API returned a non-success status code
    #[error("HTTP status {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// Rate limited by the API
    #[error("rate limited by departures API")]
    RateLimited,

    /// Response body could not be parsed
    #[error("malformed response: {message}")]
    MalformedResponse {
        message: String,
        body: Option<String>,
    },
}

impl FetchError {
    /// Whether retrying the same request may succeed.
    ///
    /// Network failures, rate limiting and server errors are transient;
    /// client errors and unparseable bodies are not.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Network(_) | FetchError::RateLimited => true,
            FetchError::HttpStatus { status, .. } => *status >= 500,
            FetchError::MalformedResponse { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FetchError::HttpStatus {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert_eq!(err.to_string(), "HTTP status 503: Service Unavailable");

        let err = FetchError::MalformedResponse {
            message: "expected value".into(),
            body: Some("<html>".into()),
        };
        assert_eq!(err.to_string(), "malformed response: expected value");

        assert_eq!(
            FetchError::RateLimited.to_string(),
            "rate limited by departures API"
        );
    }

    #[test]
    fn transient_classification() {
        assert!(FetchError::RateLimited.is_transient());
        assert!(
            FetchError::HttpStatus {
                status: 502,
                message: String::new()
            }
            .is_transient()
        );
        assert!(
            !FetchError::HttpStatus {
                status: 404,
                message: String::new()
            }
            .is_transient()
        );
        assert!(
            !FetchError::MalformedResponse {
                message: String::new(),
                body: None
            }
            .is_transient()
        );
    }
}
