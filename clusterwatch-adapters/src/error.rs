//! Error types for adapters.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when talking to a management API.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The server answered with a status other than 200 or 201.
    #[error("({method}) HTTP error {status} for {url}")]
    HttpStatus {
        method: String,
        url: String,
        status: u16,
    },

    /// The body was not the JSON we expected.
    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    /// Authentication failed or the token was rejected.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The flow tree went deeper than the configured limit.
    #[error("Process group {id} is deeper than the maximum walk depth of {max_depth}")]
    DepthExceeded { id: String, max_depth: usize },

    /// An asynchronous query did not finish in time.
    #[error("Query {id} did not finish after {waited:?}")]
    PollTimeout { id: String, waited: Duration },

    /// The operation was cancelled by the caller.
    #[error("Operation cancelled")]
    Cancelled,

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// Any other transport failure.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The endpoint is not an absolute http(s) URL.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The TLS trust configuration could not be loaded.
    #[error("TLS configuration error: {0}")]
    Tls(String),
}

impl AdapterError {
    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            AdapterError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the credentials or token were refused.
    ///
    /// Callers holding a cached token should drop it and fetch a new one.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, AdapterError::Auth(_)) || matches!(self.status(), Some(401 | 403))
    }
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdapterError::Timeout
        } else if err.is_connect() {
            AdapterError::Connection(err.to_string())
        } else if err.is_decode() {
            AdapterError::Decode {
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
                message: err.to_string(),
            }
        } else {
            AdapterError::Http(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_message() {
        let err = AdapterError::HttpStatus {
            method: "GET".to_string(),
            url: "https://ambari:8443/api/v1/clusters".to_string(),
            status: 503,
        };
        assert_eq!(
            err.to_string(),
            "(GET) HTTP error 503 for https://ambari:8443/api/v1/clusters"
        );
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn test_auth_failure_detection() {
        let unauthorized = AdapterError::HttpStatus {
            method: "GET".to_string(),
            url: "u".to_string(),
            status: 401,
        };
        let forbidden = AdapterError::HttpStatus {
            method: "GET".to_string(),
            url: "u".to_string(),
            status: 403,
        };
        let missing = AdapterError::HttpStatus {
            method: "GET".to_string(),
            url: "u".to_string(),
            status: 404,
        };

        assert!(unauthorized.is_auth_failure());
        assert!(forbidden.is_auth_failure());
        assert!(!missing.is_auth_failure());
        assert!(AdapterError::Auth("expired".to_string()).is_auth_failure());
        assert!(!AdapterError::Timeout.is_auth_failure());
    }
}
