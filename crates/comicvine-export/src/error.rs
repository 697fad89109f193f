//! Error types for the Comic Vine client.

use crate::api::rate_tracker::Endpoint;
use crate::api::types::STATUS_RATE_LIMITED;
use reqwest::StatusCode;
use thiserror::Error;

/// Error type for Comic Vine operations
#[derive(Error, Debug)]
pub enum ComicVineError {
    /// Transport failure or undecodable body
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Server answered with a non-2xx status
    #[error("{endpoint} request failed with status {status}")]
    RemoteRequestFailed { endpoint: Endpoint, status: StatusCode },

    /// Server answered 2xx but reported an error in the response body
    #[error("Comic Vine API error {code}: {message}")]
    Api { code: i64, message: String },

    /// Search returned no volume
    #[error("No volume found matching '{0}'")]
    VolumeNotFound(String),
}

impl ComicVineError {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ComicVineError::RemoteRequestFailed { status, .. } => Some(*status),
            ComicVineError::Http(e) => e.status(),
            _ => None,
        }
    }

    /// Whether the server signalled throttling (HTTP 420/503 or API code 107)
    pub fn is_rate_limited(&self) -> bool {
        match self {
            ComicVineError::Api { code, .. } => *code == STATUS_RATE_LIMITED,
            _ => self
                .status()
                .is_some_and(|s| s.as_u16() == 420 || s == StatusCode::SERVICE_UNAVAILABLE),
        }
    }
}

/// Result type alias for Comic Vine operations
pub type Result<T> = std::result::Result<T, ComicVineError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(status: u16) -> ComicVineError {
        ComicVineError::RemoteRequestFailed {
            endpoint: Endpoint::Issue,
            status: StatusCode::from_u16(status).unwrap(),
        }
    }

    #[test]
    fn test_remote_request_failed_display() {
        assert_eq!(
            failed(404).to_string(),
            "/issue request failed with status 404 Not Found"
        );
    }

    #[test]
    fn test_throttling_statuses() {
        assert!(failed(420).is_rate_limited());
        assert!(failed(503).is_rate_limited());
        assert!(!failed(500).is_rate_limited());
        assert!(!failed(401).is_rate_limited());
    }

    #[test]
    fn test_api_rate_limit_code() {
        let error = ComicVineError::Api {
            code: 107,
            message: "Rate limit exceeded".to_string(),
        };
        assert!(error.is_rate_limited());
        assert_eq!(error.status(), None);

        let error = ComicVineError::Api {
            code: 100,
            message: "Invalid API Key".to_string(),
        };
        assert!(!error.is_rate_limited());
    }

    #[test]
    fn test_volume_not_found_display() {
        let error = ComicVineError::VolumeNotFound("Big Comic Spirits".to_string());
        assert_eq!(error.to_string(), "No volume found matching 'Big Comic Spirits'");
    }
}
