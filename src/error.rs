//! Error types
//!
//! Every handler operation returns [`Result`]. Errors from the transport are
//! surfaced unchanged; handlers never retry or reinterpret them.

use thiserror::Error;

/// Result type using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the registry client
#[derive(Debug, Error)]
pub enum Error {
    /// The request could not be built (bad URL, empty identifier, body encoding)
    #[error("failed to build request: {0}")]
    RequestConstruction(String),

    /// Network failure or timeout while talking to the API
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-2xx status
    #[error("API error [{status}]: {message}")]
    Api { status: u16, message: String },

    /// The response body did not match the expected schema
    #[error("failed to decode response: {message}")]
    Decode { message: String, body: String },

    /// Invalid configuration value
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status of an API error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the server reported that the resource does not exist
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// True for failures the transport may retry on idempotent requests
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Api { status, .. } => is_retryable_status(*status),
            Error::Transport(err) => err.is_connect() || err.is_timeout(),
            _ => false,
        }
    }
}

pub(crate) fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode {
            message: err.to_string(),
            body: String::new(),
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::RequestConstruction(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        let err = Error::Api {
            status: 404,
            message: "Registry not found".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_retryable_statuses() {
        for status in [429, 500, 502, 503, 504] {
            let err = Error::Api {
                status,
                message: String::new(),
            };
            assert!(err.is_retryable(), "{status} should be retryable");
        }

        let err = Error::Api {
            status: 400,
            message: String::new(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_non_api_errors_have_no_status() {
        let err = Error::RequestConstruction("empty id".to_string());
        assert_eq!(err.status(), None);
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("empty id"));
    }
}
