//! Error types for the datastore module.

use thiserror::Error;

/// Errors returned by data store implementations.
///
/// These cover transport and protocol problems only. Application-level
/// outcomes such as "not found" or "forbidden" are reported through the
/// return values of the individual [`DataStore`](super::DataStore) calls.
#[derive(Debug, Error)]
pub enum DataStoreError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for DataStoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::ConnectionFailed(e.to_string())
        } else if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::ApiError(e.to_string())
        }
    }
}
