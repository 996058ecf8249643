//! Error types for data sources.

use thiserror::Error;

/// Errors that can occur while fetching a batch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Reading the underlying file or stream failed.
    #[error("Read error: {0}")]
    Read(String),

    /// The payload was not a usable row document.
    #[error("Parse error: {0}")]
    Parse(String),

    /// HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Timeout waiting for the source.
    #[error("Request timed out")]
    Timeout,

    /// Could not connect to the source.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The producing side has gone away.
    #[error("Source disconnected")]
    Disconnected,
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        FetchError::Read(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Connection(err.to_string())
        } else if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else {
            FetchError::Http(err.to_string())
        }
    }
}
