//! Error types for document stores.

use thiserror::Error;

/// Errors that can occur while reading or writing stored documents.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse a response or a stored document.
    #[error("Failed to parse document: {0}")]
    Parse(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The document does not exist.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// The document already exists or changed since it was read.
    #[error("Conflicting write: {0}")]
    Conflict(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),
}

impl From<reqwest::Error> for ArchiveError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ArchiveError::Timeout
        } else if err.is_connect() {
            ArchiveError::Connection(err.to_string())
        } else {
            ArchiveError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ArchiveError {
    fn from(err: serde_json::Error) -> Self {
        ArchiveError::Parse(err.to_string())
    }
}
