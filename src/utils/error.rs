//! Error types for the stormtrack crawler
//!
//! This module defines custom error types used throughout the application.

use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status code
    #[error("Server returned status {0}")]
    Status(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Content decoding error
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Could not persist a downloaded product
    #[error("Failed to save product: {0}")]
    Write(#[from] StorageError),
}

impl FetchError {
    /// Transport failures are worth another attempt on the next run,
    /// a malformed URL never is.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidUrl(_) | Self::Decode(_))
    }
}

/// Errors that can occur during parsing operations
#[derive(Error, Debug)]
pub enum ParseError {
    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Errors raised while reading or writing local artifacts
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem error
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV encoding or decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StorageError {
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
