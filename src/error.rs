//! Crate-level error type
//!
//! Fetch, parse and storage failures keep their own enums in
//! [`crate::utils::error`]; [`Error`] wraps them for callers that cross
//! module boundaries, such as [`ArchiveCrawler::new`](crate::crawler::ArchiveCrawler::new).
//!
//! # Usage
//!
//! ```rust,ignore
//! use stormtrack::error::{Error, ErrorCategory};
//!
//! fn handle_error(err: Error) {
//!     if err.is_recoverable() {
//!         tracing::warn!(error = %err, "Skipping, will retry on next run");
//!     } else {
//!         eprintln!("Fatal error: {err}");
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

pub use crate::utils::error::{FetchError, ParseError, StorageError};

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, status)
    Network,
    /// Parsing and data extraction errors
    Parsing,
    /// Storage and I/O errors
    Storage,
    /// Configuration and validation errors
    Config,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::Storage => "storage",
            Self::Config => "config",
        };
        f.write_str(label)
    }
}

/// Unified error type for the stormtrack crate
#[derive(Error, Debug)]
pub enum Error {
    /// Fetch-specific errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Parse-specific errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Local artifact errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if this error is recoverable (a later run may succeed)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Parse(_) => false,
            Self::Storage(_) => false,
            Self::Io(_) => true,
            Self::Config(_) => false,
        }
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(FetchError::Write(_)) => ErrorCategory::Storage,
            Self::Fetch(_) => ErrorCategory::Network,
            Self::Parse(_) => ErrorCategory::Parsing,
            Self::Storage(_) | Self::Io(_) => ErrorCategory::Storage,
            Self::Config(_) => ErrorCategory::Config,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
