//! Error types for dropdeck-core

use thiserror::Error;

/// Resolver error type
#[derive(Debug, Error)]
pub enum Error {
    /// Backing store unreachable, query failed, or query timed out
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// Screen identifier is empty or blank
    #[error("invalid screen location: {0:?}")]
    InvalidScreen(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Whether the error comes from the backing store rather than the caller
    #[must_use]
    pub fn is_source_failure(&self) -> bool {
        matches!(self, Error::SourceUnavailable(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
