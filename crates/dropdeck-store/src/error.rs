//! Error types for dropdeck-store

use thiserror::Error;

/// Store error type
#[derive(Debug, Error)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// Stored value could not be decoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Unsupported or malformed database URL
    #[error("invalid database url: {0}")]
    InvalidUrl(String),
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Error::Database(e.to_string())
    }
}

impl From<Error> for dropdeck_core::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::InvalidUrl(msg) => dropdeck_core::Error::Configuration(msg),
            other => dropdeck_core::Error::SourceUnavailable(other.to_string()),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
