//! Error types for waymark.

use thiserror::Error;

/// Result type alias using waymark's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for waymark operations.
///
/// Proximity search compilation only surfaces [`Error::Config`] to callers.
/// Every other invalid input is corrected or degraded in place.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Search template is misconfigured (e.g. reverse radius on a non-number field)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Geocoding lookup failed
    #[error("Geocoding error: {0}")]
    Geocoding(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
