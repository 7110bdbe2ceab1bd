//! Error types for the coachline engine

use thiserror::Error;

/// Result type alias for coachline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in coachline
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Profile form rejected at the boundary
    #[error("invalid profile: {0}")]
    Profile(String),

    /// Backend answered with a non-success status or an unexpected body
    #[error("backend error: {0}")]
    Backend(String),

    /// Backend did not answer within the configured timeout
    #[error("backend timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
