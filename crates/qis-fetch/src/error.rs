//! Error types for qis-fetch

use thiserror::Error;

/// qis-fetch error type
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Server returned {status} for {url}")]
    Transport { url: String, status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, FetchError>;
