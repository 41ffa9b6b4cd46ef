//! Error types for qis-core

use thiserror::Error;

/// Main error type for qis-core
///
/// Every parse error aborts the whole document: a schedule with silently
/// dropped reservations is never returned.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed table: {0}")]
    MalformedTable(String),

    #[error("Malformed time label: {0:?}")]
    MalformedTimeLabel(String),

    #[error("Time axis overflow: continuing {hour:02}:{minute:02} by one slot passes the hour")]
    TimeAxisOverflow { hour: u32, minute: u32 },

    #[error("Invalid date header {text:?}: {source}")]
    DateParse {
        text: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for qis-core
pub type Result<T> = std::result::Result<T, Error>;
