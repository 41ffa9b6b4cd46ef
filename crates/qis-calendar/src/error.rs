//! Error types for qis-calendar

use thiserror::Error;

/// qis-calendar error type
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Failed to write calendar to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CalendarError>;
