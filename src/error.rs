//! Error types for the archive.

use thiserror::Error;

/// Main error type for archive operations
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The key/value backend refused a read or write (quota, disabled storage...)
    #[error("storage error: {0}")]
    Storage(String),

    /// Persisted JSON could not be encoded or decoded
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Record store carries a schema version newer than this build understands
    #[error("unsupported record store version {0}")]
    UnsupportedVersion(u32),

    /// Stored record document is neither a versioned envelope nor a legacy array
    #[error("unrecognised record store layout")]
    UnknownLayout,

    /// Requested day lies outside `[1, max_day]`
    #[error("day {day} is outside 1..={max_day}")]
    DayOutOfRange { day: u32, max_day: u32 },

    /// No answer word exists for the requested day
    #[error("no answer for day {0}")]
    NoAnswer(u32),
}

/// Result type alias for archive operations
pub type Result<T> = std::result::Result<T, ArchiveError>;
