//! Error types for AtlasLog
//!
//! Provides a unified error type for all operations.
//!
//! ## Taxonomy
//! - `LogNotFound` / `KeyNotFound`: sentinels for absent data. Callers
//!   branch on them with `matches!`, never on the message text.
//! - `Busy`: lock contention reported by SQLite. Retried on log writes.
//! - `ReadOnly`: a write against a store opened read-only.
//! - `Serialization`: a log entry failed to encode or decode.
//! - everything else: fatal, surfaced as-is.

use rusqlite::ErrorCode;
use thiserror::Error;

/// Result type alias using AtlasError
pub type Result<T> = std::result::Result<T, AtlasError>;

/// Unified error type for AtlasLog operations
#[derive(Debug, Error)]
pub enum AtlasError {
    // -------------------------------------------------------------------------
    // Lookup Sentinels
    // -------------------------------------------------------------------------
    #[error("log not found")]
    LogNotFound,

    #[error("key not found")]
    KeyNotFound,

    // -------------------------------------------------------------------------
    // Engine Errors
    // -------------------------------------------------------------------------
    /// SQLite reported `SQLITE_BUSY` or `SQLITE_LOCKED`
    #[error("database is locked: {0}")]
    Busy(#[source] rusqlite::Error),

    #[error("attempt to write a read-only database")]
    ReadOnly,

    #[error("SQLite error: {0}")]
    Sqlite(#[source] rusqlite::Error),

    #[error("log index {0} exceeds the SQLite INTEGER range")]
    IndexOutOfRange(u64),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Configuration / Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("store is closed")]
    Closed,
}

impl AtlasError {
    /// True for the `LogNotFound` and `KeyNotFound` sentinels
    pub fn is_not_found(&self) -> bool {
        matches!(self, AtlasError::LogNotFound | AtlasError::KeyNotFound)
    }

    /// True when the failure is lock contention and the operation may be re-run
    pub fn is_busy(&self) -> bool {
        matches!(self, AtlasError::Busy(_))
    }
}

impl From<rusqlite::Error> for AtlasError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
                AtlasError::Busy(err)
            }
            Some(ErrorCode::ReadOnly) => AtlasError::ReadOnly,
            _ => AtlasError::Sqlite(err),
        }
    }
}
