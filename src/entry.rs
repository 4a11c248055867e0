//! Log entry definitions
//!
//! Defines the structure of individual replicated log entries.

use serde::{Deserialize, Serialize};

/// A single entry in the replicated log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// Position in the log. Stored as the table's primary key.
    pub index: u64,

    /// Election term the entry was created in
    pub term: u64,

    /// Kind of entry
    pub log_type: LogType,

    /// Opaque payload
    pub data: Vec<u8>,

    /// Opaque extension data carried alongside the payload
    pub extensions: Vec<u8>,

    /// Timestamp (unix millis) when the leader appended the entry, 0 if unset
    pub appended_at: u64,
}

/// Kinds of log entry a consensus module writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LogType {
    /// Application command
    #[default]
    Command,

    /// Leader's no-op entry at the start of a term
    Noop,

    /// Barrier that waits for prior entries to apply
    Barrier,

    /// Cluster membership change
    Configuration,
}

impl Log {
    /// Create a command entry
    pub fn new(index: u64, term: u64, data: impl Into<Vec<u8>>) -> Self {
        Self {
            index,
            term,
            log_type: LogType::Command,
            data: data.into(),
            extensions: Vec::new(),
            appended_at: 0,
        }
    }

    /// Set the entry kind
    pub fn with_type(mut self, log_type: LogType) -> Self {
        self.log_type = log_type;
        self
    }

    /// Attach extension bytes
    pub fn with_extensions(mut self, extensions: impl Into<Vec<u8>>) -> Self {
        self.extensions = extensions.into();
        self
    }

    /// Set the append timestamp
    pub fn with_appended_at(mut self, unix_millis: u64) -> Self {
        self.appended_at = unix_millis;
        self
    }
}
