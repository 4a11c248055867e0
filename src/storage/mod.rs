//! Storage Module
//!
//! SQLite-backed log store and stable (key/value) store.
//!
//! ## Responsibilities
//! - Own the database connection and create the schema
//! - Append, look up and range-delete log entries by index
//! - Persist small durable facts (term, vote) by key
//! - Absorb lock contention on log writes via `BusyRetry`
//!
//! ## Table Layout
//! ```text
//! logs                                 conf
//! ┌──────────────────┬────────────┐    ┌──────────────────┬────────────┐
//! │ id INTEGER (PK)  │ value BLOB │    │ id BLOB (PK)     │ value BLOB │
//! ├──────────────────┼────────────┤    ├──────────────────┼────────────┤
//! │ 1                │ bincode(L1)│    │ "CurrentTerm"    │ u64 BE     │
//! │ 2                │ bincode(L2)│    │ "LastVoteCand"   │ bytes      │
//! │ ...              │ ...        │    │ ...              │ ...        │
//! └──────────────────┴────────────┘    └──────────────────┴────────────┘
//! ```
//! Both tables are ordered by their primary key b-tree, so first/last index
//! are single index seeks.

mod logs;
mod schema;
mod stable;
mod store;

pub use store::SqliteStore;

use crate::entry::Log;
use crate::error::Result;

/// Ordered, index-addressed log storage consumed by a consensus module
pub trait LogStore {
    /// Smallest stored index, 0 when the log is empty
    fn first_index(&self) -> Result<u64>;

    /// Largest stored index, 0 when the log is empty
    fn last_index(&self) -> Result<u64>;

    /// Entry at `index`, or `AtlasError::LogNotFound`
    fn get_log(&self, index: u64) -> Result<Log>;

    /// Append one entry
    fn store_log(&self, log: &Log) -> Result<()>;

    /// Append entries atomically: all become visible or none do
    fn store_logs(&self, logs: &[Log]) -> Result<()>;

    /// Remove every entry with an index in `[min, max]`
    fn delete_range(&self, min: u64, max: u64) -> Result<()>;
}

/// Durable key/value storage for facts kept outside the log
pub trait StableStore {
    /// Insert or replace a value
    fn set(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Value for `key`, or `AtlasError::KeyNotFound`
    fn get(&self, key: &[u8]) -> Result<Vec<u8>>;

    /// `set` with an 8-byte big-endian value
    fn set_u64(&self, key: &[u8], value: u64) -> Result<()>;

    /// `get` decoded as a big-endian u64
    fn get_u64(&self, key: &[u8]) -> Result<u64>;
}
