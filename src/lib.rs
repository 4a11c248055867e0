//! # AtlasLog
//!
//! A durable log store and stable store for consensus modules, backed by a
//! single SQLite file:
//! - Index-ordered log entries with atomic batch appends
//! - Range deletion in bounded batches to keep write locks short
//! - Key/value facts (term, vote) with u64 helpers
//! - Automatic retry of log writes under lock contention
//! - Read-only mode for tools that inspect a live log
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Consensus Module                          │
//! │            (LogStore / StableStore callers)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    SqliteStore                              │
//! │        (open / close, schema, read-only detection)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Log Store  │          │ Stable Store│
//!   │ (codec)     │          │  (u64 BE)   │
//!   └──────┬──────┘          └──────┬──────┘
//!          │                        │
//!          ▼                        │
//!   ┌─────────────┐                 │
//!   │  BusyRetry  │                 │
//!   └──────┬──────┘                 │
//!          └───────────┬────────────┘
//!                      ▼
//!               ┌─────────────┐
//!               │   SQLite    │
//!               │ logs / conf │
//!               └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use atlaslog::{Log, LogStore, SqliteStore, StableStore};
//!
//! let store = SqliteStore::open_path("/var/lib/node/raft.db")?;
//! store.store_logs(&[Log::new(1, 1, b"a".to_vec()), Log::new(2, 1, b"b".to_vec())])?;
//! assert_eq!(store.last_index()?, 2);
//!
//! store.set_u64(b"CurrentTerm", 1)?;
//! store.close()?;
//! # Ok::<(), atlaslog::AtlasError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod entry;
pub mod retry;
pub mod storage;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{AtlasError, Result};
pub use config::Config;
pub use entry::{Log, LogType};
pub use retry::BusyRetry;
pub use storage::{LogStore, SqliteStore, StableStore};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of AtlasLog
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
