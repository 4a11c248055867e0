//! SQLite Store
//!
//! Owns the database handle and its lifecycle.
//!
//! ## Responsibilities
//! - Parse the location, apply connection options
//! - Detect read-only handles
//! - Create the schema on writable handles
//! - Hand the connection to the log and stable store paths
//! - Close cleanly (idempotent)

use std::fs;
use std::path::Path;
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::Connection;

use crate::config::{Config, DataSource, OpenMode};
use crate::error::{AtlasError, Result};
use crate::retry::BusyRetry;

use super::schema::{self, Statements};

/// SQLite-backed `LogStore` + `StableStore`
///
/// ## Concurrency:
/// - `conn`: one connection behind a Mutex; each method holds it for one
///   statement or one transaction, never across calls
/// - Contention from other connections to the same file surfaces as
///   `AtlasError::Busy`; log writes retry it, everything else returns it
/// - `None` once closed
pub struct SqliteStore {
    /// Store configuration
    config: Config,

    /// Parsed location
    source: DataSource,

    /// Database connection (`None` after close)
    conn: Mutex<Option<Connection>>,

    /// Opened with `_query_only` or `mode=ro`
    read_only: bool,

    /// Retry policy for log writes
    retry: BusyRetry,

    /// SQL bound to the configured table names
    sql: Statements,
}

impl SqliteStore {
    /// Open or create a store with the given config
    ///
    /// On open:
    /// 1. Validate config and parse the location (defaults injected)
    /// 2. Create the parent directory, open the connection, apply options
    /// 3. Detect read-only mode
    /// 4. Create tables if writable
    pub fn open(config: Config) -> Result<Self> {
        // Step 1: Validate and parse
        config.validate()?;
        let source = DataSource::parse(&config.location)?;

        // Step 2: Open and configure the connection
        if source.mode == OpenMode::ReadWriteCreate {
            Self::create_parent_dir(&source.path)?;
        }
        let mut conn = Connection::open_with_flags(&source.path, source.mode.flags())?;
        Self::configure_connection(&conn, &source)?;

        // Step 3: Read-only handles skip schema creation
        let read_only = Self::detect_read_only(&conn, &source)?;

        // Step 4: Create tables (the connection is dropped, and closed, on error)
        let sql = Statements::new(&config.log_table, &config.conf_table);
        if !read_only {
            schema::initialize(&mut conn, &sql)?;
        }

        tracing::info!(
            "Opened store at {} (read_only={})",
            source.path,
            read_only
        );

        Ok(Self {
            retry: BusyRetry::new(config.busy_retry_delay),
            config,
            source,
            conn: Mutex::new(Some(conn)),
            read_only,
            sql,
        })
    }

    /// Open with a location (convenience method)
    ///
    /// Uses default config with the specified data-source string
    pub fn open_path(location: impl Into<String>) -> Result<Self> {
        Self::open(Config::builder().location(location).build())
    }

    /// Close the connection
    ///
    /// Closing an already closed store is a no-op.
    pub fn close(&self) -> Result<()> {
        let conn = match self.conn.lock().take() {
            Some(conn) => conn,
            None => return Ok(()),
        };

        conn.close().map_err(|(_, e)| AtlasError::from(e))?;
        tracing::info!("Closed store at {}", self.source.path);
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the database file path (location without options)
    pub fn path(&self) -> &str {
        &self.source.path
    }

    /// Whether writes are rejected
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.conn.lock().is_none()
    }

    // =========================================================================
    // Crate Helpers
    // =========================================================================

    /// Run `f` with the connection locked
    pub(super) fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut guard = self.conn.lock();
        let conn = guard.as_mut().ok_or(AtlasError::Closed)?;
        f(conn)
    }

    /// Reject writes on a read-only store before they reach SQLite
    pub(super) fn ensure_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(AtlasError::ReadOnly);
        }
        Ok(())
    }

    pub(super) fn retry(&self) -> &BusyRetry {
        &self.retry
    }

    pub(super) fn sql(&self) -> &Statements {
        &self.sql
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Create the directory holding the database file if it is missing
    fn create_parent_dir(path: &str) -> Result<()> {
        if path == ":memory:" {
            return Ok(());
        }
        match Path::new(path).parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent)?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Apply busy timeout, journal mode, synchronous and query-only, in that order
    fn configure_connection(conn: &Connection, source: &DataSource) -> Result<()> {
        if let Some(ms) = source.busy_timeout_ms {
            conn.busy_timeout(Duration::from_millis(ms))?;
        }

        if let Some(mode) = &source.journal_mode {
            // Returns the mode actually in effect; a read-only file keeps its own.
            let active: String = conn.pragma_update_and_check(
                None,
                "journal_mode",
                mode.as_str(),
                |row| row.get(0),
            )?;
            if !active.eq_ignore_ascii_case(mode) {
                tracing::debug!("Requested journal_mode {}, active {}", mode, active);
            }
        }

        if let Some(level) = &source.synchronous {
            conn.pragma_update(None, "synchronous", level.as_str())?;
        }

        if let Some(query_only) = source.query_only {
            conn.pragma_update(None, "query_only", query_only)?;
        }

        Ok(())
    }

    /// Ask SQLite whether the handle is query-only
    fn detect_read_only(conn: &Connection, source: &DataSource) -> Result<bool> {
        let query_only: bool = conn.pragma_query_value(None, "query_only", |row| row.get(0))?;
        Ok(query_only || source.mode == OpenMode::ReadOnly)
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.source.path)
            .field("read_only", &self.read_only)
            .field("closed", &self.is_closed())
            .finish()
    }
}
