//! Configuration for AtlasLog
//!
//! Centralized configuration with sensible defaults, plus parsing of the
//! data-source string that locates the SQLite file.
//!
//! ## Data-source format
//! ```text
//! [file:]<path>[?key=value(&key=value)*]
//! ```
//! A location without `?` gets the defaults
//! `_busy_timeout=30000&_journal_mode=WAL`. A location with `?` uses only
//! the options it names.

use std::time::Duration;

use rusqlite::OpenFlags;

use crate::error::{AtlasError, Result};

/// Options injected when the location carries none
pub const DEFAULT_OPTIONS: &str = "_busy_timeout=30000&_journal_mode=WAL";

/// Keys per delete sub-batch
pub const DEFAULT_DELETE_BATCH_SIZE: u64 = 999;

/// Sleep between attempts of a contended write
pub const DEFAULT_BUSY_RETRY_DELAY: Duration = Duration::from_millis(250);

/// Main configuration for an AtlasLog store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Data-source string: SQLite file path plus optional `?` options
    pub location: String,

    /// Table holding log entries
    pub log_table: String,

    /// Table holding key/value facts
    pub conf_table: String,

    // -------------------------------------------------------------------------
    // Write Path Configuration
    // -------------------------------------------------------------------------
    /// Max consecutive indices removed per delete transaction
    pub delete_batch_size: u64,

    /// Delay before re-running a write that hit lock contention
    pub busy_retry_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            location: "./atlaslog.db".to_string(),
            log_table: "logs".to_string(),
            conf_table: "conf".to_string(),
            delete_batch_size: DEFAULT_DELETE_BATCH_SIZE,
            busy_retry_delay: DEFAULT_BUSY_RETRY_DELAY,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check table names and batch size before they reach SQL
    pub fn validate(&self) -> Result<()> {
        for name in [&self.log_table, &self.conf_table] {
            if !is_identifier(name) {
                return Err(AtlasError::Config(format!(
                    "invalid table name: {:?}",
                    name
                )));
            }
        }
        if self.log_table.eq_ignore_ascii_case(&self.conf_table) {
            return Err(AtlasError::Config(format!(
                "log and conf tables must differ (both {:?})",
                self.log_table
            )));
        }
        if self.delete_batch_size == 0 {
            return Err(AtlasError::Config(
                "delete_batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data-source string (path plus optional `?` options)
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.config.location = location.into();
        self
    }

    /// Set the log table name
    pub fn log_table(mut self, name: impl Into<String>) -> Self {
        self.config.log_table = name.into();
        self
    }

    /// Set the key/value table name
    pub fn conf_table(mut self, name: impl Into<String>) -> Self {
        self.config.conf_table = name.into();
        self
    }

    /// Set the number of indices removed per delete transaction
    pub fn delete_batch_size(mut self, size: u64) -> Self {
        self.config.delete_batch_size = size;
        self
    }

    /// Set the delay between attempts of a contended write
    pub fn busy_retry_delay(mut self, delay: Duration) -> Self {
        self.config.busy_retry_delay = delay;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// =============================================================================
// Data Source Parsing
// =============================================================================

/// How the SQLite file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// `mode=ro`
    ReadOnly,
    /// `mode=rw`: the file must already exist
    ReadWrite,
    /// `mode=rwc` (default)
    #[default]
    ReadWriteCreate,
}

impl OpenMode {
    pub fn flags(self) -> OpenFlags {
        let base = OpenFlags::SQLITE_OPEN_NO_MUTEX;
        match self {
            OpenMode::ReadOnly => base | OpenFlags::SQLITE_OPEN_READ_ONLY,
            OpenMode::ReadWrite => base | OpenFlags::SQLITE_OPEN_READ_WRITE,
            OpenMode::ReadWriteCreate => {
                base | OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
            }
        }
    }
}

/// A parsed data-source string
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataSource {
    /// File path handed to SQLite
    pub path: String,

    /// `_busy_timeout` in milliseconds
    pub busy_timeout_ms: Option<u64>,

    /// `_journal_mode`, upper-cased
    pub journal_mode: Option<String>,

    /// `_synchronous`, upper-cased
    pub synchronous: Option<String>,

    /// `_query_only`
    pub query_only: Option<bool>,

    /// `mode`
    pub mode: OpenMode,
}

impl DataSource {
    /// Parse a data-source string, injecting defaults when it has no options
    pub fn parse(location: &str) -> Result<Self> {
        let location = location.strip_prefix("file:").unwrap_or(location);
        let (path, query) = match location.split_once('?') {
            Some((path, query)) => (path, query),
            None => (location, DEFAULT_OPTIONS),
        };

        if path.is_empty() {
            return Err(AtlasError::Config("empty database path".to_string()));
        }

        let mut source = DataSource {
            path: path.to_string(),
            ..Default::default()
        };

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "_busy_timeout" | "_timeout" => {
                    let ms = value.parse::<u64>().map_err(|_| {
                        AtlasError::Config(format!("invalid {}: {:?}", key, value))
                    })?;
                    source.busy_timeout_ms = Some(ms);
                }
                "_journal_mode" | "_journal" => {
                    let mode = value.to_ascii_uppercase();
                    if !matches!(
                        mode.as_str(),
                        "DELETE" | "TRUNCATE" | "PERSIST" | "MEMORY" | "WAL" | "OFF"
                    ) {
                        return Err(AtlasError::Config(format!("invalid {}: {:?}", key, value)));
                    }
                    source.journal_mode = Some(mode);
                }
                "_synchronous" | "_sync" => {
                    let level = value.to_ascii_uppercase();
                    if !matches!(level.as_str(), "OFF" | "NORMAL" | "FULL" | "EXTRA") {
                        return Err(AtlasError::Config(format!("invalid {}: {:?}", key, value)));
                    }
                    source.synchronous = Some(level);
                }
                "_query_only" => {
                    source.query_only = Some(parse_bool(key, value)?);
                }
                "mode" => {
                    source.mode = match value {
                        "ro" => OpenMode::ReadOnly,
                        "rw" => OpenMode::ReadWrite,
                        "rwc" => OpenMode::ReadWriteCreate,
                        _ => {
                            return Err(AtlasError::Config(format!(
                                "invalid mode: {:?}",
                                value
                            )))
                        }
                    };
                }
                _ => {
                    tracing::warn!("Ignoring unknown connection option {:?}", key);
                }
            }
        }

        Ok(source)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AtlasError::Config(format!(
            "invalid boolean for {}: {:?}",
            key, value
        ))),
    }
}
