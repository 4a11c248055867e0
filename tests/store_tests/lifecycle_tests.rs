//! Tests for SqliteStore lifecycle
//!
//! These tests verify:
//! - Opening creates the database file and both tables
//! - Reopening a populated database keeps its data
//! - Connection option defaults and explicit options
//! - Read-only mode (query_only and mode=ro)
//! - Schema creation failure rolls back
//! - Close is idempotent

use std::path::PathBuf;

use atlaslog::{AtlasError, Config, Log, LogStore, SqliteStore, StableStore};
use rusqlite::Connection;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn temp_db_path() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("raft.db");
    (temp_dir, path)
}

fn location(path: &PathBuf) -> String {
    path.to_string_lossy().into_owned()
}

fn test_log(index: u64, data: &str) -> Log {
    Log::new(index, 1, data.as_bytes().to_vec())
}

fn table_exists(conn: &Connection, name: &str) -> bool {
    let count: i64 = conn
        .query_row(
            "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )
        .unwrap();
    count == 1
}

fn journal_mode(path: &PathBuf) -> String {
    let conn = Connection::open(path).unwrap();
    conn.pragma_query_value(None, "journal_mode", |row| row.get::<_, String>(0))
        .unwrap()
        .to_lowercase()
}

// =============================================================================
// Open/Create Tests
// =============================================================================

#[test]
fn test_open_creates_file_and_tables() {
    let (_temp, path) = temp_db_path();
    assert!(!path.exists());

    let store = SqliteStore::open_path(location(&path)).unwrap();
    assert!(path.exists());
    assert!(!store.is_read_only());
    store.close().unwrap();

    let conn = Connection::open(&path).unwrap();
    assert!(table_exists(&conn, "logs"));
    assert!(table_exists(&conn, "conf"));

    let logs: i64 = conn
        .query_row("SELECT count(*) FROM logs", [], |row| row.get(0))
        .unwrap();
    let conf: i64 = conn
        .query_row("SELECT count(*) FROM conf", [], |row| row.get(0))
        .unwrap();
    assert_eq!(logs, 0);
    assert_eq!(conf, 0);
}

#[test]
fn test_open_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("node1").join("raft").join("raft.db");

    let store = SqliteStore::open_path(location(&path)).unwrap();
    store.store_log(&test_log(1, "log1")).unwrap();

    assert!(path.exists());
}

#[test]
fn test_in_memory_store() {
    let store = SqliteStore::open_path(":memory:").unwrap();

    store.store_log(&test_log(1, "log1")).unwrap();
    store.set_u64(b"term", 2).unwrap();

    assert_eq!(store.get_log(1).unwrap(), test_log(1, "log1"));
    assert_eq!(store.get_u64(b"term").unwrap(), 2);
}

#[test]
fn test_reopen_populated_database() {
    let (_temp, path) = temp_db_path();

    {
        let store = SqliteStore::open_path(location(&path)).unwrap();
        store
            .store_logs(&[test_log(1, "log1"), test_log(2, "log2")])
            .unwrap();
        store.set_u64(b"CurrentTerm", 7).unwrap();
        store.close().unwrap();
    }

    {
        let store = SqliteStore::open_path(location(&path)).unwrap();
        assert_eq!(store.first_index().unwrap(), 1);
        assert_eq!(store.last_index().unwrap(), 2);
        assert_eq!(store.get_log(2).unwrap(), test_log(2, "log2"));
        assert_eq!(store.get_u64(b"CurrentTerm").unwrap(), 7);
    }
}

#[test]
fn test_default_options_enable_wal() {
    let (_temp, path) = temp_db_path();

    let store = SqliteStore::open_path(location(&path)).unwrap();
    store.close().unwrap();

    assert_eq!(journal_mode(&path), "wal");
}

#[test]
fn test_explicit_options_skip_defaults() {
    let (_temp, path) = temp_db_path();

    let store = SqliteStore::open_path(format!("{}?_busy_timeout=100", location(&path))).unwrap();
    store.close().unwrap();

    assert_eq!(journal_mode(&path), "delete");
}

#[test]
fn test_custom_table_names() {
    let (_temp, path) = temp_db_path();

    let config = Config::builder()
        .location(location(&path))
        .log_table("raft_log")
        .conf_table("raft_conf")
        .build();
    let store = SqliteStore::open(config).unwrap();
    store.store_log(&test_log(1, "log1")).unwrap();
    store.set(b"k", b"v").unwrap();
    store.close().unwrap();

    let conn = Connection::open(&path).unwrap();
    assert!(table_exists(&conn, "raft_log"));
    assert!(table_exists(&conn, "raft_conf"));
    assert!(!table_exists(&conn, "logs"));
    assert!(!table_exists(&conn, "conf"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let (_temp, path) = temp_db_path();

    let config = Config::builder()
        .location(location(&path))
        .log_table("logs; DROP TABLE conf")
        .build();
    let result = SqliteStore::open(config);

    assert!(matches!(result, Err(AtlasError::Config(_))));
    assert!(!path.exists());
}

#[test]
fn test_open_missing_file_in_rw_mode_fails() {
    let (_temp, path) = temp_db_path();

    let result = SqliteStore::open_path(format!("{}?mode=rw", location(&path)));

    assert!(matches!(result, Err(AtlasError::Sqlite(_))));
}

// =============================================================================
// Schema Failure Tests
// =============================================================================

#[test]
fn test_schema_failure_rolls_back() {
    let (_temp, path) = temp_db_path();

    // An index named "conf" blocks creation of the conf table
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE other(x); CREATE INDEX conf ON other(x);")
            .unwrap();
    }

    let result = SqliteStore::open_path(location(&path));
    assert!(matches!(result, Err(AtlasError::Sqlite(_))));

    // The logs table created earlier in the same transaction is gone
    let conn = Connection::open(&path).unwrap();
    assert!(!table_exists(&conn, "logs"));
    assert!(table_exists(&conn, "other"));
}

// =============================================================================
// Read-Only Tests
// =============================================================================

#[test]
fn test_read_only_reads_what_writer_wrote() {
    let (_temp, path) = temp_db_path();
    let log = test_log(1, "log1");

    let store = SqliteStore::open_path(location(&path)).unwrap();
    store.store_log(&log).unwrap();
    store.set(b"hello", b"world").unwrap();
    store.close().unwrap();

    let ro_store = SqliteStore::open_path(format!("{}?_query_only=true", location(&path))).unwrap();
    assert!(ro_store.is_read_only());

    assert_eq!(ro_store.get_log(1).unwrap(), log);
    assert_eq!(ro_store.get(b"hello").unwrap(), b"world".to_vec());
    assert_eq!(ro_store.first_index().unwrap(), 1);
    assert_eq!(ro_store.last_index().unwrap(), 1);
}

#[test]
fn test_read_only_rejects_writes() {
    let (_temp, path) = temp_db_path();
    let log = test_log(1, "log1");

    let store = SqliteStore::open_path(location(&path)).unwrap();
    store.store_log(&log).unwrap();
    store.set_u64(b"term", 3).unwrap();
    store.close().unwrap();

    let ro_store = SqliteStore::open_path(format!("{}?_query_only=1", location(&path))).unwrap();

    assert!(matches!(ro_store.store_log(&test_log(2, "log2")), Err(AtlasError::ReadOnly)));
    assert!(matches!(ro_store.store_log(&log), Err(AtlasError::ReadOnly)));
    assert!(matches!(ro_store.delete_range(1, 1), Err(AtlasError::ReadOnly)));
    assert!(matches!(ro_store.set(b"k", b"v"), Err(AtlasError::ReadOnly)));
    assert!(matches!(ro_store.set_u64(b"term", 4), Err(AtlasError::ReadOnly)));

    // Data unchanged
    assert_eq!(ro_store.get_log(1).unwrap(), log);
    assert_eq!(ro_store.last_index().unwrap(), 1);
    assert!(matches!(ro_store.get(b"k"), Err(AtlasError::KeyNotFound)));
    assert_eq!(ro_store.get_u64(b"term").unwrap(), 3);
}

#[test]
fn test_read_only_skips_schema_creation() {
    let (_temp, path) = temp_db_path();

    let store = SqliteStore::open_path(format!("{}?_query_only=true", location(&path))).unwrap();
    assert!(store.is_read_only());

    // No tables to read from
    assert!(matches!(store.first_index(), Err(AtlasError::Sqlite(_))));
    store.close().unwrap();

    let conn = Connection::open(&path).unwrap();
    assert!(!table_exists(&conn, "logs"));
    assert!(!table_exists(&conn, "conf"));
}

#[test]
fn test_mode_ro_is_read_only() {
    let (_temp, path) = temp_db_path();

    let store = SqliteStore::open_path(location(&path)).unwrap();
    store.store_log(&test_log(1, "log1")).unwrap();
    store.close().unwrap();

    let ro_store = SqliteStore::open_path(format!("{}?mode=ro", location(&path))).unwrap();
    assert!(ro_store.is_read_only());
    assert_eq!(ro_store.get_log(1).unwrap(), test_log(1, "log1"));
    assert!(matches!(ro_store.store_log(&test_log(2, "log2")), Err(AtlasError::ReadOnly)));
}

// =============================================================================
// Close Tests
// =============================================================================

#[test]
fn test_close_is_idempotent() {
    let (_temp, path) = temp_db_path();
    let store = SqliteStore::open_path(location(&path)).unwrap();

    assert!(!store.is_closed());
    store.close().unwrap();
    assert!(store.is_closed());
    store.close().unwrap();
    store.close().unwrap();
}

#[test]
fn test_operations_after_close_fail() {
    let (_temp, path) = temp_db_path();
    let store = SqliteStore::open_path(location(&path)).unwrap();
    store.close().unwrap();

    assert!(matches!(store.first_index(), Err(AtlasError::Closed)));
    assert!(matches!(store.last_index(), Err(AtlasError::Closed)));
    assert!(matches!(store.get_log(1), Err(AtlasError::Closed)));
    assert!(matches!(store.store_log(&test_log(1, "log1")), Err(AtlasError::Closed)));
    assert!(matches!(store.delete_range(1, 10), Err(AtlasError::Closed)));
    assert!(matches!(store.set(b"k", b"v"), Err(AtlasError::Closed)));
    assert!(matches!(store.get(b"k"), Err(AtlasError::Closed)));
}

#[test]
fn test_accessors() {
    let (_temp, path) = temp_db_path();
    let store = SqliteStore::open_path(format!("{}?_busy_timeout=10", location(&path))).unwrap();

    assert_eq!(store.path(), location(&path));
    assert_eq!(store.config().log_table, "logs");
    assert_eq!(store.config().conf_table, "conf");
    assert!(format!("{:?}", store).contains("SqliteStore"));
}
