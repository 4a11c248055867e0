//! Stable Store
//!
//! Opaque key/value facts on the `conf` table.
//!
//! `set` is a single `REPLACE INTO` and is not wrapped in `BusyRetry`;
//! neither are reads. Callers that need contention handling on this path
//! retry themselves.

use rusqlite::{params, OptionalExtension};

use crate::codec::{bytes_to_u64, u64_to_bytes};
use crate::error::{AtlasError, Result};

use super::{SqliteStore, StableStore};

impl StableStore for SqliteStore {
    fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.ensure_writable()?;

        self.with_conn(|conn| {
            conn.prepare_cached(&self.sql().set_conf)?
                .execute(params![key, value])?;
            Ok(())
        })
    }

    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        let value: Option<Vec<u8>> = self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(&self.sql().get_conf)?;
            Ok(stmt.query_row([key], |row| row.get(0)).optional()?)
        })?;

        value.ok_or(AtlasError::KeyNotFound)
    }

    fn set_u64(&self, key: &[u8], value: u64) -> Result<()> {
        self.set(key, &u64_to_bytes(value))
    }

    fn get_u64(&self, key: &[u8]) -> Result<u64> {
        Ok(bytes_to_u64(&self.get(key)?))
    }
}
