//! Log Store
//!
//! Index-ordered log entries on the `logs` table.
//!
//! ## Write path
//! - `store_logs`: one immediate transaction per batch, retried whole on
//!   contention
//! - `delete_range`: split into sub-ranges of `delete_batch_size` indices,
//!   one immediate transaction each, each retried on contention before the
//!   next starts. Not atomic across sub-ranges.
//!
//! SQLite INTEGER keys are signed 64-bit; indices above `i64::MAX` cannot be
//! stored.

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use crate::codec::{decode_log, encode_log};
use crate::entry::Log;
use crate::error::{AtlasError, Result};

use super::{LogStore, SqliteStore};

impl LogStore for SqliteStore {
    fn first_index(&self) -> Result<u64> {
        self.bound_index(&self.sql().first_index)
    }

    fn last_index(&self) -> Result<u64> {
        self.bound_index(&self.sql().last_index)
    }

    fn get_log(&self, index: u64) -> Result<Log> {
        // Nothing can be stored past the INTEGER range
        let Ok(id) = i64::try_from(index) else {
            return Err(AtlasError::LogNotFound);
        };

        let value: Option<Vec<u8>> = self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(&self.sql().get_log)?;
            Ok(stmt.query_row([id], |row| row.get(0)).optional()?)
        })?;

        match value {
            Some(bytes) => decode_log(&bytes),
            None => Err(AtlasError::LogNotFound),
        }
    }

    fn store_log(&self, log: &Log) -> Result<()> {
        self.store_logs(std::slice::from_ref(log))
    }

    fn store_logs(&self, logs: &[Log]) -> Result<()> {
        if logs.is_empty() {
            return Ok(());
        }
        self.ensure_writable()?;

        self.retry()
            .run(|| self.with_conn(|conn| self.insert_batch(conn, logs)))?;

        tracing::trace!(
            "Stored {} logs [{}..={}]",
            logs.len(),
            logs[0].index,
            logs[logs.len() - 1].index
        );
        Ok(())
    }

    fn delete_range(&self, min: u64, max: u64) -> Result<()> {
        self.ensure_writable()?;
        if min > max {
            return Ok(());
        }

        let batch = self.config().delete_batch_size;
        let mut lo = min;
        let mut batches = 0u64;

        loop {
            let deleted_through = self
                .retry()
                .run(|| self.with_conn(|conn| self.delete_batch(conn, lo, max, batch)))?;

            match deleted_through {
                Some(hi) if hi < max => {
                    batches += 1;
                    lo = hi + 1;
                }
                Some(_) => {
                    batches += 1;
                    break;
                }
                None => break,
            }
        }

        tracing::debug!(
            "Deleted logs [{}..={}] in {} batches",
            min,
            max,
            batches
        );
        Ok(())
    }
}

impl SqliteStore {
    /// Run a `SELECT id ... LIMIT 1` query, mapping an empty table to 0
    fn bound_index(&self, query: &str) -> Result<u64> {
        let id: Option<i64> = self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(query)?;
            Ok(stmt.query_row([], |row| row.get(0)).optional()?)
        })?;

        Ok(id.map_or(0, from_sql_index))
    }

    /// Insert every entry in one transaction
    ///
    /// Returning early on an encode or insert error drops the transaction,
    /// which rolls back the rows already inserted.
    fn insert_batch(&self, conn: &mut Connection, logs: &[Log]) -> Result<()> {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        {
            let mut stmt = tx.prepare_cached(&self.sql().insert_log)?;
            for log in logs {
                let id = i64::try_from(log.index)
                    .map_err(|_| AtlasError::IndexOutOfRange(log.index))?;
                let value = encode_log(log)?;
                stmt.execute(params![id, value])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Delete the next sub-range that starts at or after `lo`
    ///
    /// Seeks the first stored index in `[lo, max]` and removes
    /// `[start, min(start + batch - 1, max)]`. Returns the upper bound
    /// removed, or `None` when no entries remain in `[lo, max]`.
    fn delete_batch(
        &self,
        conn: &mut Connection,
        lo: u64,
        max: u64,
        batch: u64,
    ) -> Result<Option<u64>> {
        let Ok(lo_id) = i64::try_from(lo) else {
            return Ok(None);
        };
        let max_id = clamp_index(max);

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let next: Option<i64> = tx
            .prepare_cached(&self.sql().next_index_from)?
            .query_row(params![lo_id, max_id], |row| row.get(0))
            .optional()?;
        let Some(start) = next.map(from_sql_index) else {
            return Ok(None);
        };

        let hi = start.saturating_add(batch - 1).min(max);
        let removed = tx
            .prepare_cached(&self.sql().delete_logs)?
            .execute(params![clamp_index(start), clamp_index(hi)])?;
        tx.commit()?;

        tracing::trace!("Deleted {} logs in [{}..={}]", removed, start, hi);
        Ok(Some(hi))
    }
}

/// Range bounds past the INTEGER range cover everything up to `i64::MAX`
fn clamp_index(index: u64) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

/// Negative ids are never written by this store; read them as 0
fn from_sql_index(id: i64) -> u64 {
    u64::try_from(id).unwrap_or(0)
}
