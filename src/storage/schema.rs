//! Schema
//!
//! Table creation and the SQL text used by the store. Table names come from
//! `Config` (already validated as plain identifiers) and are baked into the
//! statements once per store.

use rusqlite::{Connection, TransactionBehavior};

use crate::error::Result;

/// SQL statements bound to a pair of table names
#[derive(Debug, Clone)]
pub(crate) struct Statements {
    pub create_logs: String,
    pub create_conf: String,

    pub first_index: String,
    pub last_index: String,
    pub get_log: String,
    pub insert_log: String,
    pub next_index_from: String,
    pub delete_logs: String,

    pub set_conf: String,
    pub get_conf: String,
}

impl Statements {
    pub fn new(log_table: &str, conf_table: &str) -> Self {
        Self {
            create_logs: format!(
                "CREATE TABLE IF NOT EXISTS {}(id INTEGER NOT NULL PRIMARY KEY, value BLOB)",
                log_table
            ),
            create_conf: format!(
                "CREATE TABLE IF NOT EXISTS {}(id BLOB NOT NULL PRIMARY KEY, value BLOB)",
                conf_table
            ),

            first_index: format!("SELECT id FROM {} ORDER BY id ASC LIMIT 1", log_table),
            last_index: format!("SELECT id FROM {} ORDER BY id DESC LIMIT 1", log_table),
            get_log: format!("SELECT value FROM {} WHERE id = ?1", log_table),
            insert_log: format!("INSERT INTO {}(id, value) VALUES (?1, ?2)", log_table),
            next_index_from: format!(
                "SELECT id FROM {} WHERE id >= ?1 AND id <= ?2 ORDER BY id ASC LIMIT 1",
                log_table
            ),
            delete_logs: format!("DELETE FROM {} WHERE id >= ?1 AND id <= ?2", log_table),

            set_conf: format!("REPLACE INTO {}(id, value) VALUES (?1, ?2)", conf_table),
            get_conf: format!("SELECT value FROM {} WHERE id = ?1", conf_table),
        }
    }
}

/// Create both tables in one transaction. Safe on a populated database.
///
/// Any failure drops the transaction, which rolls back whatever part of the
/// schema was created.
pub(crate) fn initialize(conn: &mut Connection, sql: &Statements) -> Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    tx.execute(&sql.create_logs, [])?;
    tx.execute(&sql.create_conf, [])?;
    tx.commit()?;

    tracing::debug!("Schema ready");
    Ok(())
}
