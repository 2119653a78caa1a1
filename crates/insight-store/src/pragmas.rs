//! PRAGMA configuration applied to the store's connection.

use rusqlite::Connection;

use insight_core::config::StoreConfig;
use insight_core::errors::InsightResult;

use crate::to_store_err;

/// Apply performance and safety pragmas.
pub fn apply_pragmas(conn: &Connection, config: &StoreConfig) -> InsightResult<()> {
    if config.wal_mode {
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(|e| to_store_err(e.to_string()))?;
    }
    conn.execute_batch(&format!(
        "
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = {};
        PRAGMA foreign_keys = ON;
        ",
        config.busy_timeout_ms
    ))
    .map_err(|e| to_store_err(e.to_string()))?;
    Ok(())
}
