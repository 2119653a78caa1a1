//! Numbered schema migrations tracked via `PRAGMA user_version`.

use rusqlite::Connection;

use insight_core::errors::{InsightResult, StoreError};

use crate::to_store_err;

/// v001: versioned embeddings table. The partial unique index enforces the
/// at-most-one-current invariant per `(item_id, modality)`.
const V001_EMBEDDINGS: &str = "
    CREATE TABLE IF NOT EXISTS embeddings (
        id             INTEGER PRIMARY KEY AUTOINCREMENT,
        item_id        TEXT NOT NULL,
        modality       TEXT NOT NULL,
        vector         BLOB NOT NULL,
        dim            INTEGER NOT NULL,
        created_at     TEXT NOT NULL,
        source_version TEXT NOT NULL,
        content_hash   TEXT NOT NULL,
        current        INTEGER NOT NULL DEFAULT 1
    );

    CREATE UNIQUE INDEX IF NOT EXISTS idx_embeddings_current
        ON embeddings(item_id, modality) WHERE current = 1;
    CREATE INDEX IF NOT EXISTS idx_embeddings_item
        ON embeddings(item_id, modality);
    CREATE INDEX IF NOT EXISTS idx_embeddings_modality
        ON embeddings(modality, current);
";

/// v002: latest-only quality alerts, keyed by item.
const V002_QUALITY_ALERTS: &str = "
    CREATE TABLE IF NOT EXISTS quality_alerts (
        item_id          TEXT PRIMARY KEY,
        risk_level       TEXT NOT NULL,
        positive_reviews INTEGER NOT NULL,
        negative_reviews INTEGER NOT NULL,
        avg_rating       REAL NOT NULL,
        explanation      TEXT,
        generated_at     TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_alerts_level
        ON quality_alerts(risk_level, negative_reviews DESC);
";

const MIGRATIONS: &[(u32, &str)] = &[(1, V001_EMBEDDINGS), (2, V002_QUALITY_ALERTS)];

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> InsightResult<()> {
    let applied: u32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| to_store_err(e.to_string()))?;

    for (version, sql) in MIGRATIONS {
        if *version <= applied {
            continue;
        }
        conn.execute_batch(sql).map_err(|e| StoreError::MigrationFailed {
            version: *version,
            reason: e.to_string(),
        })?;
        conn.pragma_update(None, "user_version", version)
            .map_err(|e| to_store_err(e.to_string()))?;
        tracing::debug!(version, "applied migration");
    }

    Ok(())
}
