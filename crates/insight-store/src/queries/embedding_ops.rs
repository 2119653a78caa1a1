//! Versioned embedding reads and writes.
//!
//! Writes supersede: the previous current row is retired (current = 0),
//! never deleted in place. Retired rows beyond the retention window are
//! pruned, keeping rollback bounded.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use insight_core::errors::{InsightResult, StoreError};
use insight_core::models::{Embedding, Modality};

use crate::to_store_err;

/// One row of an embedding's version history.
#[derive(Debug, Clone)]
pub struct EmbeddingVersion {
    pub version: i64,
    pub current: bool,
    pub embedding: Embedding,
}

/// Insert a new current embedding, retiring the previous current row.
/// Wrapped in a SAVEPOINT: retire + insert + prune are all-or-nothing.
pub fn upsert_embedding(
    conn: &Connection,
    embedding: &Embedding,
    retention: usize,
) -> InsightResult<()> {
    conn.execute_batch("SAVEPOINT upsert_emb")
        .map_err(|e| to_store_err(format!("upsert savepoint: {e}")))?;

    match upsert_inner(conn, embedding, retention) {
        Ok(()) => {
            conn.execute_batch("RELEASE upsert_emb")
                .map_err(|e| to_store_err(format!("upsert release: {e}")))?;
            Ok(())
        }
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK TO upsert_emb");
            let _ = conn.execute_batch("RELEASE upsert_emb");
            Err(e)
        }
    }
}

fn upsert_inner(conn: &Connection, embedding: &Embedding, retention: usize) -> InsightResult<()> {
    let modality = embedding.modality.to_string();

    // Retire the previous current version.
    conn.execute(
        "UPDATE embeddings SET current = 0
         WHERE item_id = ?1 AND modality = ?2 AND current = 1",
        params![embedding.item_id, modality],
    )
    .map_err(|e| to_store_err(e.to_string()))?;

    conn.execute(
        "INSERT INTO embeddings
            (item_id, modality, vector, dim, created_at, source_version, content_hash, current)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1)",
        params![
            embedding.item_id,
            modality,
            f32_vec_to_bytes(&embedding.vector),
            embedding.dim as i64,
            embedding.created_at.to_rfc3339(),
            embedding.source_version,
            embedding.content_hash,
        ],
    )
    .map_err(|e| to_store_err(e.to_string()))?;

    // Prune retired versions beyond the retention window.
    conn.execute(
        "DELETE FROM embeddings
         WHERE item_id = ?1 AND modality = ?2 AND current = 0
           AND id NOT IN (
               SELECT id FROM embeddings
               WHERE item_id = ?1 AND modality = ?2 AND current = 0
               ORDER BY id DESC LIMIT ?3
           )",
        params![embedding.item_id, modality, retention as i64],
    )
    .map_err(|e| to_store_err(e.to_string()))?;

    Ok(())
}

/// Fetch the current embedding for `(item_id, modality)`.
pub fn get_current(
    conn: &Connection,
    item_id: &str,
    modality: Modality,
) -> InsightResult<Option<Embedding>> {
    let mut stmt = conn
        .prepare(
            "SELECT item_id, modality, vector, dim, created_at, source_version, content_hash
             FROM embeddings
             WHERE item_id = ?1 AND modality = ?2 AND current = 1",
        )
        .map_err(|e| to_store_err(e.to_string()))?;

    let mut rows = stmt
        .query(params![item_id, modality.to_string()])
        .map_err(|e| to_store_err(e.to_string()))?;

    match rows.next().map_err(|e| to_store_err(e.to_string()))? {
        Some(row) => Ok(Some(row_to_embedding(row)?)),
        None => Ok(None),
    }
}

/// All current embeddings for one modality; the index builder's input.
pub fn current_embeddings(conn: &Connection, modality: Modality) -> InsightResult<Vec<Embedding>> {
    let mut stmt = conn
        .prepare(
            "SELECT item_id, modality, vector, dim, created_at, source_version, content_hash
             FROM embeddings
             WHERE modality = ?1 AND current = 1
             ORDER BY item_id",
        )
        .map_err(|e| to_store_err(e.to_string()))?;

    let mut rows = stmt
        .query(params![modality.to_string()])
        .map_err(|e| to_store_err(e.to_string()))?;

    let mut out = Vec::new();
    while let Some(row) = rows.next().map_err(|e| to_store_err(e.to_string()))? {
        out.push(row_to_embedding(row)?);
    }
    Ok(out)
}

/// Full version history for `(item_id, modality)`, newest first.
pub fn history(
    conn: &Connection,
    item_id: &str,
    modality: Modality,
) -> InsightResult<Vec<EmbeddingVersion>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, current, item_id, modality, vector, dim, created_at,
                    source_version, content_hash
             FROM embeddings
             WHERE item_id = ?1 AND modality = ?2
             ORDER BY id DESC",
        )
        .map_err(|e| to_store_err(e.to_string()))?;

    let mut rows = stmt
        .query(params![item_id, modality.to_string()])
        .map_err(|e| to_store_err(e.to_string()))?;

    let mut out = Vec::new();
    while let Some(row) = rows.next().map_err(|e| to_store_err(e.to_string()))? {
        let version: i64 = row.get(0).map_err(|e| to_store_err(e.to_string()))?;
        let current: bool = row.get(1).map_err(|e| to_store_err(e.to_string()))?;
        let embedding = columns_to_embedding(
            row.get(2).map_err(|e| to_store_err(e.to_string()))?,
            row.get(3).map_err(|e| to_store_err(e.to_string()))?,
            row.get(4).map_err(|e| to_store_err(e.to_string()))?,
            row.get(5).map_err(|e| to_store_err(e.to_string()))?,
            row.get(6).map_err(|e| to_store_err(e.to_string()))?,
            row.get(7).map_err(|e| to_store_err(e.to_string()))?,
            row.get(8).map_err(|e| to_store_err(e.to_string()))?,
        )?;
        out.push(EmbeddingVersion {
            version,
            current,
            embedding,
        });
    }
    Ok(out)
}

/// Re-promote a retired version to current.
pub fn rollback_to_version(
    conn: &Connection,
    item_id: &str,
    modality: Modality,
    version: i64,
) -> InsightResult<()> {
    conn.execute_batch("SAVEPOINT rollback_emb")
        .map_err(|e| to_store_err(format!("rollback savepoint: {e}")))?;

    match rollback_inner(conn, item_id, modality, version) {
        Ok(()) => {
            conn.execute_batch("RELEASE rollback_emb")
                .map_err(|e| to_store_err(format!("rollback release: {e}")))?;
            Ok(())
        }
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK TO rollback_emb");
            let _ = conn.execute_batch("RELEASE rollback_emb");
            Err(e)
        }
    }
}

fn rollback_inner(
    conn: &Connection,
    item_id: &str,
    modality: Modality,
    version: i64,
) -> InsightResult<()> {
    let modality_str = modality.to_string();

    let exists: bool = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM embeddings
                WHERE id = ?1 AND item_id = ?2 AND modality = ?3
             )",
            params![version, item_id, modality_str],
            |row| row.get(0),
        )
        .map_err(|e| to_store_err(e.to_string()))?;

    if !exists {
        return Err(StoreError::VersionNotFound {
            item_id: item_id.to_string(),
            modality: modality_str,
            version,
        }
        .into());
    }

    conn.execute(
        "UPDATE embeddings SET current = 0
         WHERE item_id = ?1 AND modality = ?2 AND current = 1",
        params![item_id, modality_str],
    )
    .map_err(|e| to_store_err(e.to_string()))?;

    conn.execute(
        "UPDATE embeddings SET current = 1 WHERE id = ?1",
        params![version],
    )
    .map_err(|e| to_store_err(e.to_string()))?;

    Ok(())
}

fn row_to_embedding(row: &rusqlite::Row<'_>) -> InsightResult<Embedding> {
    columns_to_embedding(
        row.get(0).map_err(|e| to_store_err(e.to_string()))?,
        row.get(1).map_err(|e| to_store_err(e.to_string()))?,
        row.get(2).map_err(|e| to_store_err(e.to_string()))?,
        row.get(3).map_err(|e| to_store_err(e.to_string()))?,
        row.get(4).map_err(|e| to_store_err(e.to_string()))?,
        row.get(5).map_err(|e| to_store_err(e.to_string()))?,
        row.get(6).map_err(|e| to_store_err(e.to_string()))?,
    )
}

#[allow(clippy::too_many_arguments)]
fn columns_to_embedding(
    item_id: String,
    modality: String,
    blob: Vec<u8>,
    dim: i64,
    created_at: String,
    source_version: String,
    content_hash: String,
) -> InsightResult<Embedding> {
    let modality: Modality = modality
        .parse()
        .map_err(|e: String| to_store_err(e))?;
    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| to_store_err(format!("bad created_at: {e}")))?
        .with_timezone(&Utc);

    Ok(Embedding {
        item_id,
        modality,
        vector: bytes_to_f32_vec(&blob, dim as usize),
        dim: dim as usize,
        created_at,
        source_version,
        content_hash,
    })
}

/// Convert f32 slice to bytes (little-endian).
pub(crate) fn f32_vec_to_bytes(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert bytes back to f32 vec.
pub(crate) fn bytes_to_f32_vec(bytes: &[u8], expected_dims: usize) -> Vec<f32> {
    let mut result = Vec::with_capacity(expected_dims);
    for chunk in bytes.chunks_exact(4) {
        result.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    result
}
