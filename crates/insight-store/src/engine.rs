//! EmbeddingStore — owns the connection, enforces dimension invariants,
//! and exposes the versioned-embedding and alert-feed API.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::info;

use insight_core::config::{EmbeddingConfig, StoreConfig};
use insight_core::errors::{InsightError, InsightResult};
use insight_core::models::{Embedding, Modality, QualityAlert, RiskLevel};

use crate::queries::{alert_ops, embedding_ops};
use crate::to_store_err;
use crate::{migrations, pragmas};

/// Durable keyed storage of per-item embedding vectors with modality and
/// version metadata, plus the quality-alert feed.
///
/// A single mutex-guarded connection serves all callers; every statement
/// here is short-lived, and refresh cycles batch their writes.
pub struct EmbeddingStore {
    conn: Mutex<Connection>,
    dims: EmbeddingConfig,
    retention: usize,
}

impl EmbeddingStore {
    /// Open a store backed by a file on disk.
    pub fn open(path: &Path, config: &StoreConfig, dims: EmbeddingConfig) -> InsightResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_store_err(e.to_string()))?;
        Self::initialize(conn, config, dims)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory(config: &StoreConfig, dims: EmbeddingConfig) -> InsightResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_store_err(e.to_string()))?;
        Self::initialize(conn, config, dims)
    }

    fn initialize(
        conn: Connection,
        config: &StoreConfig,
        dims: EmbeddingConfig,
    ) -> InsightResult<Self> {
        pragmas::apply_pragmas(&conn, config)?;
        migrations::run_migrations(&conn)?;
        info!(
            text_dims = dims.text_dims,
            image_dims = dims.image_dims,
            retention = config.version_retention,
            "embedding store initialized"
        );
        Ok(Self {
            conn: Mutex::new(conn),
            dims,
            retention: config.version_retention,
        })
    }

    fn with_conn<F, T>(&self, f: F) -> InsightResult<T>
    where
        F: FnOnce(&Connection) -> InsightResult<T>,
    {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        f(&conn)
    }

    /// The configured dimension for a modality.
    pub fn configured_dim(&self, modality: Modality) -> usize {
        self.dims.dim_for(modality)
    }

    /// Write a new current embedding version, retiring the previous one.
    ///
    /// Rejects the write with `DimensionMismatch` before touching the
    /// database, leaving any prior current embedding unchanged.
    pub fn upsert(
        &self,
        item_id: &str,
        modality: Modality,
        vector: Vec<f32>,
        source_version: &str,
        content_hash: &str,
    ) -> InsightResult<Embedding> {
        let expected = self.dims.dim_for(modality);
        if vector.len() != expected {
            return Err(InsightError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }

        let embedding = Embedding {
            item_id: item_id.to_string(),
            modality,
            dim: vector.len(),
            vector,
            created_at: Utc::now(),
            source_version: source_version.to_string(),
            content_hash: content_hash.to_string(),
        };

        self.with_conn(|conn| embedding_ops::upsert_embedding(conn, &embedding, self.retention))?;
        Ok(embedding)
    }

    /// Fetch the current embedding, if any.
    pub fn get(&self, item_id: &str, modality: Modality) -> InsightResult<Option<Embedding>> {
        self.with_conn(|conn| embedding_ops::get_current(conn, item_id, modality))
    }

    /// True when the stored embedding predates the item's last catalog
    /// modification, or when no embedding exists at all.
    pub fn is_stale(
        &self,
        item_id: &str,
        modality: Modality,
        catalog_last_modified: DateTime<Utc>,
    ) -> InsightResult<bool> {
        match self.get(item_id, modality)? {
            Some(embedding) => Ok(embedding.created_at < catalog_last_modified),
            None => Ok(true),
        }
    }

    /// All current embeddings for one modality, ordered by item id.
    pub fn current_embeddings(&self, modality: Modality) -> InsightResult<Vec<Embedding>> {
        self.with_conn(|conn| embedding_ops::current_embeddings(conn, modality))
    }

    /// Version history for `(item_id, modality)`, newest first.
    pub fn history(
        &self,
        item_id: &str,
        modality: Modality,
    ) -> InsightResult<Vec<embedding_ops::EmbeddingVersion>> {
        self.with_conn(|conn| embedding_ops::history(conn, item_id, modality))
    }

    /// Re-promote a retired version to current.
    pub fn rollback(&self, item_id: &str, modality: Modality, version: i64) -> InsightResult<()> {
        self.with_conn(|conn| {
            embedding_ops::rollback_to_version(conn, item_id, modality, version)
        })
    }

    /// Replace the stored alerts for the given items.
    pub fn put_alerts(&self, alerts: &[QualityAlert]) -> InsightResult<()> {
        self.with_conn(|conn| alert_ops::put_alerts(conn, alerts))
    }

    /// The full current alert feed.
    pub fn alerts(&self) -> InsightResult<Vec<QualityAlert>> {
        self.with_conn(alert_ops::all_alerts)
    }

    /// Alerts at one risk level, most negative reviews first.
    pub fn alerts_by_level(&self, level: RiskLevel) -> InsightResult<Vec<QualityAlert>> {
        self.with_conn(|conn| alert_ops::alerts_by_level(conn, level))
    }
}
