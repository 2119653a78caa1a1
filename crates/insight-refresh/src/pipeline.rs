//! RefreshPipeline — the batch cycle keeping store, index, and alerts
//! consistent as catalog data changes.
//!
//! Stages: change detection → bounded embedding → upsert → index
//! maintenance → alert recompute → atomic publish. Cancellation is checked
//! between stages; a cancelled cycle never exposes partial state as
//! current.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use moka::sync::Cache;
use tracing::{debug, info, warn};

use insight_core::config::{EmbeddingConfig, IndexConfig, InsightConfig, QualityConfig, RefreshConfig};
use insight_core::errors::{InsightError, InsightResult};
use insight_core::hashing;
use insight_core::models::{CycleReport, Item, Modality};
use insight_core::traits::{EmbeddingProvider, ItemCatalog, TextGenerator};
use insight_index::{build, IndexSnapshot, IvfParams, SnapshotHandle};
use insight_store::EmbeddingStore;

use crate::cancel::CancelToken;
use crate::worker::{self, EmbedJob};

/// Orchestrates refresh cycles over the shared store and snapshot handle.
pub struct RefreshPipeline {
    store: Arc<EmbeddingStore>,
    snapshots: Arc<SnapshotHandle>,
    catalog: Arc<dyn ItemCatalog>,
    provider: Arc<dyn EmbeddingProvider>,
    text_gen: Option<Arc<dyn TextGenerator>>,
    dims: EmbeddingConfig,
    index_config: IndexConfig,
    quality_config: QualityConfig,
    config: RefreshConfig,
    /// Items that failed embedding in the latest cycle, with the reason.
    failed: DashMap<String, String>,
    /// Content-hash keyed embedding reuse across cycles.
    cache: Cache<String, Vec<f32>>,
}

impl RefreshPipeline {
    pub fn new(
        store: Arc<EmbeddingStore>,
        snapshots: Arc<SnapshotHandle>,
        catalog: Arc<dyn ItemCatalog>,
        provider: Arc<dyn EmbeddingProvider>,
        config: &InsightConfig,
    ) -> Self {
        Self {
            store,
            snapshots,
            catalog,
            provider,
            text_gen: None,
            dims: config.embedding,
            index_config: config.index.clone(),
            quality_config: config.quality.clone(),
            config: config.refresh.clone(),
            failed: DashMap::new(),
            cache: Cache::new(config.refresh.embed_cache_size),
        }
    }

    /// Enable best-effort alert explanations.
    pub fn with_text_generator(mut self, text_gen: Arc<dyn TextGenerator>) -> Self {
        self.text_gen = Some(text_gen);
        self
    }

    /// Items that failed during the latest cycle, with failure reasons.
    pub fn failed_items(&self) -> Vec<(String, String)> {
        self.failed
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Run one full refresh cycle.
    pub async fn run_cycle(&self, cancel: &CancelToken) -> InsightResult<CycleReport> {
        let started_at = Utc::now();
        let modality = self.index_config.modality;
        info!(%modality, "refresh cycle started");

        let items = self.catalog.all_items()?;

        // Stage 1: change detection by content hash and catalog timestamp.
        let (jobs, skipped_unchanged, updated_ids) = self.detect_changes(&items, modality)?;
        if cancel.is_cancelled() {
            return Ok(self.cancelled_report(started_at, skipped_unchanged));
        }

        // Stage 2: cache-first split, then the worker pool for the rest.
        let (cached, remote): (Vec<_>, Vec<_>) = jobs
            .into_iter()
            .partition(|job| self.cache.contains_key(&job.content_hash));

        self.failed.clear();
        let results = worker::embed_all(self.provider.clone(), remote, &self.config, cancel).await;

        // Stage 3: upserts. Per-item failures are recorded, never fatal.
        let mut refreshed = 0usize;
        let mut failed = 0usize;
        let mut fresh_vectors: Vec<(String, Vec<f32>)> = Vec::new();

        for job in cached {
            let Some(vector) = self.cache.get(&job.content_hash) else {
                // Evicted between partition and read; re-detected next cycle.
                continue;
            };
            self.store.upsert(
                &job.item_id,
                job.modality,
                vector.clone(),
                self.provider.name(),
                &job.content_hash,
            )?;
            debug!(item_id = %job.item_id, "embedding reused from cache");
            fresh_vectors.push((job.item_id, vector));
            refreshed += 1;
        }

        for outcome in results {
            let job = outcome.job;
            match outcome.result {
                Ok(vector) => match self.store.upsert(
                    &job.item_id,
                    job.modality,
                    vector.clone(),
                    self.provider.name(),
                    &job.content_hash,
                ) {
                    Ok(_) => {
                        self.cache.insert(job.content_hash.clone(), vector.clone());
                        fresh_vectors.push((job.item_id, vector));
                        refreshed += 1;
                    }
                    Err(InsightError::DimensionMismatch { expected, actual }) => {
                        warn!(
                            item_id = %job.item_id,
                            expected,
                            actual,
                            "provider returned wrong-dimension vector, item marked failed"
                        );
                        self.failed.insert(
                            job.item_id.clone(),
                            format!("dimension mismatch: expected {expected}, got {actual}"),
                        );
                        failed += 1;
                    }
                    Err(e) => return Err(e),
                },
                Err(e) => {
                    warn!(item_id = %job.item_id, error = %e, "embedding failed this cycle");
                    self.failed.insert(job.item_id.clone(), e.to_string());
                    failed += 1;
                }
            }
        }

        if cancel.is_cancelled() {
            // Upserts so far are complete and consistent; the published
            // snapshot simply stays older.
            return Ok(CycleReport {
                refreshed,
                skipped_unchanged,
                failed,
                rebuilt_index: false,
                alerts_written: 0,
                cancelled: true,
                started_at,
                finished_at: Utc::now(),
            });
        }

        // Stage 4: index maintenance.
        let (next_snapshot, rebuilt_index) =
            self.maintain_index(modality, &fresh_vectors, &updated_ids)?;

        // Stage 5: wholesale alert recompute.
        let evidence = self.catalog.review_aggregates()?;
        let alerts =
            insight_quality::generate_alerts(&evidence, &self.quality_config, self.text_gen.as_deref());
        self.store.put_alerts(&alerts)?;
        let alerts_written = alerts.len();

        if cancel.is_cancelled() {
            return Ok(CycleReport {
                refreshed,
                skipped_unchanged,
                failed,
                rebuilt_index: false,
                alerts_written,
                cancelled: true,
                started_at,
                finished_at: Utc::now(),
            });
        }

        // Stage 6: atomic publish. In-flight queries keep their pinned
        // snapshot.
        if let Some(snapshot) = next_snapshot {
            self.snapshots.publish(snapshot);
        }

        let report = CycleReport {
            refreshed,
            skipped_unchanged,
            failed,
            rebuilt_index,
            alerts_written,
            cancelled: false,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            refreshed = report.refreshed,
            skipped = report.skipped_unchanged,
            failed = report.failed,
            rebuilt = report.rebuilt_index,
            alerts = report.alerts_written,
            "refresh cycle complete"
        );
        Ok(report)
    }

    /// Items whose embedding is missing, content-changed, or stale.
    /// Returns jobs, the unchanged count, and the set of ids that already
    /// had an embedding (updates, as opposed to first-time inserts).
    fn detect_changes(
        &self,
        items: &[Item],
        modality: Modality,
    ) -> InsightResult<(Vec<EmbedJob>, usize, HashSet<String>)> {
        let mut jobs = Vec::new();
        let mut skipped = 0usize;
        let mut updated_ids = HashSet::new();

        for item in items {
            let Some(content) = embeddable_content(item, modality) else {
                continue;
            };
            let content_hash = hashing::content_hash(&content);

            match self.store.get(&item.item_id, modality)? {
                None => jobs.push(EmbedJob {
                    item_id: item.item_id.clone(),
                    modality,
                    content,
                    content_hash,
                }),
                Some(existing) => {
                    let changed = existing.content_hash != content_hash
                        || existing.created_at < item.last_modified;
                    if changed {
                        updated_ids.insert(item.item_id.clone());
                        jobs.push(EmbedJob {
                            item_id: item.item_id.clone(),
                            modality,
                            content,
                            content_hash,
                        });
                    } else {
                        skipped += 1;
                    }
                }
            }
        }

        debug!(
            to_refresh = jobs.len(),
            unchanged = skipped,
            "change detection complete"
        );
        Ok((jobs, skipped, updated_ids))
    }

    /// Incremental insert for genuinely new vectors; full rebuild when the
    /// snapshot is empty, an existing item changed (its old vector must
    /// leave the index), or drift would exceed the configured fraction.
    fn maintain_index(
        &self,
        modality: Modality,
        fresh_vectors: &[(String, Vec<f32>)],
        updated_ids: &HashSet<String>,
    ) -> InsightResult<(Option<IndexSnapshot>, bool)> {
        if fresh_vectors.is_empty() {
            return Ok((None, false));
        }

        let current = self.snapshots.current();
        let any_update = fresh_vectors
            .iter()
            .any(|(id, _)| updated_ids.contains(id));

        let projected_inserts = current.inserted_since_build() + fresh_vectors.len();
        let projected_total = current.len() + fresh_vectors.len();
        let drifted = (projected_inserts as f64)
            > self.config.drift_rebuild_fraction * projected_total as f64;

        if current.is_empty() || any_update || drifted {
            let entries: Vec<(String, Vec<f32>)> = self
                .store
                .current_embeddings(modality)?
                .into_iter()
                .map(|e| (e.item_id, e.vector))
                .collect();
            let snapshot = build(
                entries,
                IvfParams::from(&self.index_config),
                self.dims.dim_for(modality),
            )?;
            debug!(vectors = snapshot.len(), "full index rebuild");
            return Ok((Some(snapshot), true));
        }

        let mut snapshot = (*current).clone();
        for (item_id, vector) in fresh_vectors {
            snapshot = snapshot.insert(item_id, vector.clone())?;
        }
        debug!(
            inserted = fresh_vectors.len(),
            since_build = snapshot.inserted_since_build(),
            "incremental index insert"
        );
        Ok((Some(snapshot), false))
    }

    fn cancelled_report(&self, started_at: chrono::DateTime<Utc>, skipped: usize) -> CycleReport {
        CycleReport {
            refreshed: 0,
            skipped_unchanged: skipped,
            failed: 0,
            rebuilt_index: false,
            alerts_written: 0,
            cancelled: true,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

/// What gets embedded for an item under a modality. Items without an image
/// reference have nothing to embed under `Image`.
fn embeddable_content(item: &Item, modality: Modality) -> Option<String> {
    match modality {
        Modality::Text => Some(item.description.clone()),
        Modality::Image => item.image_ref.clone(),
    }
}
