//! Immutable IVF index snapshots.
//!
//! A snapshot is never mutated after construction: incremental `insert`
//! clones the structure and returns a successor, and a rebuild produces a
//! fresh snapshot. Queries therefore see a point-in-time-consistent index
//! regardless of concurrent maintenance.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use insight_core::config::IndexConfig;
use insight_core::errors::{InsightError, InsightResult};

use crate::{distance, kmeans};

/// IVF build and probe parameters.
#[derive(Debug, Clone)]
pub struct IvfParams {
    /// Coarse clusters (inverted lists) at build time.
    pub num_lists: usize,
    /// Lists probed per query.
    pub probe_lists: usize,
    pub max_kmeans_iters: usize,
    pub seed: u64,
}

impl From<&IndexConfig> for IvfParams {
    fn from(config: &IndexConfig) -> Self {
        Self {
            num_lists: config.num_lists,
            probe_lists: config.probe_lists,
            max_kmeans_iters: config.max_kmeans_iters,
            seed: config.seed,
        }
    }
}

/// One indexed vector.
#[derive(Debug, Clone)]
pub(crate) struct ListEntry {
    pub item_id: String,
    pub vector: Vec<f32>,
}

/// An immutable, queryable version of the vector index.
#[derive(Debug, Clone)]
pub struct IndexSnapshot {
    id: Uuid,
    dim: usize,
    /// Time of the last full build; incremental inserts keep it.
    built_at: DateTime<Utc>,
    params: IvfParams,
    centroids: Vec<Vec<f32>>,
    lists: Vec<Vec<ListEntry>>,
    inserted_since_build: usize,
}

impl IndexSnapshot {
    pub(crate) fn new(
        dim: usize,
        params: IvfParams,
        centroids: Vec<Vec<f32>>,
        lists: Vec<Vec<ListEntry>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            dim,
            built_at: Utc::now(),
            params,
            centroids,
            lists,
            inserted_since_build: 0,
        }
    }

    /// An empty snapshot: queryable, returns no results.
    pub fn empty(dim: usize, params: IvfParams) -> Self {
        Self::new(dim, params, Vec::new(), Vec::new())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Total indexed vectors across all lists.
    pub fn len(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(Vec::is_empty)
    }

    /// Vectors added since the last full build.
    pub fn inserted_since_build(&self) -> usize {
        self.inserted_since_build
    }

    /// Approximate top-k similarity query.
    ///
    /// Probes only the `probe_lists` lists whose centroids are nearest the
    /// query vector. Results are ascending by cosine distance, ties broken
    /// by ascending item id. An empty index yields an empty result.
    pub fn query(&self, vector: &[f32], top_k: usize) -> InsightResult<Vec<(String, f64)>> {
        if vector.len() != self.dim {
            return Err(InsightError::DimensionMismatch {
                expected: self.dim,
                actual: vector.len(),
            });
        }
        if self.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let mut centroid_order: Vec<(usize, f64)> = self
            .centroids
            .iter()
            .enumerate()
            .map(|(i, c)| (i, distance::cosine_distance(vector, c)))
            .collect();
        centroid_order.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        let probes = self.params.probe_lists.min(centroid_order.len());
        let mut scored: Vec<(String, f64)> = Vec::new();
        for &(list_idx, _) in centroid_order.iter().take(probes) {
            for entry in &self.lists[list_idx] {
                let d = distance::cosine_distance(vector, &entry.vector);
                scored.push((entry.item_id.clone(), d));
            }
        }

        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(top_k);
        Ok(scored)
    }

    /// Copy-on-write incremental insert: returns a successor snapshot with
    /// the vector appended to its nearest list.
    ///
    /// Bounded use only — the refresh pipeline triggers a full rebuild once
    /// `needs_rebuild` reports drift, since uncompacted inserts degrade
    /// list balance and recall.
    pub fn insert(&self, item_id: &str, vector: Vec<f32>) -> InsightResult<IndexSnapshot> {
        if vector.len() != self.dim {
            return Err(InsightError::DimensionMismatch {
                expected: self.dim,
                actual: vector.len(),
            });
        }

        let mut next = self.clone();
        next.id = Uuid::new_v4();

        let entry = ListEntry {
            item_id: item_id.to_string(),
            vector,
        };

        if next.centroids.is_empty() {
            // First vector ever: seed a single list around it.
            next.centroids.push(distance::normalize(&entry.vector));
            next.lists.push(vec![entry]);
        } else {
            let list_idx = kmeans::nearest_centroid(&entry.vector, &next.centroids);
            next.lists[list_idx].push(entry);
        }
        next.inserted_since_build += 1;
        Ok(next)
    }

    /// True once inserted-since-build exceeds `drift_fraction` of the
    /// total size.
    pub fn needs_rebuild(&self, drift_fraction: f64) -> bool {
        if self.is_empty() {
            return false;
        }
        (self.inserted_since_build as f64) > drift_fraction * (self.len() as f64)
    }
}
