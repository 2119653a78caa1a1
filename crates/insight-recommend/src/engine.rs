//! RecommendationEngine: anchor lookup → snapshot query → policy filters.
//!
//! Read-only and side-effect-free; safe to call concurrently with each
//! other and with an in-progress index rebuild (queries pin a snapshot).

use tracing::debug;

use insight_core::config::RecommendConfig;
use insight_core::errors::{InsightError, InsightResult};
use insight_core::models::{Modality, Recommendation};
use insight_core::traits::{EmbeddingProvider, ExplainContext, TextGenerator};
use insight_index::SnapshotHandle;
use insight_store::EmbeddingStore;

/// Answers "items similar to this one" against the published snapshot.
pub struct RecommendationEngine<'a> {
    store: &'a EmbeddingStore,
    snapshots: &'a SnapshotHandle,
    modality: Modality,
    config: RecommendConfig,
    embedder: Option<&'a dyn EmbeddingProvider>,
    text_gen: Option<&'a dyn TextGenerator>,
}

impl<'a> RecommendationEngine<'a> {
    pub fn new(
        store: &'a EmbeddingStore,
        snapshots: &'a SnapshotHandle,
        modality: Modality,
        config: RecommendConfig,
    ) -> Self {
        Self {
            store,
            snapshots,
            modality,
            config,
            embedder: None,
            text_gen: None,
        }
    }

    /// Enable free-text `search` through the given provider.
    pub fn with_embedding_provider(mut self, provider: &'a dyn EmbeddingProvider) -> Self {
        self.embedder = Some(provider);
        self
    }

    /// Enable best-effort explanations through the given generator.
    pub fn with_text_generator(mut self, text_gen: &'a dyn TextGenerator) -> Self {
        self.text_gen = Some(text_gen);
        self
    }

    /// Top-k items similar to `item_id`.
    ///
    /// Fewer than `k` results (empty index, aggressive cutoff) is a valid
    /// outcome, not an error. The anchor never appears in its own results.
    pub fn get_recommendations(
        &self,
        item_id: &str,
        k: usize,
    ) -> InsightResult<Vec<Recommendation>> {
        if k == 0 {
            return Err(InsightError::InvalidConfig(
                "k must be positive".to_string(),
            ));
        }

        let anchor = self
            .store
            .get(item_id, self.modality)?
            .ok_or_else(|| InsightError::ItemNotFound {
                id: item_id.to_string(),
            })?;

        let snapshot = self.snapshots.current();
        // Overfetch by one: the anchor usually matches itself at distance 0.
        let neighbors = snapshot.query(&anchor.vector, k + 1)?;

        let mut recommendations = rank(neighbors, Some(item_id), self.config.distance_cutoff, k);
        debug!(
            anchor = item_id,
            k,
            results = recommendations.len(),
            snapshot = %snapshot.id(),
            "similar-item query complete"
        );

        self.attach_explanations(item_id, &mut recommendations);
        Ok(recommendations)
    }

    /// Top-k items matching a free-text query, embedded through the
    /// configured provider.
    ///
    /// Unlike explanation enrichment, a provider failure here is a real
    /// error: without a query vector there is nothing to search.
    pub fn search(&self, query: &str, k: usize) -> InsightResult<Vec<Recommendation>> {
        if k == 0 {
            return Err(InsightError::InvalidConfig(
                "k must be positive".to_string(),
            ));
        }
        let embedder = self.embedder.ok_or_else(|| {
            InsightError::InvalidConfig("no embedding provider configured for search".to_string())
        })?;

        let vector = embedder.embed(query, self.modality)?;
        let snapshot = self.snapshots.current();
        let neighbors = snapshot.query(&vector, k)?;

        let recommendations = rank(neighbors, None, self.config.distance_cutoff, k);
        debug!(
            k,
            results = recommendations.len(),
            snapshot = %snapshot.id(),
            "text search complete"
        );
        Ok(recommendations)
    }

    fn attach_explanations(&self, anchor_id: &str, recommendations: &mut [Recommendation]) {
        if !self.config.explain {
            return;
        }
        let Some(text_gen) = self.text_gen else {
            return;
        };

        for rec in recommendations.iter_mut() {
            let context = ExplainContext::Similarity {
                anchor_id: anchor_id.to_string(),
                candidate_id: rec.item_id.clone(),
                distance: rec.distance,
            };
            match text_gen.explain(&context) {
                Ok(text) => rec.explanation = Some(text),
                Err(e) => {
                    // Best-effort: the ranked list goes out regardless.
                    debug!(
                        anchor = anchor_id,
                        candidate = %rec.item_id,
                        generator = text_gen.name(),
                        error = %e,
                        "similarity explanation unavailable"
                    );
                }
            }
        }
    }
}

/// Apply exclusion, cutoff, and truncation to an already-sorted neighbor
/// list, assigning 1-based ranks.
fn rank(
    neighbors: Vec<(String, f64)>,
    exclude: Option<&str>,
    cutoff: Option<f64>,
    k: usize,
) -> Vec<Recommendation> {
    neighbors
        .into_iter()
        .filter(|(id, _)| exclude != Some(id.as_str()))
        .filter(|(_, distance)| cutoff.map_or(true, |c| *distance <= c))
        .take(k)
        .enumerate()
        .map(|(i, (item_id, distance))| Recommendation {
            item_id,
            distance,
            rank: i + 1,
            explanation: None,
        })
        .collect()
}
