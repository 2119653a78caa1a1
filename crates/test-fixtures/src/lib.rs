//! # test-fixtures
//!
//! Deterministic fakes and corpora shared by crate tests: hash-derived
//! embedding providers, canned/failing text generators, a mutable fixture
//! catalog, and seeded clustered corpora for recall measurements.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use insight_core::errors::{AdapterError, InsightResult};
use insight_core::models::{Item, Modality, QualityEvidence};
use insight_core::traits::{EmbeddingProvider, ExplainContext, ItemCatalog, TextGenerator};

/// Deterministic splitmix64 stream.
pub struct SplitMix64(u64);

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform float in [-1.0, 1.0).
    pub fn next_unit(&mut self) -> f32 {
        let x = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        (x * 2.0 - 1.0) as f32
    }
}

/// A corpus of `num_clusters * per_cluster` labeled vectors in tight,
/// well-separated clusters. Ids sort lexicographically in generation
/// order (`item-<cluster>-<index>`).
pub fn clustered_corpus(
    num_clusters: usize,
    per_cluster: usize,
    dim: usize,
    seed: u64,
) -> Vec<(String, Vec<f32>)> {
    let mut rng = SplitMix64::new(seed);
    let mut corpus = Vec::with_capacity(num_clusters * per_cluster);

    for c in 0..num_clusters {
        let center: Vec<f32> = (0..dim).map(|_| rng.next_unit()).collect();
        for i in 0..per_cluster {
            let point: Vec<f32> = center
                .iter()
                .map(|x| x + rng.next_unit() * 0.02)
                .collect();
            corpus.push((format!("item-{c:02}-{i:03}"), point));
        }
    }
    corpus
}

/// Embedding provider producing deterministic hash-derived vectors.
///
/// The same `(content, modality)` always maps to the same vector, so
/// pipeline and recommendation tests are fully reproducible.
pub struct FakeEmbeddingProvider {
    pub text_dims: usize,
    pub image_dims: usize,
    calls: AtomicUsize,
}

impl FakeEmbeddingProvider {
    pub fn new(text_dims: usize, image_dims: usize) -> Self {
        Self {
            text_dims,
            image_dims,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `embed` calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn derive(&self, content: &str, modality: Modality) -> Vec<f32> {
        let dim = self.dimensions(modality);
        let mut hasher = blake3::Hasher::new();
        hasher.update(modality.to_string().as_bytes());
        hasher.update(b":");
        hasher.update(content.as_bytes());

        let mut bytes = vec![0u8; dim * 4];
        hasher.finalize_xof().fill(&mut bytes);

        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let raw = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                (raw as f64 / u32::MAX as f64 * 2.0 - 1.0) as f32
            })
            .collect()
    }
}

impl EmbeddingProvider for FakeEmbeddingProvider {
    fn embed(&self, content: &str, modality: Modality) -> Result<Vec<f32>, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.derive(content, modality))
    }

    fn dimensions(&self, modality: Modality) -> usize {
        match modality {
            Modality::Text => self.text_dims,
            Modality::Image => self.image_dims,
        }
    }

    fn name(&self) -> &str {
        "fake-embed"
    }
}

/// Provider that fails for any content containing a registered marker.
/// Markers can be healed between cycles to model transient outages.
pub struct FlakyEmbeddingProvider {
    inner: FakeEmbeddingProvider,
    failing: Mutex<HashSet<String>>,
}

impl FlakyEmbeddingProvider {
    pub fn new(text_dims: usize, image_dims: usize) -> Self {
        Self {
            inner: FakeEmbeddingProvider::new(text_dims, image_dims),
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// Fail every embed whose content contains `marker`.
    pub fn fail_on(&self, marker: &str) {
        self.failing.lock().unwrap().insert(marker.to_string());
    }

    /// Stop failing for `marker`.
    pub fn heal(&self, marker: &str) {
        self.failing.lock().unwrap().remove(marker);
    }
}

impl EmbeddingProvider for FlakyEmbeddingProvider {
    fn embed(&self, content: &str, modality: Modality) -> Result<Vec<f32>, AdapterError> {
        let failing = self.failing.lock().unwrap();
        if failing.iter().any(|marker| content.contains(marker)) {
            return Err(AdapterError::Failed {
                provider: "flaky-embed".to_string(),
                reason: "simulated outage".to_string(),
            });
        }
        drop(failing);
        self.inner.embed(content, modality)
    }

    fn dimensions(&self, modality: Modality) -> usize {
        self.inner.dimensions(modality)
    }

    fn name(&self) -> &str {
        "flaky-embed"
    }
}

/// Provider that reports one dimensionality but returns another, modeling
/// a misbehaving external service.
pub struct WrongDimProvider {
    inner: FakeEmbeddingProvider,
}

impl WrongDimProvider {
    pub fn new(text_dims: usize, image_dims: usize) -> Self {
        Self {
            inner: FakeEmbeddingProvider::new(text_dims, image_dims),
        }
    }
}

impl EmbeddingProvider for WrongDimProvider {
    fn embed(&self, content: &str, modality: Modality) -> Result<Vec<f32>, AdapterError> {
        let mut vector = self.inner.embed(content, modality)?;
        vector.push(0.0);
        Ok(vector)
    }

    fn dimensions(&self, modality: Modality) -> usize {
        self.inner.dimensions(modality)
    }

    fn name(&self) -> &str {
        "wrong-dim-embed"
    }
}

/// Text generator returning a canned, deterministic explanation.
pub struct FakeTextGenerator;

impl TextGenerator for FakeTextGenerator {
    fn explain(&self, context: &ExplainContext) -> Result<String, AdapterError> {
        let text = match context {
            ExplainContext::Similarity {
                anchor_id,
                candidate_id,
                ..
            } => format!("{candidate_id} resembles {anchor_id}"),
            ExplainContext::QualityRisk {
                item_id,
                risk_level,
                ..
            } => format!("{item_id} classified {risk_level}"),
        };
        Ok(text)
    }

    fn name(&self) -> &str {
        "fake-textgen"
    }
}

/// Text generator that always times out.
pub struct FailingTextGenerator;

impl TextGenerator for FailingTextGenerator {
    fn explain(&self, _context: &ExplainContext) -> Result<String, AdapterError> {
        Err(AdapterError::Timeout {
            provider: "failing-textgen".to_string(),
            after_ms: 1,
        })
    }

    fn name(&self) -> &str {
        "failing-textgen"
    }
}

/// Mutable in-memory catalog for pipeline tests.
pub struct FixtureCatalog {
    items: Mutex<Vec<Item>>,
    reviews: Mutex<Vec<QualityEvidence>>,
}

impl FixtureCatalog {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items: Mutex::new(items),
            reviews: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reviews(items: Vec<Item>, reviews: Vec<QualityEvidence>) -> Self {
        Self {
            items: Mutex::new(items),
            reviews: Mutex::new(reviews),
        }
    }

    /// Replace an item's description and bump its modification time.
    pub fn update_description(&self, item_id: &str, description: &str) {
        let mut items = self.items.lock().unwrap();
        if let Some(item) = items.iter_mut().find(|i| i.item_id == item_id) {
            item.description = description.to_string();
            item.last_modified = Utc::now();
        }
    }

    /// Bump an item's modification time without changing its content.
    pub fn touch(&self, item_id: &str) {
        let mut items = self.items.lock().unwrap();
        if let Some(item) = items.iter_mut().find(|i| i.item_id == item_id) {
            item.last_modified = Utc::now();
        }
    }

    /// Append new items to the catalog.
    pub fn push_items(&self, new_items: Vec<Item>) {
        self.items.lock().unwrap().extend(new_items);
    }

    pub fn set_reviews(&self, reviews: Vec<QualityEvidence>) {
        *self.reviews.lock().unwrap() = reviews;
    }
}

impl ItemCatalog for FixtureCatalog {
    fn all_items(&self) -> InsightResult<Vec<Item>> {
        Ok(self.items.lock().unwrap().clone())
    }

    fn review_aggregates(&self) -> InsightResult<Vec<QualityEvidence>> {
        Ok(self.reviews.lock().unwrap().clone())
    }
}

/// `n` sample catalog items with distinct descriptions, modified in the
/// recent past.
pub fn sample_items(n: usize) -> Vec<Item> {
    let categories = ["electronics", "apparel", "home", "outdoors"];
    (0..n)
        .map(|i| {
            let modified: DateTime<Utc> = Utc::now() - Duration::minutes(30);
            Item {
                item_id: format!("prod-{i:03}"),
                category: categories[i % categories.len()].to_string(),
                price: 10.0 + i as f64,
                description: format!("sample product {i} with distinctive feature set {i}"),
                image_ref: None,
                last_modified: modified,
            }
        })
        .collect()
}

/// Review evidence helper.
pub fn evidence(item_id: &str, positive: u64, negative: u64, avg_rating: f64) -> QualityEvidence {
    QualityEvidence {
        item_id: item_id.to_string(),
        positive_reviews: positive,
        negative_reviews: negative,
        avg_rating,
    }
}
