//! Workspace configuration, loaded from TOML with per-section defaults.
//!
//! `InsightConfig::validate` is the only fatal error site in the system:
//! a process must not come up with conflicting dimension or index config.

pub mod defaults;

use serde::{Deserialize, Serialize};

use crate::errors::{InsightError, InsightResult};
use crate::models::Modality;

/// Top-level configuration for all subsystems.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    pub store: StoreConfig,
    pub embedding: EmbeddingConfig,
    pub index: IndexConfig,
    pub recommend: RecommendConfig,
    pub quality: QualityConfig,
    pub refresh: RefreshConfig,
}

impl InsightConfig {
    /// Parse and validate configuration from a TOML string. Missing
    /// sections and fields fall back to defaults.
    pub fn from_toml(s: &str) -> InsightResult<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| InsightError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Startup validation.
    pub fn validate(&self) -> InsightResult<()> {
        if self.embedding.text_dims == 0 || self.embedding.image_dims == 0 {
            return Err(InsightError::InvalidConfig(
                "embedding dimensions must be non-zero".to_string(),
            ));
        }
        if self.store.version_retention == 0 {
            return Err(InsightError::InvalidConfig(
                "store.version_retention must be at least 1".to_string(),
            ));
        }
        if self.index.num_lists == 0 {
            return Err(InsightError::InvalidConfig(
                "index.num_lists must be non-zero".to_string(),
            ));
        }
        if self.index.probe_lists == 0 || self.index.probe_lists > self.index.num_lists {
            return Err(InsightError::InvalidConfig(format!(
                "index.probe_lists must be in 1..={}, got {}",
                self.index.num_lists, self.index.probe_lists
            )));
        }
        if !(self.refresh.drift_rebuild_fraction > 0.0
            && self.refresh.drift_rebuild_fraction <= 1.0)
        {
            return Err(InsightError::InvalidConfig(format!(
                "refresh.drift_rebuild_fraction must be in (0.0, 1.0], got {}",
                self.refresh.drift_rebuild_fraction
            )));
        }
        if self.quality.medium_risk_max_rating < self.quality.high_risk_max_rating {
            return Err(InsightError::InvalidConfig(
                "quality.medium_risk_max_rating must not be below high_risk_max_rating"
                    .to_string(),
            ));
        }
        if self.quality.monitor_max_rating < self.quality.medium_risk_max_rating {
            return Err(InsightError::InvalidConfig(
                "quality.monitor_max_rating must not be below medium_risk_max_rating"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// SQLite store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub db_path: String,
    pub wal_mode: bool,
    pub busy_timeout_ms: u64,
    /// Retired embedding versions retained per `(item_id, modality)`.
    pub version_retention: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: defaults::DEFAULT_DB_PATH.to_string(),
            wal_mode: true,
            busy_timeout_ms: defaults::DEFAULT_BUSY_TIMEOUT_MS,
            version_retention: defaults::DEFAULT_VERSION_RETENTION,
        }
    }
}

/// Fixed embedding dimensions per modality.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub text_dims: usize,
    pub image_dims: usize,
}

impl EmbeddingConfig {
    /// The configured dimension for a modality.
    pub fn dim_for(&self, modality: Modality) -> usize {
        match modality {
            Modality::Text => self.text_dims,
            Modality::Image => self.image_dims,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            text_dims: defaults::DEFAULT_TEXT_DIMS,
            image_dims: defaults::DEFAULT_IMAGE_DIMS,
        }
    }
}

/// IVF index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Modality the similarity index is built over.
    pub modality: Modality,
    /// Coarse clusters (inverted lists) at build time.
    pub num_lists: usize,
    /// Lists probed per query; the recall/latency trade-off knob.
    pub probe_lists: usize,
    pub max_kmeans_iters: usize,
    /// Seed for centroid initialization; fixed for reproducible builds.
    pub seed: u64,
    /// Snapshot age past which queries log a staleness warning.
    pub stale_snapshot_age_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            modality: Modality::Text,
            num_lists: defaults::DEFAULT_NUM_LISTS,
            probe_lists: defaults::DEFAULT_PROBE_LISTS,
            max_kmeans_iters: defaults::DEFAULT_MAX_KMEANS_ITERS,
            seed: defaults::DEFAULT_KMEANS_SEED,
            stale_snapshot_age_secs: defaults::DEFAULT_STALE_SNAPSHOT_AGE_SECS,
        }
    }
}

/// Recommendation policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    /// Results with distance above this cutoff are dropped. `None`
    /// disables the cutoff.
    pub distance_cutoff: Option<f64>,
    /// Whether to request explanations from the text generator.
    pub explain: bool,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            distance_cutoff: Some(defaults::DEFAULT_DISTANCE_CUTOFF),
            explain: true,
        }
    }
}

/// Quality classifier thresholds. Defaults follow the ordered rule table;
/// every threshold is tunable without reordering the rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Rule 1: negative > positive AND avg_rating below this.
    pub high_risk_max_rating: f64,
    /// Rule 2: negative above this AND avg_rating below
    /// `medium_risk_max_rating`.
    pub medium_risk_min_negative: u64,
    pub medium_risk_max_rating: f64,
    /// Rule 3: avg_rating below this AND any negative reviews.
    pub monitor_max_rating: f64,
    /// Request explanations for medium/high tiers.
    pub explain_risky: bool,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            high_risk_max_rating: defaults::DEFAULT_HIGH_RISK_MAX_RATING,
            medium_risk_min_negative: defaults::DEFAULT_MEDIUM_RISK_MIN_NEGATIVE,
            medium_risk_max_rating: defaults::DEFAULT_MEDIUM_RISK_MAX_RATING,
            monitor_max_rating: defaults::DEFAULT_MONITOR_MAX_RATING,
            explain_risky: true,
        }
    }
}

/// Refresh pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Worker pool width for embedding calls.
    pub max_concurrent_embeds: usize,
    /// Per-item embedding call timeout.
    pub embed_timeout_ms: u64,
    /// Retries per item before it is marked failed-this-cycle.
    pub max_retries: u32,
    /// Base delay for exponential backoff between retries.
    pub backoff_base_ms: u64,
    /// Fraction of inserted-since-build over total size that triggers a
    /// full rebuild instead of incremental inserts.
    pub drift_rebuild_fraction: f64,
    /// Max entries in the content-hash embedding cache.
    pub embed_cache_size: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            max_concurrent_embeds: defaults::DEFAULT_MAX_CONCURRENT_EMBEDS,
            embed_timeout_ms: defaults::DEFAULT_EMBED_TIMEOUT_MS,
            max_retries: defaults::DEFAULT_MAX_RETRIES,
            backoff_base_ms: defaults::DEFAULT_BACKOFF_BASE_MS,
            drift_rebuild_fraction: defaults::DEFAULT_DRIFT_REBUILD_FRACTION,
            embed_cache_size: defaults::DEFAULT_EMBED_CACHE_SIZE,
        }
    }
}
