//! Default configuration values.

// Store
pub const DEFAULT_DB_PATH: &str = "insight.db";
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_VERSION_RETENTION: usize = 3;

// Embedding dimensions (text-embedding / multimodal-embedding model pair)
pub const DEFAULT_TEXT_DIMS: usize = 768;
pub const DEFAULT_IMAGE_DIMS: usize = 1408;

// Index
pub const DEFAULT_NUM_LISTS: usize = 16;
pub const DEFAULT_PROBE_LISTS: usize = 4;
pub const DEFAULT_MAX_KMEANS_ITERS: usize = 25;
pub const DEFAULT_KMEANS_SEED: u64 = 42;
pub const DEFAULT_STALE_SNAPSHOT_AGE_SECS: u64 = 86_400;

// Recommendation
pub const DEFAULT_DISTANCE_CUTOFF: f64 = 0.35;

// Quality thresholds
pub const DEFAULT_HIGH_RISK_MAX_RATING: f64 = 3.0;
pub const DEFAULT_MEDIUM_RISK_MIN_NEGATIVE: u64 = 5;
pub const DEFAULT_MEDIUM_RISK_MAX_RATING: f64 = 3.5;
pub const DEFAULT_MONITOR_MAX_RATING: f64 = 4.0;

// Refresh
pub const DEFAULT_MAX_CONCURRENT_EMBEDS: usize = 8;
pub const DEFAULT_EMBED_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 200;
pub const DEFAULT_DRIFT_REBUILD_FRACTION: f64 = 0.25;
pub const DEFAULT_EMBED_CACHE_SIZE: u64 = 10_000;
