use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of one refresh cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    /// Items whose embedding was recomputed and stored.
    pub refreshed: usize,
    /// Items skipped because their content hash was unchanged.
    pub skipped_unchanged: usize,
    /// Items that failed embedding this cycle; retried next cycle.
    pub failed: usize,
    /// Whether the cycle ran a full index rebuild instead of
    /// incremental inserts.
    pub rebuilt_index: bool,
    /// Quality alerts written this cycle.
    pub alerts_written: usize,
    /// True when the cycle was cancelled before publishing.
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
