use serde::{Deserialize, Serialize};

/// One ranked similar-item result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub item_id: String,
    /// Cosine distance from the anchor; lower is closer.
    pub distance: f64,
    /// 1-based rank after anchor exclusion and cutoff filtering.
    pub rank: usize,
    /// Best-effort natural-language explanation; omitted when the text
    /// generator is unavailable.
    pub explanation: Option<String>,
}
