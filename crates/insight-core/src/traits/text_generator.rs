use crate::errors::AdapterError;
use crate::models::{QualityEvidence, RiskLevel};

/// Context handed to the text generator when asking for an explanation.
#[derive(Debug, Clone)]
pub enum ExplainContext {
    /// Why `candidate_id` is similar to `anchor_id`.
    Similarity {
        anchor_id: String,
        candidate_id: String,
        distance: f64,
    },
    /// Why an item landed at the given risk tier.
    QualityRisk {
        item_id: String,
        risk_level: RiskLevel,
        evidence: QualityEvidence,
    },
}

/// Natural-language explanation provider.
///
/// Best-effort everywhere: callers omit the explanation rather than
/// surface a failure to their own callers.
pub trait TextGenerator: Send + Sync {
    fn explain(&self, context: &ExplainContext) -> Result<String, AdapterError>;

    /// Human-readable generator name.
    fn name(&self) -> &str;
}
