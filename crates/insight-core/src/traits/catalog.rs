use crate::errors::InsightResult;
use crate::models::{Item, QualityEvidence};

/// Read-only view of the external item catalog and its review aggregates.
pub trait ItemCatalog: Send + Sync {
    /// All items currently in the catalog.
    fn all_items(&self) -> InsightResult<Vec<Item>>;

    /// Per-item review aggregates, recomputed by the catalog.
    fn review_aggregates(&self) -> InsightResult<Vec<QualityEvidence>>;
}
