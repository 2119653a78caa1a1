use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog item. Owned by the external catalog and read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub item_id: String,
    pub category: String,
    pub price: f64,
    pub description: String,
    /// Reference to the item's image, embedded under `Modality::Image`
    /// when present.
    pub image_ref: Option<String>,
    /// Last catalog modification; drives embedding staleness.
    pub last_modified: DateTime<Utc>,
}
