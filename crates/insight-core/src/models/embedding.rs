use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Embedding modality. Dimensions are fixed per modality across the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Text,
    Image,
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modality::Text => write!(f, "text"),
            Modality::Image => write!(f, "image"),
        }
    }
}

impl FromStr for Modality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Modality::Text),
            "image" => Ok(Modality::Image),
            other => Err(format!("unknown modality: {other}")),
        }
    }
}

/// One stored embedding version for an `(item_id, modality)` pair.
///
/// Embeddings are superseded, never mutated: a refresh writes a new current
/// version and retires the old one, which is retained for rollback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embedding {
    pub item_id: String,
    pub modality: Modality,
    pub vector: Vec<f32>,
    pub dim: usize,
    pub created_at: DateTime<Utc>,
    /// Version tag of the model that produced the vector.
    pub source_version: String,
    /// Blake3 hash of the embedded content; change-detection key.
    pub content_hash: String,
}
