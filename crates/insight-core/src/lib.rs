//! # insight-core
//!
//! Foundation crate for the insight similarity and quality-risk engine.
//! Defines all types, traits, errors, and config.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod errors;
pub mod hashing;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::InsightConfig;
pub use errors::{InsightError, InsightResult};
pub use models::{
    Embedding, Item, Modality, QualityAlert, QualityEvidence, Recommendation, RiskLevel,
};
