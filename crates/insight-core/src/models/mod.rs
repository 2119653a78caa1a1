//! Data model: catalog items, embeddings, quality signals, and results.

pub mod cycle_report;
pub mod embedding;
pub mod item;
pub mod quality;
pub mod recommendation;

pub use cycle_report::CycleReport;
pub use embedding::{Embedding, Modality};
pub use item::Item;
pub use quality::{QualityAlert, QualityEvidence, RiskLevel};
pub use recommendation::Recommendation;
