//! # insight-recommend
//!
//! The query-side surface: "items similar to this one" with anchor
//! exclusion, optional distance cutoff, deterministic tie-breaks, and
//! best-effort explanations, plus free-text semantic search.

pub mod engine;

pub use engine::RecommendationEngine;
