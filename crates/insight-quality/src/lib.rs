//! # insight-quality
//!
//! Deterministic quality-risk classification: an ordered decision list
//! over review evidence, plus wholesale alert generation with best-effort
//! explanations for risky tiers.

pub mod alerts;
pub mod rules;

pub use alerts::generate_alerts;
pub use rules::classify;
