//! Error taxonomy for the insight workspace.
//!
//! Subsystem errors live in their own enums; `InsightError` aggregates them
//! and carries the query-path variants (`ItemNotFound`, `DimensionMismatch`,
//! `InvalidConfig`) directly. Index staleness is deliberately absent here:
//! it is a non-fatal warning on the query path, never an error.

pub mod adapter_error;
pub mod store_error;

pub use adapter_error::AdapterError;
pub use store_error::StoreError;

use thiserror::Error;

/// Top-level error type aggregating all subsystem errors.
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("item not found: {id}")]
    ItemNotFound { id: String },

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias used across the workspace.
pub type InsightResult<T> = Result<T, InsightError>;
