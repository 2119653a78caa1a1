//! # insight-store
//!
//! SQLite persistence layer: versioned embedding storage (supersede, never
//! mutate) with retention and rollback, plus the latest-only quality-alert
//! feed consumed by external dashboards.

pub mod engine;
pub mod migrations;
pub mod pragmas;
pub mod queries;

pub use engine::EmbeddingStore;
pub use queries::embedding_ops::EmbeddingVersion;

use insight_core::errors::{InsightError, StoreError};

/// Wrap an SQLite failure message into the workspace error type.
pub(crate) fn to_store_err(message: impl Into<String>) -> InsightError {
    StoreError::Sqlite {
        message: message.into(),
    }
    .into()
}
