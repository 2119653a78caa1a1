//! # insight-refresh
//!
//! The batch refresh pipeline: detects missing or stale embeddings,
//! recomputes them on a bounded worker pool, maintains the vector index
//! (incremental insert vs full rebuild on drift), regenerates quality
//! alerts wholesale, and publishes the new snapshot atomically. Per-item
//! failures never abort a cycle.

pub mod cancel;
pub mod pipeline;
pub mod worker;

pub use cancel::CancelToken;
pub use pipeline::RefreshPipeline;
