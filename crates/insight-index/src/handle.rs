//! Published-snapshot handle: readers pin an `Arc`, refresh cycles swap
//! the pointer atomically. No query ever observes a partially built index.

use std::sync::{Arc, RwLock};

use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::snapshot::IndexSnapshot;

/// The single "current index" pointer shared by query and refresh paths.
pub struct SnapshotHandle {
    current: RwLock<Arc<IndexSnapshot>>,
    stale_after: Duration,
}

impl SnapshotHandle {
    pub fn new(initial: IndexSnapshot, stale_snapshot_age_secs: u64) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
            stale_after: Duration::seconds(stale_snapshot_age_secs as i64),
        }
    }

    /// Pin the currently published snapshot. The returned `Arc` stays valid
    /// for the caller's whole query even if a rebuild publishes meanwhile.
    ///
    /// Serving from a snapshot older than the configured age logs a
    /// staleness warning; it is never an error.
    pub fn current(&self) -> Arc<IndexSnapshot> {
        let snapshot = self
            .current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        let age = Utc::now() - snapshot.built_at();
        if age > self.stale_after {
            warn!(
                snapshot = %snapshot.id(),
                age_secs = age.num_seconds(),
                "query served from stale index snapshot"
            );
        }
        snapshot
    }

    /// Atomically publish a new snapshot. In-flight readers keep their
    /// pinned snapshot until they drop it.
    pub fn publish(&self, snapshot: IndexSnapshot) {
        let snapshot = Arc::new(snapshot);
        info!(
            snapshot = %snapshot.id(),
            vectors = snapshot.len(),
            "index snapshot published"
        );
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = snapshot;
    }

    /// Whether the published snapshot has exceeded the configured age.
    pub fn is_stale(&self) -> bool {
        let snapshot = self.current.read().unwrap_or_else(|e| e.into_inner());
        Utc::now() - snapshot.built_at() > self.stale_after
    }
}
