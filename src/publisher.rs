use crate::models::Snapshot;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Holds the one snapshot visible to readers.
///
/// Readers get their own `Arc` and keep it across later publishes. The write
/// lock is only taken for the pointer swap; building the next snapshot
/// happens before `publish` is called.
pub struct SnapshotPublisher {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotPublisher {
    /// Create a publisher that exposes `initial` as generation 1
    pub fn new(initial: Snapshot) -> Self {
        let mut initial = initial;
        initial.generation = 1;
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// Currently visible snapshot
    pub async fn read(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.current.read().await)
    }

    /// Replace the visible snapshot. The new snapshot gets the next
    /// generation number, so publishes are totally ordered.
    pub async fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let mut snapshot = snapshot;
        let mut current = self.current.write().await;
        snapshot.generation = current.generation + 1;

        let published = Arc::new(snapshot);
        let previous = std::mem::replace(&mut *current, Arc::clone(&published));
        drop(current);

        info!(
            "Published snapshot generation {} ({} current, {} history, loaded at {})",
            published.generation,
            published.current.len(),
            published.history.len(),
            published.loaded_at
        );
        drop(previous);

        published
    }

    /// Generation of the visible snapshot
    pub async fn generation(&self) -> u64 {
        self.current.read().await.generation
    }
}
