//! Stock snapshot handlers.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use contracts::{sorted_by_name, Named, SnapshotHandler};
use tracing::info;

/// Handler that logs snapshot summaries for debugging.
pub struct LogHandler {
    name: String,
}

impl LogHandler {
    /// Create a new LogHandler with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl<T> SnapshotHandler<T> for LogHandler {
    fn on_update(&mut self, snapshot: &[T]) {
        info!(
            handler = %self.name,
            entities = snapshot.len(),
            "snapshot received"
        );
    }
}

/// Shared latest-snapshot store.
///
/// The handler half keeps the store current; clones of it are the read
/// surface a data plane polls between updates. Entries are kept sorted by
/// name for stable iteration; duplicate names from different sources are
/// retained as delivered.
#[derive(Debug, Clone)]
pub struct SnapshotCache<T> {
    inner: Arc<RwLock<Vec<T>>>,
}

impl<T> Default for SnapshotCache<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl<T: Named + Clone> SnapshotCache<T> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the latest snapshot, sorted by name.
    pub fn current(&self) -> Vec<T> {
        self.read_entries().clone()
    }

    /// Look up one entity by name.
    ///
    /// With duplicate names across sources this returns the first in sort
    /// order; consumers that care about duplicates scan [`current`].
    ///
    /// [`current`]: SnapshotCache::current
    pub fn get(&self, name: &str) -> Option<T> {
        self.read_entries()
            .iter()
            .find(|entity| entity.name() == name)
            .cloned()
    }

    /// Number of entities in the latest snapshot.
    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    /// Whether no snapshot content is held.
    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, Vec<T>> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T> SnapshotHandler<T> for SnapshotCache<T>
where
    T: Named + Clone + Send + Sync,
{
    fn on_update(&mut self, snapshot: &[T]) {
        *self.write_entries() = sorted_by_name(snapshot);
    }
}
