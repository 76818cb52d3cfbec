//! Per-pipeline counters for in-process inspection.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counters maintained by one pipeline agent.
#[derive(Debug, Default)]
pub struct MuxMetrics {
    /// Envelopes applied to the merger
    updates_applied: AtomicU64,
    /// Snapshots broadcast (one per applied envelope)
    snapshots_broadcast: AtomicU64,
    /// Individual handler notifications delivered
    notifications_delivered: AtomicU64,
    /// Entities in the latest snapshot
    entity_count: AtomicUsize,
    /// Sources that have sent at least one update
    source_count: AtomicUsize,
}

impl MuxMetrics {
    /// Create a zeroed metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one applied envelope and the resulting state size.
    pub(crate) fn record_applied(&self, entities: usize, sources: usize) {
        self.updates_applied.fetch_add(1, Ordering::Relaxed);
        self.entity_count.store(entities, Ordering::Relaxed);
        self.source_count.store(sources, Ordering::Relaxed);
    }

    /// Record one broadcast reaching `notified` handlers.
    pub(crate) fn record_broadcast(&self, notified: usize) {
        self.snapshots_broadcast.fetch_add(1, Ordering::Relaxed);
        self.notifications_delivered
            .fetch_add(notified as u64, Ordering::Relaxed);
    }

    /// Envelopes applied so far.
    pub fn updates_applied(&self) -> u64 {
        self.updates_applied.load(Ordering::Relaxed)
    }

    /// Snapshots broadcast so far.
    pub fn snapshots_broadcast(&self) -> u64 {
        self.snapshots_broadcast.load(Ordering::Relaxed)
    }

    /// Entities in the latest snapshot.
    pub fn entity_count(&self) -> usize {
        self.entity_count.load(Ordering::Relaxed)
    }

    /// Get a consistent-enough copy of all counters.
    pub fn snapshot(&self) -> MuxMetricsSnapshot {
        MuxMetricsSnapshot {
            updates_applied: self.updates_applied.load(Ordering::Relaxed),
            snapshots_broadcast: self.snapshots_broadcast.load(Ordering::Relaxed),
            notifications_delivered: self.notifications_delivered.load(Ordering::Relaxed),
            entity_count: self.entity_count.load(Ordering::Relaxed),
            source_count: self.source_count.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`MuxMetrics`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MuxMetricsSnapshot {
    pub updates_applied: u64,
    pub snapshots_broadcast: u64,
    pub notifications_delivered: u64,
    pub entity_count: usize,
    pub source_count: usize,
}
