//! Stats aggregation for the configuration pipelines.
//!
//! The pipelines emit `proxy_config_*` series through the `metrics` facade
//! on their own; this module covers the producer side and in-memory
//! aggregation for run summaries.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use contracts::{Operation, SnapshotHandler};
use metrics::counter;

/// Record one envelope handed to a source channel.
///
/// Producer-side counterpart of the pipeline's `proxy_config_updates_total`;
/// the two drift apart only while envelopes sit in channel buffers.
pub fn record_published(kind: &str, source: &str, op: Operation) {
    counter!(
        "proxy_config_published_total",
        "kind" => kind.to_string(),
        "source" => source.to_string(),
        "op" => op.as_str()
    )
    .increment(1);
}

/// Running min/max/mean over observed values.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningStats {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Record one value.
    pub fn record(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Mean of the observed values; 0.0 before the first observation.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Per-pipeline aggregate over observed broadcasts.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineSummary {
    /// Broadcasts observed
    pub snapshots: u64,
    /// Entity count of the last observed snapshot
    pub last_entities: usize,
    /// Snapshot size statistics
    pub entity_stats: RunningStats,
}

/// In-memory aggregation of broadcast observations, keyed by pipeline kind.
#[derive(Debug, Default)]
pub struct MuxStatsAggregator {
    pipelines: HashMap<String, PipelineSummary>,
}

impl MuxStatsAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observed broadcast.
    pub fn observe_snapshot(&mut self, kind: &str, entities: usize) {
        let summary = self.pipelines.entry(kind.to_string()).or_default();
        summary.snapshots += 1;
        summary.last_entities = entities;
        summary.entity_stats.record(entities as f64);
    }

    /// Summary for one pipeline kind, if observed.
    pub fn summary(&self, kind: &str) -> Option<PipelineSummary> {
        self.pipelines.get(kind).copied()
    }

    /// All observed pipeline kinds.
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.pipelines.keys().cloned().collect();
        kinds.sort();
        kinds
    }
}

/// Snapshot handler feeding a shared [`MuxStatsAggregator`].
///
/// Register one per pipeline; clones of the aggregator handle stay readable
/// by the process that prints the run summary.
pub struct StatsHandler {
    kind: String,
    aggregator: Arc<Mutex<MuxStatsAggregator>>,
}

impl StatsHandler {
    /// Create a handler observing pipeline `kind` into `aggregator`.
    pub fn new(kind: impl Into<String>, aggregator: Arc<Mutex<MuxStatsAggregator>>) -> Self {
        Self {
            kind: kind.into(),
            aggregator,
        }
    }
}

impl<T> SnapshotHandler<T> for StatsHandler {
    fn on_update(&mut self, snapshot: &[T]) {
        lock_aggregator(&self.aggregator).observe_snapshot(&self.kind, snapshot.len());
    }
}

/// Lock helper shared by the handler and summary printers.
pub fn lock_aggregator(
    aggregator: &Arc<Mutex<MuxStatsAggregator>>,
) -> MutexGuard<'_, MuxStatsAggregator> {
    aggregator.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
