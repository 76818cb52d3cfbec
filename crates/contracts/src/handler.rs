//! SnapshotHandler trait - the consumer seam of the mux.

/// Consumer of merged configuration snapshots.
///
/// The pipeline agent calls `on_update` once per applied envelope, in
/// registration order, with the full flat snapshot across all sources. The
/// call runs synchronously inside the broadcast step: a slow handler delays
/// every later handler and all subsequent snapshots. Handlers that need
/// queuing or parallelism arrange it themselves.
///
/// Handlers must treat the snapshot as read-only; they may sort or copy it
/// internally.
pub trait SnapshotHandler<T>: Send {
    /// Receive the full merged snapshot after one applied update.
    fn on_update(&mut self, snapshot: &[T]);
}
