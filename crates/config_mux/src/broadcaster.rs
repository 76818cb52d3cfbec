//! Handler registry and snapshot broadcast.

use std::sync::{Mutex, MutexGuard};

use contracts::SnapshotHandler;

/// Mutex-guarded list of snapshot consumers.
///
/// Registration may race with broadcasts from the pipeline agent; the lock
/// makes a new handler visible atomically, so it observes the next broadcast
/// in full or not at all.
pub(crate) struct HandlerRegistry<T> {
    handlers: Mutex<Vec<Box<dyn SnapshotHandler<T>>>>,
}

impl<T> HandlerRegistry<T> {
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(Vec::new()),
        }
    }

    /// Append a handler. Registrations persist for the process lifetime.
    pub fn register(&self, handler: Box<dyn SnapshotHandler<T>>) {
        self.lock_handlers().push(handler);
    }

    /// Deliver one snapshot to every handler, in registration order.
    ///
    /// Runs each `on_update` synchronously; a slow handler holds up the rest.
    /// Returns the number of handlers notified.
    pub fn broadcast(&self, snapshot: &[T]) -> usize {
        let mut handlers = self.lock_handlers();
        for handler in handlers.iter_mut() {
            handler.on_update(snapshot);
        }
        handlers.len()
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.lock_handlers().len()
    }

    fn lock_handlers(&self) -> MutexGuard<'_, Vec<Box<dyn SnapshotHandler<T>>>> {
        self.handlers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
