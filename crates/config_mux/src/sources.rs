//! Source channel registry - per-source ingress with fan-in to the agent.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use contracts::Update;
use tokio::sync::mpsc;
use tracing::debug;

/// Envelope tagged with its source, as consumed by the pipeline agent.
#[derive(Debug)]
pub(crate) struct SourceUpdate<T> {
    pub source: String,
    pub update: Update<T>,
}

/// Registry of per-source ingress channels.
///
/// Each source name owns one bounded channel; a mirror task per source
/// forwards its envelopes into the shared agent ingress, tagging them with
/// the source name. FIFO order within a source is preserved by the single
/// mirror; producers block once the source buffer and the ingress are full.
pub(crate) struct SourceSet<T> {
    capacity: usize,
    ingress: mpsc::Sender<SourceUpdate<T>>,
    senders: Mutex<HashMap<String, mpsc::Sender<Update<T>>>>,
}

impl<T: Send + 'static> SourceSet<T> {
    pub fn new(capacity: usize, ingress: mpsc::Sender<SourceUpdate<T>>) -> Self {
        Self {
            capacity,
            ingress,
            senders: Mutex::new(HashMap::new()),
        }
    }

    /// Return the ingress channel for `source`, creating it on first use.
    ///
    /// Idempotent per name: repeated calls hand back the same underlying
    /// channel. A source registered while the pipeline is running is picked
    /// up immediately; nothing sent after this call returns is lost.
    pub fn channel(&self, source: &str) -> mpsc::Sender<Update<T>> {
        let mut senders = self.lock_senders();
        if let Some(tx) = senders.get(source) {
            return tx.clone();
        }

        let (tx, rx) = mpsc::channel(self.capacity);
        senders.insert(source.to_string(), tx.clone());
        self.spawn_mirror(source.to_string(), rx);
        tx
    }

    /// Number of registered sources.
    pub fn len(&self) -> usize {
        self.lock_senders().len()
    }

    fn spawn_mirror(&self, source: String, mut rx: mpsc::Receiver<Update<T>>) {
        let ingress = self.ingress.clone();
        tokio::spawn(async move {
            debug!(source = %source, "source mirror started");
            while let Some(update) = rx.recv().await {
                let tagged = SourceUpdate {
                    source: source.clone(),
                    update,
                };
                if ingress.send(tagged).await.is_err() {
                    // agent gone; nothing left to feed
                    break;
                }
            }
            debug!(source = %source, "source mirror stopped");
        });
    }

    fn lock_senders(&self) -> MutexGuard<'_, HashMap<String, mpsc::Sender<Update<T>>>> {
        self.senders.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
