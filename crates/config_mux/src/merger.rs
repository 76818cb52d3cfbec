//! Merger - per-source authoritative maps and flat snapshots.

use std::collections::HashMap;

use contracts::{Named, Operation, Update};

/// Authoritative state of one pipeline: `source name -> entity name -> entity`.
///
/// Owned exclusively by the pipeline agent. Source entries are created
/// lazily on first update and persist for the process lifetime; an update
/// only ever touches the view of the source it arrived on.
#[derive(Debug)]
pub(crate) struct Merger<T> {
    by_source: HashMap<String, HashMap<String, T>>,
}

impl<T: Named + Clone> Merger<T> {
    pub fn new() -> Self {
        Self {
            by_source: HashMap::new(),
        }
    }

    /// Apply one envelope to the sending source's view.
    pub fn apply(&mut self, source: &str, update: Update<T>) {
        match update.op {
            Operation::Add => {
                let view = self.by_source.entry(source.to_string()).or_default();
                for entity in update.entities {
                    view.insert(entity.name().to_string(), entity);
                }
            }
            Operation::Remove => {
                // Missing names are a benign race, not an error. A remove
                // never creates a view for a source that has none.
                if let Some(view) = self.by_source.get_mut(source) {
                    for entity in &update.entities {
                        view.remove(entity.name());
                    }
                }
            }
            Operation::Set => {
                let view = update
                    .entities
                    .into_iter()
                    .map(|entity| (entity.name().to_string(), entity))
                    .collect();
                self.by_source.insert(source.to_string(), view);
            }
        }
    }

    /// Flat snapshot of every entity across every source.
    ///
    /// Two sources advertising the same name both contribute; the mux does
    /// not deduplicate. Each call returns a fresh allocation.
    pub fn snapshot(&self) -> Vec<T> {
        self.by_source
            .values()
            .flat_map(|view| view.values())
            .cloned()
            .collect()
    }

    /// Number of sources that have sent at least one update.
    pub fn source_count(&self) -> usize {
        self.by_source.len()
    }
}
