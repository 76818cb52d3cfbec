//! Update envelope - one message on a source channel.

use serde::{Deserialize, Serialize};

use crate::{Endpoints, Service};

/// Per-source mutation kind.
///
/// The set is closed; operation codes arriving from outside the process
/// (config files, replay tooling) are rejected at deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Upsert the listed entities into the sending source's view
    Add,
    /// Remove the listed names from the sending source's view
    Remove,
    /// Replace the sending source's view with exactly the listed entities
    Set,
}

impl Operation {
    /// Lowercase label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Remove => "remove",
            Operation::Set => "set",
        }
    }
}

/// One update envelope: an operation plus the entities it applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update<T> {
    /// Mutation kind
    pub op: Operation,

    /// Entities the operation applies to
    pub entities: Vec<T>,
}

impl<T> Update<T> {
    /// Build an `Add` envelope.
    pub fn add(entities: Vec<T>) -> Self {
        Self {
            op: Operation::Add,
            entities,
        }
    }

    /// Build a `Remove` envelope.
    pub fn remove(entities: Vec<T>) -> Self {
        Self {
            op: Operation::Remove,
            entities,
        }
    }

    /// Build a `Set` envelope.
    pub fn set(entities: Vec<T>) -> Self {
        Self {
            op: Operation::Set,
            entities,
        }
    }
}

/// Envelope carried on a services source channel.
pub type ServiceUpdate = Update<Service>;

/// Envelope carried on an endpoints source channel.
pub type EndpointsUpdate = Update<Endpoints>;
