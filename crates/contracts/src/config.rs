//! Pipeline and bootstrap configuration types.

use serde::{Deserialize, Serialize};

use crate::{Endpoints, Service};

/// Tuning for one mux pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Buffer size of each source channel and of the agent ingress.
    ///
    /// Producers block once this many envelopes are queued; this is the only
    /// back-pressure mechanism in the pipeline.
    pub channel_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 16,
        }
    }
}

/// Statically declared proxy configuration loaded at startup.
///
/// The optional `services` / `endpoints` lists seed a file-backed source,
/// which publishes them as `Set` envelopes alongside whatever the cluster
/// watcher source reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Pipeline tuning shared by both entity kinds
    pub pipeline: PipelineConfig,

    /// Statically declared services
    pub services: Vec<Service>,

    /// Statically declared endpoints
    pub endpoints: Vec<Endpoints>,
}
