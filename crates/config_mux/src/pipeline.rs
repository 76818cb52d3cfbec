//! Pipeline composition - sources, merger, broadcaster under one agent.

use std::sync::Arc;
use std::time::Instant;

use contracts::{Endpoints, Named, PipelineConfig, Service, SnapshotHandler, Update};
use metrics::{counter, gauge, histogram};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::broadcaster::HandlerRegistry;
use crate::merger::Merger;
use crate::metrics::MuxMetrics;
use crate::sources::{SourceSet, SourceUpdate};

/// One configuration pipeline, parameterised by entity kind.
///
/// Construction spawns the agent task that owns the merger state; sources and
/// handlers may then be added in any order, from any task. The pipeline runs
/// for as long as this handle (or any source channel) is alive.
///
/// Must be created from within a Tokio runtime.
#[derive(Clone)]
pub struct ConfigMux<T> {
    kind: &'static str,
    sources: Arc<SourceSet<T>>,
    handlers: Arc<HandlerRegistry<T>>,
    metrics: Arc<MuxMetrics>,
}

/// Services pipeline.
pub type ServiceMux = ConfigMux<Service>;

/// Endpoints pipeline.
pub type EndpointsMux = ConfigMux<Endpoints>;

impl ConfigMux<Service> {
    /// Create the services pipeline.
    pub fn services(config: PipelineConfig) -> Self {
        Self::new("services", config)
    }
}

impl ConfigMux<Endpoints> {
    /// Create the endpoints pipeline.
    pub fn endpoints(config: PipelineConfig) -> Self {
        Self::new("endpoints", config)
    }
}

impl<T> ConfigMux<T>
where
    T: Named + Clone + Send + 'static,
{
    /// Create a pipeline labelled `kind` and spawn its agent.
    pub fn new(kind: &'static str, config: PipelineConfig) -> Self {
        let (ingress_tx, ingress_rx) = mpsc::channel(config.channel_capacity);
        let sources = Arc::new(SourceSet::new(config.channel_capacity, ingress_tx));
        let handlers = Arc::new(HandlerRegistry::new());
        let metrics = Arc::new(MuxMetrics::new());

        tokio::spawn(run_agent(
            kind,
            ingress_rx,
            handlers.clone(),
            metrics.clone(),
        ));

        Self {
            kind,
            sources,
            handlers,
            metrics,
        }
    }

    /// Return the update channel for the named source, creating it on first
    /// use.
    ///
    /// Idempotent per name; distinct names yield distinct channels. The
    /// returned sender is the sole ingress for that source. Its buffer is
    /// bounded by the pipeline's `channel_capacity`; producers that outrun
    /// the agent block on `send`. Closing the channel is not part of the
    /// protocol - the source's merged state persists either way.
    pub fn channel(&self, source: &str) -> mpsc::Sender<Update<T>> {
        debug!(kind = self.kind, source = %source, "source channel requested");
        self.sources.channel(source)
    }

    /// Register a snapshot handler.
    ///
    /// Handlers registered after updates have flowed receive subsequent
    /// snapshots only - the current state is not replayed. Updates applied
    /// while no handler is registered still mutate the merged state; they
    /// simply go unobserved.
    pub fn register_handler<H>(&self, handler: H)
    where
        H: SnapshotHandler<T> + 'static,
    {
        self.handlers.register(Box::new(handler));
        debug!(
            kind = self.kind,
            handlers = self.handlers.len(),
            "handler registered"
        );
    }

    /// Counters maintained by this pipeline's agent.
    pub fn metrics(&self) -> Arc<MuxMetrics> {
        self.metrics.clone()
    }

    /// Number of registered sources.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

/// Agent loop: the single consumer owning the merger state.
///
/// Applies envelopes in arrival order and broadcasts the resulting snapshot
/// after every one, including no-ops. Exits when every source mirror and the
/// pipeline handle are gone.
async fn run_agent<T>(
    kind: &'static str,
    mut ingress: mpsc::Receiver<SourceUpdate<T>>,
    handlers: Arc<HandlerRegistry<T>>,
    metrics: Arc<MuxMetrics>,
) where
    T: Named + Clone + Send + 'static,
{
    let mut merger = Merger::new();
    info!(kind, "config mux agent started");

    while let Some(SourceUpdate { source, update }) = ingress.recv().await {
        let op = update.op;
        let entities = update.entities.len();

        merger.apply(&source, update);
        let snapshot = merger.snapshot();

        counter!(
            "proxy_config_updates_total",
            "kind" => kind,
            "source" => source.clone(),
            "op" => op.as_str()
        )
        .increment(1);
        gauge!("proxy_config_entities", "kind" => kind).set(snapshot.len() as f64);
        metrics.record_applied(snapshot.len(), merger.source_count());

        let started = Instant::now();
        let notified = handlers.broadcast(&snapshot);
        histogram!("proxy_config_broadcast_ms", "kind" => kind)
            .record(started.elapsed().as_secs_f64() * 1000.0);
        metrics.record_broadcast(notified);

        debug!(
            kind,
            source = %source,
            op = op.as_str(),
            entities,
            snapshot = snapshot.len(),
            handlers = notified,
            "update applied"
        );
    }

    info!(kind, "config mux agent stopped");
}
