//! Static Feed Example
//!
//! Feeds both configuration pipelines from a file-backed source (publishing
//! `Set` envelopes) and a simulated cluster watcher source (publishing
//! incremental `Add`/`Remove` traffic), then inspects the merged view through
//! a `SnapshotCache`.
//!
//! Run with: cargo run -p config_mux --example static_feed [proxy.toml]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use config_loader::ConfigLoader;
use config_mux::handlers::{LogHandler, SnapshotCache};
use config_mux::{EndpointsMux, ServiceMux};
use contracts::{BootstrapConfig, Endpoints, Operation, Service, Update};
use observability::metrics::{lock_aggregator, record_published, MuxStatsAggregator, StatsHandler};
use observability::{LogFormat, ObservabilityConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init_with_config(ObservabilityConfig {
        log_format: LogFormat::Compact,
        metrics_port: None,
        default_log_level: "info".to_string(),
    })?;

    // ==== Stage 1: bootstrap config (file argument or inline default) ====
    let bootstrap = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading bootstrap config");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        default_bootstrap()
    };

    // ==== Stage 2: pipelines and handlers ====
    let services = ServiceMux::services(bootstrap.pipeline.clone());
    let endpoints = EndpointsMux::endpoints(bootstrap.pipeline.clone());

    let aggregator = Arc::new(Mutex::new(MuxStatsAggregator::new()));
    let service_cache = SnapshotCache::new();
    let endpoints_cache = SnapshotCache::new();

    services.register_handler(LogHandler::new("services-debug"));
    services.register_handler(service_cache.clone());
    services.register_handler(StatsHandler::new("services", aggregator.clone()));

    endpoints.register_handler(LogHandler::new("endpoints-debug"));
    endpoints.register_handler(endpoints_cache.clone());
    endpoints.register_handler(StatsHandler::new("endpoints", aggregator.clone()));

    // ==== Stage 3: file source publishes the static config as Set ====
    services
        .channel("file")
        .send(Update::set(bootstrap.services.clone()))
        .await?;
    record_published("services", "file", Operation::Set);

    endpoints
        .channel("file")
        .send(Update::set(bootstrap.endpoints.clone()))
        .await?;
    record_published("endpoints", "file", Operation::Set);

    // ==== Stage 4: simulated watcher source publishes incremental traffic ====
    let watcher_services = services.channel("watcher");
    let watcher_endpoints = endpoints.channel("watcher");
    let watcher = tokio::spawn(async move {
        let canary = Service::new("canary", 9443);
        let canary_backends = Endpoints::new("canary", ["10.9.0.1:9443", "10.9.0.2:9443"]);

        watcher_services
            .send(Update::add(vec![canary.clone()]))
            .await?;
        record_published("services", "watcher", Operation::Add);
        watcher_endpoints
            .send(Update::add(vec![canary_backends.clone()]))
            .await?;
        record_published("endpoints", "watcher", Operation::Add);

        tokio::time::sleep(Duration::from_millis(200)).await;

        watcher_services
            .send(Update::remove(vec![canary]))
            .await?;
        record_published("services", "watcher", Operation::Remove);
        watcher_endpoints
            .send(Update::remove(vec![canary_backends]))
            .await?;
        record_published("endpoints", "watcher", Operation::Remove);

        anyhow::Ok(())
    });

    watcher.await??;

    // ==== Stage 5: wait for every published envelope to apply, then report ====
    let service_metrics = services.metrics();
    let endpoints_metrics = endpoints.metrics();
    tokio::time::timeout(Duration::from_secs(5), async {
        while service_metrics.updates_applied() < 3 || endpoints_metrics.updates_applied() < 3 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .map_err(|_| anyhow::anyhow!("merged view did not settle in time"))?;

    for service in service_cache.current() {
        tracing::info!(
            name = %service.name,
            port = service.port,
            "merged service"
        );
    }
    for record in endpoints_cache.current() {
        tracing::info!(
            name = %record.name,
            backends = record.addresses.len(),
            "merged endpoints"
        );
    }

    let guard = lock_aggregator(&aggregator);
    for kind in guard.kinds() {
        if let Some(summary) = guard.summary(&kind) {
            tracing::info!(
                kind = %kind,
                snapshots = summary.snapshots,
                entities = summary.last_entities,
                mean_entities = format!("{:.1}", summary.entity_stats.mean()),
                "pipeline summary"
            );
        }
    }

    Ok(())
}

fn default_bootstrap() -> BootstrapConfig {
    BootstrapConfig {
        services: vec![Service::new("web", 80), Service::new("db", 5432)],
        endpoints: vec![
            Endpoints::new("web", ["10.1.0.1:8080", "10.1.0.2:8080"]),
            Endpoints::new("db", ["10.2.0.1:5432"]),
        ],
        ..BootstrapConfig::default()
    }
}
