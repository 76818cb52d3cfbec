//! # Integration Tests
//!
//! End-to-end tests for the configuration pipelines.
//!
//! Responsibilities:
//! - Full producer -> mux -> handler flows for both entity kinds
//! - Merge semantics across concurrent sources
//! - Delivery guarantees (exactly-once per envelope, FIFO per source)

#[cfg(test)]
mod support {
    use contracts::{sorted_by_name, Named, SnapshotHandler};
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    /// Handler that forwards every snapshot, sorted by name, into a channel
    /// the test drains.
    pub struct RecordingHandler<T> {
        tx: mpsc::UnboundedSender<Vec<T>>,
    }

    impl<T: Named + Clone + Send> SnapshotHandler<T> for RecordingHandler<T> {
        fn on_update(&mut self, snapshot: &[T]) {
            let _ = self.tx.send(sorted_by_name(snapshot));
        }
    }

    pub fn recording_handler<T>() -> (RecordingHandler<T>, mpsc::UnboundedReceiver<Vec<T>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (RecordingHandler { tx }, rx)
    }

    pub async fn next_snapshot<T>(rx: &mut mpsc::UnboundedReceiver<Vec<T>>) -> Vec<T> {
        timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for snapshot")
            .expect("pipeline dropped")
    }

    pub async fn assert_no_snapshot<T>(rx: &mut mpsc::UnboundedReceiver<Vec<T>>) {
        let extra = timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(extra.is_err(), "unexpected extra snapshot delivered");
    }

    pub async fn wait_for(mut condition: impl FnMut() -> bool) {
        timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("condition not met in time");
    }
}

#[cfg(test)]
mod service_pipeline {
    use super::support::*;
    use config_mux::ServiceMux;
    use contracts::{PipelineConfig, Service, Update};

    #[tokio::test]
    async fn test_new_service_added_and_notified() {
        let mux = ServiceMux::services(PipelineConfig::default());
        let (handler, mut rx) = recording_handler();
        mux.register_handler(handler);

        let channel = mux.channel("one");
        channel
            .send(Update::add(vec![Service::new("foo", 10)]))
            .await
            .unwrap();

        assert_eq!(next_snapshot(&mut rx).await, vec![Service::new("foo", 10)]);
    }

    #[tokio::test]
    async fn test_service_added_removed_set_and_notified() {
        let mux = ServiceMux::services(PipelineConfig::default());
        let (handler, mut rx) = recording_handler();
        mux.register_handler(handler);

        let channel = mux.channel("one");

        channel
            .send(Update::add(vec![Service::new("foo", 10)]))
            .await
            .unwrap();
        assert_eq!(next_snapshot(&mut rx).await, vec![Service::new("foo", 10)]);

        channel
            .send(Update::add(vec![Service::new("bar", 20)]))
            .await
            .unwrap();
        assert_eq!(
            next_snapshot(&mut rx).await,
            vec![Service::new("bar", 20), Service::new("foo", 10)]
        );

        channel
            .send(Update::remove(vec![Service::new("foo", 0)]))
            .await
            .unwrap();
        assert_eq!(next_snapshot(&mut rx).await, vec![Service::new("bar", 20)]);

        channel
            .send(Update::set(vec![Service::new("foobar", 99)]))
            .await
            .unwrap();
        assert_eq!(next_snapshot(&mut rx).await, vec![Service::new("foobar", 99)]);
    }

    #[tokio::test]
    async fn test_multiple_sources_one_handler() {
        let mux = ServiceMux::services(PipelineConfig::default());
        let channel_one = mux.channel("one");
        let channel_two = mux.channel("two");
        assert!(!channel_one.same_channel(&channel_two));

        let (handler, mut rx) = recording_handler();
        mux.register_handler(handler);

        channel_one
            .send(Update::add(vec![Service::new("foo", 10)]))
            .await
            .unwrap();
        channel_two
            .send(Update::add(vec![Service::new("bar", 20)]))
            .await
            .unwrap();

        // Cross-source arrival order is unspecified; after both envelopes the
        // merged view must hold both entities.
        next_snapshot(&mut rx).await;
        assert_eq!(
            next_snapshot(&mut rx).await,
            vec![Service::new("bar", 20), Service::new("foo", 10)]
        );
    }

    #[tokio::test]
    async fn test_multiple_sources_multiple_handlers() {
        let mux = ServiceMux::services(PipelineConfig::default());
        let channel_one = mux.channel("one");
        let channel_two = mux.channel("two");

        let (handler1, mut rx1) = recording_handler();
        let (handler2, mut rx2) = recording_handler();
        mux.register_handler(handler1);
        mux.register_handler(handler2);

        channel_one
            .send(Update::add(vec![Service::new("foo", 10)]))
            .await
            .unwrap();
        channel_two
            .send(Update::add(vec![Service::new("bar", 20)]))
            .await
            .unwrap();

        // Every handler sees the same snapshots in the same order.
        for _ in 0..2 {
            let first = next_snapshot(&mut rx1).await;
            let second = next_snapshot(&mut rx2).await;
            assert_eq!(first, second);
        }
    }

    #[tokio::test]
    async fn test_channel_registration_idempotent() {
        let mux = ServiceMux::services(PipelineConfig::default());
        let first = mux.channel("a");
        let second = mux.channel("a");
        assert!(first.same_channel(&second));

        let (handler, mut rx) = recording_handler();
        mux.register_handler(handler);

        second
            .send(Update::add(vec![Service::new("foo", 10)]))
            .await
            .unwrap();

        assert_eq!(next_snapshot(&mut rx).await, vec![Service::new("foo", 10)]);
        assert_no_snapshot(&mut rx).await;
    }

    #[tokio::test]
    async fn test_exactly_one_notification_per_envelope() {
        let mux = ServiceMux::services(PipelineConfig::default());
        let (handler, mut rx) = recording_handler();
        mux.register_handler(handler);

        let channel = mux.channel("one");
        let envelopes = vec![
            Update::add(vec![Service::new("foo", 10)]),
            // no-op: remove of an absent name
            Update::remove(vec![Service::new("ghost", 0)]),
            // no-op: re-add of an identical entity
            Update::add(vec![Service::new("foo", 10)]),
            Update::set(vec![Service::new("foo", 10)]),
        ];
        let sent = envelopes.len();
        for envelope in envelopes {
            channel.send(envelope).await.unwrap();
        }

        for _ in 0..sent {
            assert_eq!(next_snapshot(&mut rx).await, vec![Service::new("foo", 10)]);
        }
        assert_no_snapshot(&mut rx).await;
        assert_eq!(mux.metrics().updates_applied(), sent as u64);
    }

    #[tokio::test]
    async fn test_fifo_within_source() {
        let mux = ServiceMux::services(PipelineConfig::default());
        let (handler, mut rx) = recording_handler();
        mux.register_handler(handler);

        let channel = mux.channel("one");
        for port in 1..=3u16 {
            channel
                .send(Update::add(vec![Service::new(format!("svc{port}"), port)]))
                .await
                .unwrap();
        }

        for expected_len in 1..=3usize {
            let snapshot = next_snapshot(&mut rx).await;
            assert_eq!(snapshot.len(), expected_len);
            assert_eq!(snapshot[expected_len - 1].port, expected_len as u16);
        }
    }

    #[tokio::test]
    async fn test_per_source_authority() {
        let mux = ServiceMux::services(PipelineConfig::default());
        let (handler, mut rx) = recording_handler();
        mux.register_handler(handler);

        let channel_one = mux.channel("one");
        let channel_two = mux.channel("two");

        channel_one
            .send(Update::add(vec![Service::new("foo", 10), Service::new("bar", 20)]))
            .await
            .unwrap();
        next_snapshot(&mut rx).await;

        // two asserting foo must not disturb one's view of foo
        channel_two
            .send(Update::set(vec![Service::new("foo", 99)]))
            .await
            .unwrap();
        let snapshot = next_snapshot(&mut rx).await;
        assert_eq!(snapshot.len(), 3, "duplicate name kept from both sources");

        channel_one
            .send(Update::remove(vec![Service::new("foo", 0)]))
            .await
            .unwrap();
        let snapshot = next_snapshot(&mut rx).await;

        // one contributes exactly {bar}; two still contributes {foo:99}
        assert_eq!(
            snapshot,
            vec![Service::new("bar", 20), Service::new("foo", 99)]
        );
    }

    #[tokio::test]
    async fn test_late_handler_receives_no_replay() {
        let mux = ServiceMux::services(PipelineConfig::default());
        let (early, mut early_rx) = recording_handler();
        mux.register_handler(early);

        let channel = mux.channel("one");
        channel
            .send(Update::add(vec![Service::new("foo", 10)]))
            .await
            .unwrap();
        next_snapshot(&mut early_rx).await;

        let (late, mut late_rx) = recording_handler();
        mux.register_handler(late);
        assert_no_snapshot(&mut late_rx).await;

        // The next applied update carries the full merged state to both.
        channel
            .send(Update::add(vec![Service::new("bar", 20)]))
            .await
            .unwrap();
        let expected = vec![Service::new("bar", 20), Service::new("foo", 10)];
        assert_eq!(next_snapshot(&mut early_rx).await, expected);
        assert_eq!(next_snapshot(&mut late_rx).await, expected);
    }

    #[tokio::test]
    async fn test_updates_without_handlers_still_applied() {
        let mux = ServiceMux::services(PipelineConfig::default());
        let channel = mux.channel("one");
        channel
            .send(Update::add(vec![Service::new("foo", 10)]))
            .await
            .unwrap();

        let metrics = mux.metrics();
        wait_for(|| metrics.updates_applied() == 1).await;
        assert_eq!(metrics.entity_count(), 1);

        let (handler, mut rx) = recording_handler();
        mux.register_handler(handler);
        channel
            .send(Update::add(vec![Service::new("bar", 20)]))
            .await
            .unwrap();

        assert_eq!(
            next_snapshot(&mut rx).await,
            vec![Service::new("bar", 20), Service::new("foo", 10)]
        );
    }
}

#[cfg(test)]
mod endpoints_pipeline {
    use super::support::*;
    use config_mux::EndpointsMux;
    use contracts::{Endpoints, PipelineConfig, Update};
    use tokio::sync::mpsc;

    fn eps<const N: usize>(name: &str, addresses: [&str; N]) -> Endpoints {
        Endpoints::new(name, addresses)
    }

    async fn expect_both(
        rx1: &mut mpsc::UnboundedReceiver<Vec<Endpoints>>,
        rx2: &mut mpsc::UnboundedReceiver<Vec<Endpoints>>,
        expected: Vec<Endpoints>,
    ) {
        assert_eq!(next_snapshot(rx1).await, expected);
        assert_eq!(next_snapshot(rx2).await, expected);
    }

    #[tokio::test]
    async fn test_multiple_sources_add_remove_set() {
        let mux = EndpointsMux::endpoints(PipelineConfig::default());
        let channel_one = mux.channel("one");
        let channel_two = mux.channel("two");

        let (handler1, mut rx1) = recording_handler();
        let (handler2, mut rx2) = recording_handler();
        mux.register_handler(handler1);
        mux.register_handler(handler2);

        channel_one
            .send(Update::add(vec![eps("foo", ["1.1.1.1:18080", "2.2.2.2:18081"])]))
            .await
            .unwrap();
        expect_both(
            &mut rx1,
            &mut rx2,
            vec![eps("foo", ["1.1.1.1:18080", "2.2.2.2:18081"])],
        )
        .await;

        channel_two
            .send(Update::add(vec![eps("bar", ["3.3.3.3:13306", "4.4.4.4:13306"])]))
            .await
            .unwrap();
        expect_both(
            &mut rx1,
            &mut rx2,
            vec![
                eps("bar", ["3.3.3.3:13306", "4.4.4.4:13306"]),
                eps("foo", ["1.1.1.1:18080", "2.2.2.2:18081"]),
            ],
        )
        .await;

        channel_two
            .send(Update::add(vec![eps("foobar", ["5.5.5.5:1234", "6.6.6.6:1234"])]))
            .await
            .unwrap();
        expect_both(
            &mut rx1,
            &mut rx2,
            vec![
                eps("bar", ["3.3.3.3:13306", "4.4.4.4:13306"]),
                eps("foo", ["1.1.1.1:18080", "2.2.2.2:18081"]),
                eps("foobar", ["5.5.5.5:1234", "6.6.6.6:1234"]),
            ],
        )
        .await;

        // Re-add of foo under the same source replaces its backend list.
        channel_one
            .send(Update::add(vec![eps("foo", ["7.7.7.7:8080"])]))
            .await
            .unwrap();
        expect_both(
            &mut rx1,
            &mut rx2,
            vec![
                eps("bar", ["3.3.3.3:13306", "4.4.4.4:13306"]),
                eps("foo", ["7.7.7.7:8080"]),
                eps("foobar", ["5.5.5.5:1234", "6.6.6.6:1234"]),
            ],
        )
        .await;

        channel_two
            .send(Update::remove(vec![eps("bar", [])]))
            .await
            .unwrap();
        expect_both(
            &mut rx1,
            &mut rx2,
            vec![
                eps("foo", ["7.7.7.7:8080"]),
                eps("foobar", ["5.5.5.5:1234", "6.6.6.6:1234"]),
            ],
        )
        .await;
    }
}

#[cfg(test)]
mod cross_pipeline {
    use super::support::*;
    use config_loader::{ConfigFormat, ConfigLoader};
    use config_mux::handlers::SnapshotCache;
    use config_mux::{EndpointsMux, ServiceMux};
    use contracts::{Endpoints, PipelineConfig, Service, Update};

    #[tokio::test]
    async fn test_pipelines_are_independent() {
        let services = ServiceMux::services(PipelineConfig::default());
        let endpoints = EndpointsMux::endpoints(PipelineConfig::default());

        let (service_handler, mut service_rx) = recording_handler();
        let (endpoints_handler, mut endpoints_rx) = recording_handler();
        services.register_handler(service_handler);
        endpoints.register_handler(endpoints_handler);

        // Same source name on both pipelines: two unrelated channels.
        services
            .channel("api")
            .send(Update::add(vec![Service::new("web", 80)]))
            .await
            .unwrap();
        endpoints
            .channel("api")
            .send(Update::add(vec![Endpoints::new("web", ["10.0.0.1:8080"])]))
            .await
            .unwrap();

        assert_eq!(next_snapshot(&mut service_rx).await, vec![Service::new("web", 80)]);
        assert_eq!(
            next_snapshot(&mut endpoints_rx).await,
            vec![Endpoints::new("web", ["10.0.0.1:8080"])]
        );
        assert_no_snapshot(&mut service_rx).await;
        assert_no_snapshot(&mut endpoints_rx).await;
    }

    const BOOTSTRAP_TOML: &str = r#"
[[services]]
name = "web"
port = 80

[[services]]
name = "db"
port = 5432

[[endpoints]]
name = "web"
addresses = ["10.1.0.1:8080"]
"#;

    #[tokio::test]
    async fn test_bootstrap_file_source_feeds_caches() {
        let bootstrap = ConfigLoader::load_from_str(BOOTSTRAP_TOML, ConfigFormat::Toml).unwrap();

        let services = ServiceMux::services(bootstrap.pipeline.clone());
        let endpoints = EndpointsMux::endpoints(bootstrap.pipeline.clone());

        let service_cache = SnapshotCache::new();
        let endpoints_cache = SnapshotCache::new();
        services.register_handler(service_cache.clone());
        endpoints.register_handler(endpoints_cache.clone());

        // A file-backed source cannot track deltas, so it publishes Set.
        services
            .channel("file")
            .send(Update::set(bootstrap.services.clone()))
            .await
            .unwrap();
        endpoints
            .channel("file")
            .send(Update::set(bootstrap.endpoints.clone()))
            .await
            .unwrap();

        wait_for(|| service_cache.len() == 2 && endpoints_cache.len() == 1).await;
        assert_eq!(service_cache.get("db"), Some(Service::new("db", 5432)));
        assert_eq!(
            endpoints_cache.get("web"),
            Some(Endpoints::new("web", ["10.1.0.1:8080"]))
        );
    }
}
