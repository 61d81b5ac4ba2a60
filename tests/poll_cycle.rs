//! End-to-end poll cycles against an in-process fake Storm UI.

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{Value, json};
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
    time::Duration,
};
use storm_exporter::{
    CycleError, MetricRegistry, Poller, RegistryError, StormClient, UpstreamError, init_metrics,
};

#[derive(Clone, Default)]
struct FakeStorm {
    docs: Arc<Mutex<HashMap<String, Value>>>,
    slow: Arc<Mutex<HashSet<String>>>,
}

impl FakeStorm {
    fn with_cluster() -> Self {
        let fake = Self::default();
        fake.put(
            "/api/v1/cluster/summary",
            json!({
                "stormVersion": "2.6.0",
                "supervisors": 2,
                "topologies": 2,
                "slotsTotal": 8,
                "slotsUsed": 6,
                "slotsFree": 2,
                "executorsTotal": 28,
                "tasksTotal": 28,
                "totalMem": 1024,
                "availMem": 256.5,
                "memAssignedPercentUtil": "75.0",
                "totalCpu": 800,
                "availCpu": 200,
                "cpuAssignedPercentUtil": null,
            }),
        );
        fake.put(
            "/api/v1/nimbus/summary",
            json!({ "nimbuses": [
                { "host": "n1", "port": 6627, "status": "Leader" },
                { "host": "n2", "port": 6627, "status": "Not a Leader" },
            ]}),
        );
        fake.put(
            "/api/v1/supervisor/summary",
            json!({ "supervisors": [
                { "host": "sup-1", "uptimeSeconds": 3600, "slotsTotal": 4, "slotsUsed": 3,
                  "totalMem": 4096, "usedMem": 2304, "totalCpu": 400, "usedCpu": 120 },
                { "host": "sup-2", "uptimeSeconds": 1800, "slotsTotal": 4, "slotsUsed": 3 },
            ]}),
        );
        fake.put(
            "/api/v1/topology/summary",
            json!({ "topologies": [
                { "name": "wordcount", "id": "wordcount-1-1700000000", "status": "ACTIVE",
                  "uptimeSeconds": 120, "tasksTotal": 14, "workersTotal": 3, "executorsTotal": 14,
                  "replicationCount": 1, "requestedMemOnHeap": 1536, "requestedMemOffHeap": 0,
                  "requestedTotalMem": 1536, "requestedCpu": 140, "assignedMemOnHeap": 1536,
                  "assignedMemOffHeap": 0, "assignedTotalMem": 1536, "assignedCpu": 140 },
                { "name": "exclaim", "id": "exclaim-2-1700000100", "tasksTotal": 14 },
            ]}),
        );
        fake.put(
            "/api/v1/topology/wordcount-1-1700000000",
            json!({
                "name": "wordcount",
                "id": "wordcount-1-1700000000",
                "topologyStats": [
                    { "window": "600", "windowPretty": "10m 0s", "transferred": 1200,
                      "emitted": 1300, "completeLatency": "10.458", "acked": 1180, "failed": 3 },
                    { "window": ":all-time", "windowPretty": "All time", "transferred": 98000,
                      "emitted": 99000, "completeLatency": "9.900", "acked": 97000, "failed": null },
                ],
                "workers": [
                    { "host": "sup-1", "port": 6700, "assignedMemOnHeap": 768, "executorsTotal": 7,
                      "assignedCpu": 70, "componentNumTasks": { "split": 3, "count": 4 } },
                    { "host": "sup-2", "port": 6701, "assignedMemOnHeap": 768, "executorsTotal": 7,
                      "assignedCpu": 70, "componentNumTasks": {} },
                ],
                "spouts": [
                    { "spoutId": "sentences", "executors": 2, "emitted": 500, "completeLatency": "10.458",
                      "transferred": 500, "tasks": 2, "acked": 480, "failed": 1 },
                ],
                "bolts": [
                    { "boltId": "split", "processLatency": "0.125", "capacity": "0.031",
                      "executeLatency": "0.100", "executors": 6, "tasks": 6, "acked": 2000,
                      "failed": 0, "emitted": 4000 },
                ],
            }),
        );
        fake.put(
            "/api/v1/topology/exclaim-2-1700000100",
            json!({
                "topologyStats": [{ "window": "600", "emitted": 10 }],
                "workers": [],
                "spouts": [],
                "bolts": [{ "boltId": "exclaim1", "executors": 3 }],
            }),
        );
        fake
    }

    fn put(&self, path: &str, doc: Value) {
        self.docs.lock().unwrap().insert(path.to_owned(), doc);
    }

    fn make_slow(&self, path: &str) {
        self.slow.lock().unwrap().insert(path.to_owned());
    }

    async fn serve(self) -> String {
        let app = Router::new().fallback(answer).with_state(self);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        addr.to_string()
    }
}

async fn answer(State(fake): State<FakeStorm>, uri: Uri) -> Response {
    let path = uri.path().to_owned();
    if fake.slow.lock().unwrap().contains(&path) {
        tokio::time::sleep(Duration::from_secs(5)).await;
    }
    let doc = fake.docs.lock().unwrap().get(&path).cloned();
    match doc {
        Some(doc) => Json(doc).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn registry() -> Arc<MetricRegistry> {
    Arc::new(MetricRegistry::with_catalog(PrometheusBuilder::new().build_recorder()).unwrap())
}

async fn poller(fake: FakeStorm, registry: &Arc<MetricRegistry>, timeout: Duration) -> Poller {
    let host = fake.serve().await;
    let client = StormClient::new(&host, timeout).unwrap();
    Poller::new(client, Arc::clone(registry), Duration::from_millis(50))
}

fn value(rendered: &str, series: &str) -> Option<f64> {
    rendered.lines().find_map(|line| {
        line.strip_prefix(series)?
            .strip_prefix(' ')?
            .trim()
            .parse()
            .ok()
    })
}

/// Sample lines in a stable order, since series render in hash-map order.
fn sorted_samples(rendered: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = rendered
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();
    lines.sort_unstable();
    lines
}

const WC: &str = r#"TopologyName="wordcount",TopologyId="wordcount-1-1700000000""#;

#[tokio::test]
async fn full_cycle_publishes_every_document() {
    let registry = registry();
    let poller = poller(FakeStorm::with_cluster(), &registry, Duration::from_secs(2)).await;

    let report = poller.poll_once().await.unwrap();
    assert_eq!(report.supervisors, 2);
    assert_eq!(report.nimbuses, 2);
    assert_eq!(report.topologies, 2);
    assert_eq!(report.skipped_topologies, 0);

    let text = registry.render();

    assert_eq!(value(&text, "cluster_mem_total"), Some(1024.0));
    assert_eq!(value(&text, "cluster_free_worker_slots"), Some(2.0));
    assert_eq!(value(&text, "cluster_mem_avail"), Some(256.5));
    assert_eq!(value(&text, "cluster_mem_assigned_per_util"), Some(75.0));
    assert_eq!(value(&text, "cluster_cpu_assigned_per_util"), Some(0.0));

    assert_eq!(
        value(&text, r#"nimbus_status{Nimbus="n1",nimbus_status="Leader"}"#),
        Some(1.0)
    );
    assert_eq!(
        value(&text, r#"nimbus_status{Nimbus="n2",nimbus_status="Not a Leader"}"#),
        Some(1.0)
    );
    assert_eq!(
        value(&text, r#"nimbus_status{Nimbus="n2",nimbus_status="Leader"}"#),
        Some(0.0)
    );

    assert_eq!(
        value(&text, r#"supervisor_memory_used{Supervisor="sup-1"}"#),
        Some(2304.0)
    );
    assert_eq!(
        value(&text, r#"supervisor_cpu_used{Supervisor="sup-2"}"#),
        Some(0.0)
    );

    assert_eq!(value(&text, &format!("workers_total{{{WC}}}")), Some(3.0));
    assert_eq!(
        value(
            &text,
            r#"tasks_total{TopologyName="exclaim",TopologyId="exclaim-2-1700000100"}"#
        ),
        Some(14.0)
    );

    assert_eq!(
        value(&text, &format!(r#"topology_stats_complete_latency{{{WC},window="600"}}"#)),
        Some(10.458)
    );
    assert_eq!(
        value(&text, &format!(r#"topology_stats_failed{{{WC},window=":all-time"}}"#)),
        Some(0.0)
    );
    assert_eq!(
        value(&text, &format!(r#"topology_stats_trasferred{{{WC},window=":all-time"}}"#)),
        Some(98000.0)
    );

    assert_eq!(
        value(&text, &format!(r#"worker_executors{{{WC},Supervisor="sup-2",Port="6701"}}"#)),
        Some(7.0)
    );
    assert_eq!(
        value(
            &text,
            &format!(r#"worker_component_num_task{{{WC},Supervisor="sup-1",BoltId="count",Port="6700"}}"#)
        ),
        Some(4.0)
    );
    assert!(
        !text
            .lines()
            .any(|l| l.starts_with("worker_component_num_task") && l.contains(r#"Supervisor="sup-2""#)),
        "a worker with no components must not get component series"
    );

    assert_eq!(
        value(&text, &format!(r#"spouts_complete_latency{{{WC},SpoutId="sentences"}}"#)),
        Some(10.458)
    );
    assert_eq!(
        value(&text, &format!(r#"bolts_capacity{{{WC},BoltId="split"}}"#)),
        Some(0.031)
    );
    assert_eq!(
        value(
            &text,
            r#"bolts_executors{TopologyName="exclaim",TopologyId="exclaim-2-1700000100",BoltId="exclaim1"}"#
        ),
        Some(3.0)
    );
}

#[tokio::test]
async fn topology_without_id_is_skipped_and_others_still_publish() {
    let fake = FakeStorm::with_cluster();
    fake.put(
        "/api/v1/topology/summary",
        json!({ "topologies": [
            { "name": "broken", "tasksTotal": 99 },
            { "name": "wordcount", "id": "wordcount-1-1700000000", "workersTotal": 3 },
        ]}),
    );
    let registry = registry();
    let poller = poller(fake, &registry, Duration::from_secs(2)).await;

    let report = poller.poll_once().await.unwrap();
    assert_eq!(report.topologies, 1);
    assert_eq!(report.skipped_topologies, 1);

    let text = registry.render();
    assert!(!text.contains(r#"TopologyName="broken""#));
    assert_eq!(value(&text, &format!("workers_total{{{WC}}}")), Some(3.0));
    assert_eq!(
        value(&text, &format!(r#"bolts_emitted{{{WC},BoltId="split"}}"#)),
        Some(4000.0)
    );
}

#[tokio::test]
async fn polling_the_same_documents_twice_changes_nothing() {
    let registry = registry();
    let poller = poller(FakeStorm::with_cluster(), &registry, Duration::from_secs(2)).await;

    poller.poll_once().await.unwrap();
    let once = registry.render();
    poller.poll_once().await.unwrap();
    let twice = registry.render();
    assert_eq!(sorted_samples(&once), sorted_samples(&twice));
}

#[tokio::test]
async fn supervisor_that_disappears_keeps_its_last_values() {
    let fake = FakeStorm::with_cluster();
    let registry = registry();
    let poller = poller(fake.clone(), &registry, Duration::from_secs(2)).await;

    poller.poll_once().await.unwrap();
    fake.put(
        "/api/v1/supervisor/summary",
        json!({ "supervisors": [
            { "host": "sup-1", "uptimeSeconds": 3700, "slotsTotal": 4, "slotsUsed": 2 },
        ]}),
    );
    let report = poller.poll_once().await.unwrap();
    assert_eq!(report.supervisors, 1);

    let text = registry.render();
    assert_eq!(
        value(&text, r#"supervisor_slots_used{Supervisor="sup-1"}"#),
        Some(2.0)
    );
    assert_eq!(
        value(&text, r#"supervisor_uptime_second{Supervisor="sup-2"}"#),
        Some(1800.0)
    );
    assert_eq!(
        value(&text, r#"supervisor_slots_used{Supervisor="sup-2"}"#),
        Some(3.0)
    );
}

#[tokio::test]
async fn detail_timeout_fails_the_cycle() {
    let fake = FakeStorm::with_cluster();
    fake.make_slow("/api/v1/topology/wordcount-1-1700000000");
    let registry = registry();
    let poller = poller(fake, &registry, Duration::from_millis(200)).await;

    let err = poller.poll_once().await.unwrap_err();
    match &err {
        CycleError::Upstream(UpstreamError::Timeout { path, .. }) => {
            assert_eq!(path, "/api/v1/topology/wordcount-1-1700000000")
        }
        other => panic!("expected a timeout, got {other:?}"),
    }
    assert_eq!(err.exit_code(), 1);

    // The summary was written before the detail fetch, the detail never was.
    let text = registry.render();
    assert_eq!(value(&text, &format!("workers_total{{{WC}}}")), Some(3.0));
    assert!(!text.contains("spouts_emitted{"));
}

#[tokio::test]
async fn failed_detail_stops_before_the_next_topology_summary() {
    let fake = FakeStorm::with_cluster();
    fake.docs
        .lock()
        .unwrap()
        .remove("/api/v1/topology/wordcount-1-1700000000");
    let registry = registry();
    let poller = poller(fake, &registry, Duration::from_secs(2)).await;

    let err = poller.poll_once().await.unwrap_err();
    assert!(
        matches!(&err, CycleError::Upstream(UpstreamError::Status { path, .. }) if path == "/api/v1/topology/wordcount-1-1700000000"),
        "{err:?}"
    );

    let text = registry.render();
    assert_eq!(value(&text, &format!("workers_total{{{WC}}}")), Some(3.0));
    assert!(!text.contains(r#"TopologyName="exclaim""#));
}

#[tokio::test]
async fn missing_top_level_list_is_a_decode_failure() {
    let fake = FakeStorm::with_cluster();
    fake.put("/api/v1/nimbus/summary", json!({ "nimbusSummary": [] }));
    let registry = registry();
    let poller = poller(fake, &registry, Duration::from_secs(2)).await;

    let err = poller.poll_once().await.unwrap_err();
    assert!(
        matches!(&err, CycleError::Upstream(UpstreamError::Decode { path, .. }) if path == "/api/v1/nimbus/summary"),
        "{err:?}"
    );
}

#[tokio::test]
async fn http_errors_fail_the_cycle() {
    let fake = FakeStorm::with_cluster();
    fake.docs.lock().unwrap().remove("/api/v1/cluster/summary");
    let registry = registry();
    let poller = poller(fake, &registry, Duration::from_secs(2)).await;

    let err = poller.poll_once().await.unwrap_err();
    assert!(
        matches!(&err, CycleError::Upstream(UpstreamError::Status { status, .. }) if status.as_u16() == 404),
        "{err:?}"
    );
}

#[tokio::test]
async fn unknown_nimbus_status_is_an_invalid_state() {
    let fake = FakeStorm::with_cluster();
    fake.put(
        "/api/v1/nimbus/summary",
        json!({ "nimbuses": [{ "host": "n1", "status": "Offline" }] }),
    );
    let registry = registry();
    let poller = poller(fake, &registry, Duration::from_secs(2)).await;

    let err = poller.poll_once().await.unwrap_err();
    assert!(
        matches!(&err, CycleError::Registry(RegistryError::InvalidState { state, .. }) if state == "Offline"),
        "{err:?}"
    );
    assert_eq!(err.exit_code(), 3);
    assert!(!registry.render().contains(r#"Nimbus="n1""#));
}

#[tokio::test]
async fn concurrent_detail_fetches_publish_the_same_values() {
    let registry = registry();
    let poller = poller(FakeStorm::with_cluster(), &registry, Duration::from_secs(2))
        .await
        .with_detail_concurrency(4);

    let report = poller.poll_once().await.unwrap();
    assert_eq!(report.topologies, 2);

    let text = registry.render();
    assert_eq!(
        value(&text, &format!(r#"spouts_acked{{{WC},SpoutId="sentences"}}"#)),
        Some(480.0)
    );
    assert_eq!(
        value(
            &text,
            r#"topology_stats_emitted{TopologyName="exclaim",TopologyId="exclaim-2-1700000100",window="600"}"#
        ),
        Some(10.0)
    );
}

#[tokio::test]
async fn concurrent_detail_failure_fails_the_cycle() {
    let fake = FakeStorm::with_cluster();
    fake.docs
        .lock()
        .unwrap()
        .remove("/api/v1/topology/exclaim-2-1700000100");
    let registry = registry();
    let poller = poller(fake, &registry, Duration::from_secs(2))
        .await
        .with_detail_concurrency(2);

    let err = poller.poll_once().await.unwrap_err();
    assert!(
        matches!(&err, CycleError::Upstream(UpstreamError::Status { path, .. }) if path == "/api/v1/topology/exclaim-2-1700000100"),
        "{err:?}"
    );
}

#[tokio::test]
async fn run_returns_cleanly_on_shutdown() {
    let registry = registry();
    let poller = poller(FakeStorm::with_cluster(), &registry, Duration::from_secs(2)).await;

    let res = poller
        .run(tokio::time::sleep(Duration::from_millis(300)))
        .await;
    assert!(res.is_ok(), "{res:?}");
    assert_eq!(value(&registry.render(), "cluster_mem_total"), Some(1024.0));
}

#[tokio::test]
async fn run_shutdown_aborts_a_hung_request() {
    let fake = FakeStorm::with_cluster();
    fake.make_slow("/api/v1/supervisor/summary");
    let registry = registry();
    let poller = poller(fake, &registry, Duration::from_secs(30)).await;

    let res = tokio::time::timeout(
        Duration::from_secs(2),
        poller.run(tokio::time::sleep(Duration::from_millis(100))),
    )
    .await
    .expect("shutdown should not wait for the hung request");
    assert!(res.is_ok(), "{res:?}");
}

#[tokio::test]
async fn run_stops_on_the_first_failed_cycle() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();
    drop(listener);

    let client = StormClient::new(&host, Duration::from_secs(2)).unwrap();
    let poller = Poller::new(client, registry(), Duration::from_millis(50));

    let err = poller.run(std::future::pending()).await.unwrap_err();
    assert!(
        matches!(&err, CycleError::Upstream(UpstreamError::Transport { path, .. }) if path == "/api/v1/supervisor/summary"),
        "{err:?}"
    );
}

#[tokio::test]
async fn scrape_listener_serves_the_registry() {
    let probe = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = probe.local_addr().unwrap().port();
    drop(probe);

    let registry = init_metrics(port).unwrap();
    registry
        .set("cluster_free_worker_slots", &[] as &[&str], 2.0)
        .unwrap();

    let body = reqwest::get(format!("http://127.0.0.1:{port}/metrics"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(value(&body, "cluster_free_worker_slots"), Some(2.0));
}
