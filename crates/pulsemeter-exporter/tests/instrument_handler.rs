//! End-to-end HTTP instrumentation: drive a wrapped handler through the
//! router once and assert the partitioned families.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use http_body_util::BodyExt;
use tower::util::ServiceExt;

use pulsemeter_core::{MetricKind, SequenceClock, SnapshotValue, SummaryOpts};
use pulsemeter_exporter::instrument::{self, HttpMetrics};
use pulsemeter_exporter::registry::Registry;

fn t0() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
}

async fn teapot() -> (StatusCode, &'static str) {
    (StatusCode::IM_A_TEAPOT, "Howdy there!")
}

#[tokio::test]
async fn instrumented_handler_partitions_by_code_handler_method() {
    // request starts at t0 and completes 30s later
    let clock = Arc::new(SequenceClock::new(t0(), [t0() + Duration::from_secs(30)]));
    let registry = Registry::new();
    let metrics = HttpMetrics::new(&registry, clock, SummaryOpts::default()).unwrap();

    let app = instrument::wrap(
        &metrics,
        "test-handler",
        Router::new().route("/", get(teapot)),
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"Howdy there!");

    let families = registry.gather();

    let requests = families
        .iter()
        .find(|f| f.name == "http_requests_total")
        .unwrap();
    assert_eq!(requests.kind, MetricKind::Counter);
    assert_eq!(requests.snapshots.len(), 1, "expected a single metric entry");

    let snap = &requests.snapshots[0];
    let pairs: Vec<(&str, &str)> = snap
        .labels
        .iter()
        .map(|p| (p.name.as_str(), p.value.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![("code", "418"), ("handler", "test-handler"), ("method", "get")]
    );
    assert_eq!(snap.value, SnapshotValue::Counter(1.0));

    // latency flows through the injected clock: exactly the 30s step
    let duration = families
        .iter()
        .find(|f| f.name == "http_request_duration_seconds")
        .unwrap();
    assert_eq!(duration.kind, MetricKind::Summary);
    match &duration.snapshots[0].value {
        SnapshotValue::Summary { count, sum, .. } => {
            assert_eq!(*count, 1);
            assert_eq!(*sum, 30.0);
        }
        other => panic!("expected summary value, got {other:?}"),
    }

    // response size observed from the body
    let response_size = families
        .iter()
        .find(|f| f.name == "http_response_size_bytes")
        .unwrap();
    match &response_size.snapshots[0].value {
        SnapshotValue::Summary { count, sum, .. } => {
            assert_eq!(*count, 1);
            assert_eq!(*sum, "Howdy there!".len() as f64);
        }
        other => panic!("expected summary value, got {other:?}"),
    }
}

#[tokio::test]
async fn each_status_code_gets_its_own_child() {
    let clock = Arc::new(SequenceClock::new(t0(), []));
    let registry = Registry::new();
    let metrics = HttpMetrics::new(&registry, clock, SummaryOpts::default()).unwrap();

    let router = Router::new()
        .route("/ok", get(|| async { StatusCode::OK }))
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }));
    let app = instrument::wrap(&metrics, "api", router);

    for uri in ["/ok", "/missing", "/missing"] {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        app.clone().oneshot(request).await.unwrap();
    }

    let families = registry.gather();
    let requests = families
        .iter()
        .find(|f| f.name == "http_requests_total")
        .unwrap();
    assert_eq!(requests.snapshots.len(), 2);

    // family snapshots sort by label tuple: ("200", ...) before ("404", ...)
    assert_eq!(requests.snapshots[0].value, SnapshotValue::Counter(1.0));
    assert_eq!(requests.snapshots[1].value, SnapshotValue::Counter(2.0));
}
