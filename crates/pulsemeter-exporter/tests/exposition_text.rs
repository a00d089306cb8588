//! Text exposition rendering: byte-deterministic output for a fixed
//! registry state.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use pulsemeter_core::{
    Counter, CounterVec, MetricDescriptor, SequenceClock, Summary, SummaryOpts,
};
use pulsemeter_exporter::exposition::{render_text, TEXT_CONTENT_TYPE};
use pulsemeter_exporter::registry::Registry;

fn t0() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
}

#[test]
fn renders_counters_and_summaries_deterministically() {
    let registry = Registry::new();

    let requests = Arc::new(CounterVec::new(
        MetricDescriptor::new(
            "http_requests_total",
            "Total HTTP requests.",
            &["code", "handler", "method"],
        )
        .unwrap(),
    ));
    requests
        .with_label_values(&["418", "test-handler", "get"])
        .unwrap()
        .inc_by_one();
    registry.register(requests).unwrap();

    let jobs = Arc::new(
        Counter::new(MetricDescriptor::new("jobs_total", "Jobs processed.", &[]).unwrap())
            .unwrap(),
    );
    jobs.inc(3.0).unwrap();
    registry.register(jobs).unwrap();

    let latency = Arc::new(
        Summary::new(
            MetricDescriptor::new("rpc_latency_seconds", "RPC latency.", &[]).unwrap(),
            SummaryOpts::default(),
            Arc::new(SequenceClock::new(t0(), [])),
        )
        .unwrap(),
    );
    latency.observe(40.0);
    latency.observe(42.0);
    registry.register(latency).unwrap();

    let rendered = render_text(&registry.gather());
    let expected = "\
# HELP http_requests_total Total HTTP requests.
# TYPE http_requests_total counter
http_requests_total{code=\"418\",handler=\"test-handler\",method=\"get\"} 1
# HELP jobs_total Jobs processed.
# TYPE jobs_total counter
jobs_total 3
# HELP rpc_latency_seconds RPC latency.
# TYPE rpc_latency_seconds summary
rpc_latency_seconds{quantile=\"0.5\"} 41
rpc_latency_seconds{quantile=\"0.9\"} 42
rpc_latency_seconds{quantile=\"0.99\"} 42
rpc_latency_seconds_sum 82
rpc_latency_seconds_count 2
";
    assert_eq!(rendered, expected);

    // scrapes of identical state are byte-identical
    assert_eq!(render_text(&registry.gather()), expected);
}

#[test]
fn escapes_label_values_and_help() {
    let registry = Registry::new();

    let vec = Arc::new(CounterVec::new(
        MetricDescriptor::new("files_total", "Paths with \\ and\nnewlines.", &["path"]).unwrap(),
    ));
    vec.with_label_values(&["C:\\tmp\\\"quoted\"\nfile"])
        .unwrap()
        .inc_by_one();
    registry.register(vec).unwrap();

    let rendered = render_text(&registry.gather());
    let expected = "\
# HELP files_total Paths with \\\\ and\\nnewlines.
# TYPE files_total counter
files_total{path=\"C:\\\\tmp\\\\\\\"quoted\\\"\\nfile\"} 1
";
    assert_eq!(rendered, expected);
}

#[test]
fn fractional_values_keep_their_precision() {
    let registry = Registry::new();
    let counter = Arc::new(
        Counter::new(MetricDescriptor::new("work_seconds_total", "", &[]).unwrap()).unwrap(),
    );
    counter.inc(1.5).unwrap();
    registry.register(counter).unwrap();

    let rendered = render_text(&registry.gather());
    assert!(rendered.contains("work_seconds_total 1.5\n"), "{rendered}");
}

#[test]
fn content_type_is_the_prometheus_text_version() {
    assert_eq!(TEXT_CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8");
}
