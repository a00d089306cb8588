//! HTTP handler instrumentation.
//!
//! Wrapping a router records, per completed request: request count,
//! request size, response size, and latency, each partitioned by
//! {code, handler, method}. The core imposes no knowledge of HTTP —
//! this module reduces each request to label strings and numeric
//! observations before touching the metric families.
//!
//! Latency is measured through the injected [`Clock`], so tests drive it
//! with a `SequenceClock` and assert exact durations.

use std::sync::Arc;

use axum::body::HttpBody;
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;

use pulsemeter_core::{Clock, CounterVec, MetricDescriptor, Result, SummaryOpts, SummaryVec};

use crate::registry::Registry;

const HTTP_LABELS: [&str; 3] = ["code", "handler", "method"];

/// The four standard HTTP metric families.
pub struct HttpMetrics {
    clock: Arc<dyn Clock>,
    requests: Arc<CounterVec>,
    duration: Arc<SummaryVec>,
    request_size: Arc<SummaryVec>,
    response_size: Arc<SummaryVec>,
}

impl HttpMetrics {
    /// Build the four families and register them with `registry`.
    pub fn new(registry: &Registry, clock: Arc<dyn Clock>, opts: SummaryOpts) -> Result<Arc<Self>> {
        let requests = Arc::new(CounterVec::new(MetricDescriptor::new(
            "http_requests_total",
            "Total HTTP requests processed, partitioned by status code, handler, and method.",
            &HTTP_LABELS,
        )?));
        let duration = Arc::new(SummaryVec::new(
            MetricDescriptor::new(
                "http_request_duration_seconds",
                "HTTP request latency in seconds.",
                &HTTP_LABELS,
            )?,
            opts.clone(),
            clock.clone(),
        )?);
        let request_size = Arc::new(SummaryVec::new(
            MetricDescriptor::new(
                "http_request_size_bytes",
                "Approximate HTTP request size in bytes.",
                &HTTP_LABELS,
            )?,
            opts.clone(),
            clock.clone(),
        )?);
        let response_size = Arc::new(SummaryVec::new(
            MetricDescriptor::new(
                "http_response_size_bytes",
                "HTTP response size in bytes.",
                &HTTP_LABELS,
            )?,
            opts,
            clock.clone(),
        )?);

        registry.register(requests.clone())?;
        registry.register(duration.clone())?;
        registry.register(request_size.clone())?;
        registry.register(response_size.clone())?;

        Ok(Arc::new(Self {
            clock,
            requests,
            duration,
            request_size,
            response_size,
        }))
    }

    fn record(
        &self,
        handler: &str,
        code: &str,
        method: &str,
        seconds: f64,
        request_bytes: f64,
        response_bytes: f64,
    ) {
        let labels = [code, handler, method];
        match (
            self.requests.with_label_values(&labels),
            self.duration.with_label_values(&labels),
            self.request_size.with_label_values(&labels),
            self.response_size.with_label_values(&labels),
        ) {
            (Ok(requests), Ok(duration), Ok(request_size), Ok(response_size)) => {
                requests.inc_by_one();
                duration.observe(seconds);
                request_size.observe(request_bytes);
                response_size.observe(response_bytes);
            }
            _ => {
                // unreachable: the tuple arity is fixed by HTTP_LABELS
                tracing::warn!(handler, "dropped HTTP observation on label mismatch");
            }
        }
    }
}

#[derive(Clone)]
struct InstrumentState {
    metrics: Arc<HttpMetrics>,
    handler: Arc<str>,
}

/// Wrap every route of `router` so completed requests are recorded under
/// `handler` in the four standard families.
pub fn wrap<S>(metrics: &Arc<HttpMetrics>, handler: &str, router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let state = InstrumentState {
        metrics: metrics.clone(),
        handler: Arc::from(handler),
    };
    router.layer(middleware::from_fn_with_state(state, track))
}

async fn track(State(state): State<InstrumentState>, request: Request, next: Next) -> Response {
    let started = state.metrics.clock.now();
    let method = request.method().as_str().to_ascii_lowercase();
    let request_bytes = approximate_request_size(&request);

    let response = next.run(request).await;

    let finished = state.metrics.clock.now();
    let seconds = finished
        .duration_since(started)
        .unwrap_or_default()
        .as_secs_f64();
    let code = response.status().as_u16().to_string();
    let response_bytes = response.body().size_hint().exact().unwrap_or(0);

    state.metrics.record(
        &state.handler,
        &code,
        &method,
        seconds,
        request_bytes as f64,
        response_bytes as f64,
    );

    response
}

/// Request line + headers + body length, mirroring what the request costs
/// on the wire without buffering the body.
fn approximate_request_size(request: &Request) -> u64 {
    let mut size = request.method().as_str().len() as u64;
    size += request.uri().to_string().len() as u64;
    for (name, value) in request.headers() {
        size += name.as_str().len() as u64;
        size += value.len() as u64;
    }
    if let Some(body_len) = request.body().size_hint().exact() {
        size += body_len;
    }
    size
}
