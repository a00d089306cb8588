//! Axum router wiring.
//!
//! Exposes the scrape endpoint plus a liveness route; the liveness route is
//! itself wrapped by the HTTP instrumentation as a built-in example of the
//! middleware in production wiring.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::app_state::AppState;
use crate::exposition::{self, TEXT_CONTENT_TYPE};
use crate::instrument;

pub fn build_router(state: AppState) -> Router {
    let instrumented = instrument::wrap(
        state.http_metrics(),
        "healthz",
        Router::new().route("/healthz", get(healthz)),
    );

    Router::new()
        .route("/metrics", get(metrics))
        .merge(instrumented)
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn metrics(axum::extract::State(state): axum::extract::State<AppState>) -> Response {
    let body = exposition::render_text(&state.registry().gather());

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)],
        body,
    )
        .into_response()
}
