//! pulsemeter exporter binary.
//!
//! Loads the YAML config, builds the registry and standard HTTP families,
//! and serves `/metrics` (text format 0.0.4) plus an instrumented
//! liveness route.

use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};

use pulsemeter_exporter::{app_state, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cfg = config::load_from_file("pulsemeter.yaml").expect("config load failed");
    let listen: SocketAddr = cfg
        .server
        .listen
        .parse()
        .expect("server.listen must be a valid SocketAddr");

    let state = app_state::AppState::new(cfg).expect("state build failed");
    let app = router::build_router(state);

    tracing::info!(%listen, "pulsemeter-exporter starting");
    let listener = tokio::net::TcpListener::bind(listen).await.expect("failed to bind");

    axum::serve(listener, app).await.expect("server failed");
}
