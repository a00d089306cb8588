//! Shared application state for the pulsemeter exporter.
//!
//! Wires the registry and the standard HTTP metric families from config.
//! Startup errors are explicit (Result instead of panic).

use std::sync::Arc;

use pulsemeter_core::{Clock, Result, SystemClock};

use crate::config::ExporterConfig;
use crate::instrument::HttpMetrics;
use crate::registry::Registry;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ExporterConfig,
    registry: Registry,
    http: Arc<HttpMetrics>,
}

impl AppState {
    /// Build application state with the production wall clock.
    pub fn new(cfg: ExporterConfig) -> Result<Self> {
        Self::with_clock(cfg, Arc::new(SystemClock))
    }

    /// Build application state with an explicit clock (tests inject a
    /// `SequenceClock` here).
    pub fn with_clock(cfg: ExporterConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let registry = Registry::new();
        let http = HttpMetrics::new(&registry, clock, cfg.summaries.opts()?)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, registry, http }),
        })
    }

    pub fn cfg(&self) -> &ExporterConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn http_metrics(&self) -> &Arc<HttpMetrics> {
        &self.inner.http
    }
}
