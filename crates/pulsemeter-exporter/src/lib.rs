//! pulsemeter exporter library entry.
//!
//! This crate wires the scrape-side collaborators around the core metric
//! engine: the collector registry, the text exposition encoder, the HTTP
//! instrumentation middleware, and the config/router/state glue consumed
//! by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod exposition;
pub mod instrument;
pub mod registry;
pub mod router;
