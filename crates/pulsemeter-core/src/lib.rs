//! pulsemeter core: metric primitives for in-process instrumentation.
//!
//! This crate defines the hot-path metric engine shared by embedding
//! services and the exporter: monotonic counters, streaming quantile
//! summaries with a rolling decay window, and label-keyed metric families.
//! It intentionally carries no transport or runtime dependencies so it can
//! be embedded anywhere.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `PulseError`/`Result` so an
//! instrumented process never crashes because of its own metrics.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod clock;
pub mod counter;
pub mod desc;
pub mod error;
pub mod quantile;
pub mod snapshot;
pub mod summary;
pub mod vec;

pub use clock::{Clock, SequenceClock, SystemClock};
pub use counter::Counter;
pub use desc::MetricDescriptor;
pub use error::{PulseError, Result};
pub use quantile::QuantileTarget;
pub use snapshot::{LabelPair, MetricKind, QuantileValue, Snapshot, SnapshotValue};
pub use summary::{Summary, SummaryOpts};
pub use vec::{CounterVec, SummaryVec};
