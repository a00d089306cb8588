//! Top-level facade crate for pulsemeter.
//!
//! Re-exports the core metric engine and the exporter so users can depend
//! on a single crate.

pub mod core {
    pub use pulsemeter_core::*;
}

pub mod exporter {
    pub use pulsemeter_exporter::*;
}
