//! Monotonic counter with lock-free accumulation.
//!
//! The value is an `f64` stored as its bit pattern in an `AtomicU64` and
//! updated with a compare-exchange loop, so unbounded concurrent `inc`
//! callers never lose updates and `write` always reads a value that existed
//! at a real instant (no torn reads).

use std::sync::atomic::{AtomicU64, Ordering};

use crate::desc::MetricDescriptor;
use crate::error::{PulseError, Result};
use crate::snapshot::{Snapshot, SnapshotValue};

/// Monotonic accumulator.
#[derive(Debug)]
pub struct Counter {
    desc: MetricDescriptor,
    label_values: Vec<String>,
    bits: AtomicU64,
}

impl Counter {
    /// Build a standalone counter. The descriptor must not declare label
    /// names; labelled counters are children of a [`crate::vec::CounterVec`].
    pub fn new(desc: MetricDescriptor) -> Result<Self> {
        if desc.arity() != 0 {
            return Err(PulseError::InvalidDescriptor(format!(
                "standalone counter {:?} must not declare label names; use CounterVec",
                desc.name()
            )));
        }
        Ok(Self::for_child(desc, Vec::new()))
    }

    /// Child constructor used by `CounterVec`; label arity was checked there.
    pub(crate) fn for_child(desc: MetricDescriptor, label_values: Vec<String>) -> Self {
        Self {
            desc,
            label_values,
            bits: AtomicU64::new(0f64.to_bits()),
        }
    }

    pub fn desc(&self) -> &MetricDescriptor {
        &self.desc
    }

    /// Add `delta` to the accumulator.
    ///
    /// Negative and NaN deltas violate monotonicity and are rejected without
    /// mutating the value.
    pub fn inc(&self, delta: f64) -> Result<()> {
        if !(delta >= 0.0) {
            return Err(PulseError::NegativeIncrement(delta));
        }
        self.add(delta);
        Ok(())
    }

    /// Add exactly one.
    pub fn inc_by_one(&self) {
        self.add(1.0);
    }

    fn add(&self, delta: f64) {
        let mut current = self.bits.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + delta).to_bits();
            match self
                .bits
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return,
                Err(seen) => current = seen,
            }
        }
    }

    /// Current accumulated value.
    pub fn value(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Snapshot the current value. Never mutates; safe to call concurrently
    /// with `inc` and with other `write` calls.
    pub fn write(&self) -> Snapshot {
        Snapshot::new(
            self.desc.name(),
            self.desc.label_pairs(&self.label_values),
            SnapshotValue::Counter(self.value()),
        )
    }
}
