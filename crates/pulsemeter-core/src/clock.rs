//! Swappable time source.
//!
//! Summaries (and anything else that cares about wall-clock progress) take
//! an `Arc<dyn Clock>` at construction instead of reaching for a global.
//! Production code injects `SystemClock`; tests inject a `SequenceClock`
//! and drive decay deterministically.

use std::sync::Mutex;
use std::time::SystemTime;

/// Abstract time source.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// Wall-clock time; the production default.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Programmable time source for deterministic tests.
///
/// Yields each configured instant in order, then repeats the final one
/// forever. Non-empty by construction.
pub struct SequenceClock {
    state: Mutex<SequenceState>,
}

struct SequenceState {
    series: Vec<SystemTime>,
    next: usize,
}

impl SequenceClock {
    /// Build a clock that yields `first`, then each instant in `rest`.
    pub fn new(first: SystemTime, rest: impl IntoIterator<Item = SystemTime>) -> Self {
        let mut series = vec![first];
        series.extend(rest);
        Self {
            state: Mutex::new(SequenceState { series, next: 0 }),
        }
    }
}

impl Clock for SequenceClock {
    fn now(&self) -> SystemTime {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        let idx = state.next.min(state.series.len() - 1);
        if state.next < state.series.len() - 1 {
            state.next += 1;
        }
        state
            .series
            .get(idx)
            .copied()
            .unwrap_or(SystemTime::UNIX_EPOCH)
    }
}
