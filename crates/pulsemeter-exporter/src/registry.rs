//! Metric registry: tracks every collector in a process and deduplicates
//! metric names so a scrape sees each descriptor exactly once.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use pulsemeter_core::{
    Counter, CounterVec, MetricDescriptor, MetricKind, PulseError, Result, Snapshot, Summary,
    SummaryVec,
};

/// Anything that can hand snapshots to a scrape.
///
/// Collection is a pure in-memory read; implementations must not block the
/// hot path beyond what their own `write` contracts allow.
pub trait Collector: Send + Sync {
    fn desc(&self) -> &MetricDescriptor;
    fn kind(&self) -> MetricKind;
    fn collect(&self) -> Vec<Snapshot>;
}

impl Collector for Counter {
    fn desc(&self) -> &MetricDescriptor {
        self.desc()
    }
    fn kind(&self) -> MetricKind {
        MetricKind::Counter
    }
    fn collect(&self) -> Vec<Snapshot> {
        vec![self.write()]
    }
}

impl Collector for Summary {
    fn desc(&self) -> &MetricDescriptor {
        self.desc()
    }
    fn kind(&self) -> MetricKind {
        MetricKind::Summary
    }
    fn collect(&self) -> Vec<Snapshot> {
        vec![self.write()]
    }
}

impl Collector for CounterVec {
    fn desc(&self) -> &MetricDescriptor {
        self.desc()
    }
    fn kind(&self) -> MetricKind {
        MetricKind::Counter
    }
    fn collect(&self) -> Vec<Snapshot> {
        self.write()
    }
}

impl Collector for SummaryVec {
    fn desc(&self) -> &MetricDescriptor {
        self.desc()
    }
    fn kind(&self) -> MetricKind {
        MetricKind::Summary
    }
    fn collect(&self) -> Vec<Snapshot> {
        self.write()
    }
}

/// One exported family: a descriptor plus the snapshots of every instance
/// living under it.
#[derive(Debug, Clone)]
pub struct MetricFamily {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub snapshots: Vec<Snapshot>,
}

/// Process-wide collector registry.
#[derive(Default)]
pub struct Registry {
    collectors: DashMap<String, Arc<dyn Collector>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            collectors: DashMap::new(),
        }
    }

    /// Register a collector under its descriptor name.
    ///
    /// A second collector with the same metric name is rejected so scrapes
    /// never emit conflicting families.
    pub fn register(&self, collector: Arc<dyn Collector>) -> Result<()> {
        let name = collector.desc().name().to_string();
        match self.collectors.entry(name) {
            Entry::Occupied(entry) => Err(PulseError::AlreadyRegistered(entry.key().clone())),
            Entry::Vacant(entry) => {
                tracing::debug!(metric = %entry.key(), "registered collector");
                entry.insert(collector);
                Ok(())
            }
        }
    }

    /// Snapshot every registered family, sorted by metric name.
    pub fn gather(&self) -> Vec<MetricFamily> {
        let mut families: Vec<MetricFamily> = self
            .collectors
            .iter()
            .map(|entry| {
                let collector = entry.value();
                let desc = collector.desc();
                MetricFamily {
                    name: desc.name().to_string(),
                    help: desc.help().to_string(),
                    kind: collector.kind(),
                    snapshots: collector.collect(),
                }
            })
            .collect();
        families.sort_by(|a, b| a.name.cmp(&b.name));
        families
    }
}
