//! Label-keyed metric families.
//!
//! A vector maps an ordered tuple of label values onto a lazily created
//! child metric. Lookups on a known tuple only take a `DashMap` shard read
//! lock (the steady-state path); first use of a tuple goes through the
//! shard's entry API, so callers racing on the same brand-new tuple all
//! observe the single winning child. Unrelated tuples never contend beyond
//! their shard, and children are never removed — bounding cardinality is
//! the caller's job.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::clock::Clock;
use crate::counter::Counter;
use crate::desc::MetricDescriptor;
use crate::error::{PulseError, Result};
use crate::snapshot::Snapshot;
use crate::summary::{Summary, SummaryOpts};

struct VecInner<M> {
    desc: MetricDescriptor,
    children: DashMap<Vec<String>, Arc<M>>,
}

impl<M> VecInner<M> {
    fn new(desc: MetricDescriptor) -> Self {
        Self {
            desc,
            children: DashMap::new(),
        }
    }

    fn get_or_create(
        &self,
        values: &[&str],
        make: impl FnOnce(Vec<String>) -> M,
    ) -> Result<Arc<M>> {
        if values.len() != self.desc.arity() {
            return Err(PulseError::LabelArityMismatch {
                expected: self.desc.arity(),
                got: values.len(),
            });
        }

        let key: Vec<String> = values.iter().map(|v| (*v).to_string()).collect();
        if let Some(child) = self.children.get(&key) {
            return Ok(child.clone());
        }

        match self.children.entry(key) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let child = Arc::new(make(entry.key().clone()));
                entry.insert(child.clone());
                Ok(child)
            }
        }
    }

    fn write(&self, snapshot: impl Fn(&M) -> Snapshot) -> Vec<Snapshot> {
        let mut keyed: Vec<(Vec<String>, Snapshot)> = self
            .children
            .iter()
            .map(|entry| (entry.key().clone(), snapshot(entry.value())))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.into_iter().map(|(_, snap)| snap).collect()
    }
}

/// Family of counters partitioned by label values.
pub struct CounterVec {
    inner: VecInner<Counter>,
}

impl CounterVec {
    pub fn new(desc: MetricDescriptor) -> Self {
        Self {
            inner: VecInner::new(desc),
        }
    }

    pub fn desc(&self) -> &MetricDescriptor {
        &self.inner.desc
    }

    /// Fetch or lazily create the counter for this exact ordered tuple.
    ///
    /// The tuple length must equal the descriptor's label arity; on
    /// mismatch no child is created.
    pub fn with_label_values(&self, values: &[&str]) -> Result<Arc<Counter>> {
        let desc = &self.inner.desc;
        self.inner
            .get_or_create(values, |tuple| Counter::for_child(desc.clone(), tuple))
    }

    /// One snapshot per materialized tuple, sorted by tuple for
    /// deterministic export.
    pub fn write(&self) -> Vec<Snapshot> {
        self.inner.write(Counter::write)
    }
}

/// Family of summaries partitioned by label values.
///
/// The options and clock captured at construction are shared by every
/// child, so all children agree on the decay window and quantile targets.
pub struct SummaryVec {
    inner: VecInner<Summary>,
    opts: SummaryOpts,
    clock: Arc<dyn Clock>,
}

impl SummaryVec {
    pub fn new(desc: MetricDescriptor, opts: SummaryOpts, clock: Arc<dyn Clock>) -> Result<Self> {
        let opts = opts.validated()?;
        Ok(Self {
            inner: VecInner::new(desc),
            opts,
            clock,
        })
    }

    pub fn desc(&self) -> &MetricDescriptor {
        &self.inner.desc
    }

    /// Fetch or lazily create the summary for this exact ordered tuple.
    pub fn with_label_values(&self, values: &[&str]) -> Result<Arc<Summary>> {
        let desc = &self.inner.desc;
        self.inner.get_or_create(values, |tuple| {
            Summary::for_child(desc.clone(), tuple, self.opts.clone(), self.clock.clone())
        })
    }

    /// One snapshot per materialized tuple, sorted by tuple for
    /// deterministic export.
    pub fn write(&self) -> Vec<Snapshot> {
        self.inner.write(Summary::write)
    }
}
