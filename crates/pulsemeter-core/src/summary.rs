//! Streaming summary: exact count/sum plus targeted quantiles over a
//! rolling decay window.
//!
//! The hot path (`observe`) appends into a plain buffer under a short
//! mutex hold and does nothing else. All estimator work happens in
//! `write`: the hot buffer is swapped for an empty one, expired age
//! buckets rotate out, and the closed buffer is merged into every live
//! bucket's quantile stream. At most one merge is in flight at a time (the
//! cold-state mutex), and an `observe` can only ever wait for the buffer
//! swap, never for a merge.
//!
//! Decay uses a ring of `age_buckets` tumbling sub-windows spanning
//! `max_age` in total. Every bucket receives every flushed observation;
//! snapshots read the oldest bucket, which has accumulated the full decay
//! window. Rotation resets one bucket per elapsed sub-window, so after a
//! quiet `max_age` the whole ring is empty and the summary reports
//! count 0 / sum 0 / no quantiles.

use std::mem;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use crate::clock::Clock;
use crate::desc::MetricDescriptor;
use crate::error::{PulseError, Result};
use crate::quantile::{QuantileTarget, TargetedStream};
use crate::snapshot::{QuantileValue, Snapshot, SnapshotValue};

/// Tuning for a summary's quantile engine and decay window.
#[derive(Debug, Clone)]
pub struct SummaryOpts {
    /// Tracked quantiles with their allowed rank errors.
    pub quantiles: Vec<QuantileTarget>,
    /// Total decay window: observations older than this stop contributing.
    pub max_age: Duration,
    /// Number of tumbling sub-windows the decay window is split into.
    pub age_buckets: usize,
}

impl Default for SummaryOpts {
    fn default() -> Self {
        Self {
            quantiles: vec![
                QuantileTarget { quantile: 0.5, error: 0.05 },
                QuantileTarget { quantile: 0.9, error: 0.01 },
                QuantileTarget { quantile: 0.99, error: 0.001 },
            ],
            max_age: Duration::from_secs(10 * 60),
            age_buckets: 5,
        }
    }
}

impl SummaryOpts {
    /// Validate and normalize: targets checked, sorted ascending by
    /// quantile, window parameters range-checked.
    pub(crate) fn validated(mut self) -> Result<Self> {
        for target in &self.quantiles {
            target.validate()?;
        }
        if self.max_age.is_zero() {
            return Err(PulseError::Config("summary max_age must be positive".into()));
        }
        if !(1..=64).contains(&self.age_buckets) {
            return Err(PulseError::Config(
                "summary age_buckets must be between 1 and 64".into(),
            ));
        }
        if (self.max_age / self.age_buckets as u32).is_zero() {
            return Err(PulseError::Config(
                "summary max_age too small for the configured age_buckets".into(),
            ));
        }
        self.quantiles
            .sort_by(|a, b| a.quantile.total_cmp(&b.quantile));
        self.quantiles.dedup_by(|a, b| a.quantile == b.quantile);
        Ok(self)
    }
}

struct Bucket {
    stream: TargetedStream,
    sum: f64,
}

impl Bucket {
    fn reset(&mut self) {
        self.stream.reset();
        self.sum = 0.0;
    }
}

struct ColdState {
    /// Ring of sub-window buckets; `head` is the oldest live one and
    /// serves queries.
    buckets: Vec<Bucket>,
    head: usize,
    /// Instant at which the head bucket ages out of the decay window.
    head_expiry: SystemTime,
}

/// Streaming quantile summary.
pub struct Summary {
    desc: MetricDescriptor,
    label_values: Vec<String>,
    opts: SummaryOpts,
    clock: Arc<dyn Clock>,
    bucket_span: Duration,
    hot: Mutex<Vec<f64>>,
    cold: Mutex<ColdState>,
}

impl Summary {
    /// Build a standalone summary. The descriptor must not declare label
    /// names; labelled summaries are children of a
    /// [`crate::vec::SummaryVec`].
    pub fn new(desc: MetricDescriptor, opts: SummaryOpts, clock: Arc<dyn Clock>) -> Result<Self> {
        if desc.arity() != 0 {
            return Err(PulseError::InvalidDescriptor(format!(
                "standalone summary {:?} must not declare label names; use SummaryVec",
                desc.name()
            )));
        }
        let opts = opts.validated()?;
        Ok(Self::for_child(desc, Vec::new(), opts, clock))
    }

    /// Child constructor used by `SummaryVec`; opts were validated there.
    pub(crate) fn for_child(
        desc: MetricDescriptor,
        label_values: Vec<String>,
        opts: SummaryOpts,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let bucket_span = opts.max_age / opts.age_buckets as u32;
        let buckets = (0..opts.age_buckets)
            .map(|_| Bucket {
                stream: TargetedStream::new(opts.quantiles.clone()),
                sum: 0.0,
            })
            .collect();
        let head_expiry = clock.now() + bucket_span;

        Self {
            desc,
            label_values,
            opts,
            clock,
            bucket_span,
            hot: Mutex::new(Vec::with_capacity(512)),
            cold: Mutex::new(ColdState {
                buckets,
                head: 0,
                head_expiry,
            }),
        }
    }

    pub fn desc(&self) -> &MetricDescriptor {
        &self.desc
    }

    /// Record one observation.
    ///
    /// Appends into the hot buffer and returns; the merge into the quantile
    /// streams is deferred to `write`, so observation throughput is never
    /// coupled to estimator cost.
    pub fn observe(&self, value: f64) {
        let mut hot = self.hot.lock().unwrap_or_else(|p| p.into_inner());
        hot.push(value);
    }

    /// Flush, rotate, and snapshot.
    ///
    /// Every observation whose `observe` returned before this call started
    /// is reflected in the returned snapshot. Count and sum are exact for
    /// the live window; quantiles carry the configured rank-error bounds.
    pub fn write(&self) -> Snapshot {
        let now = self.clock.now();

        // cold first, then the brief hot swap: concurrent writes serialize
        // here, and no second write can slip in between a swap and its
        // flush. `observe` only ever contends with the swap itself.
        let mut cold = self.cold.lock().unwrap_or_else(|p| p.into_inner());
        let closed = {
            let mut hot = self.hot.lock().unwrap_or_else(|p| p.into_inner());
            mem::take(&mut *hot)
        };
        self.rotate(&mut cold, now);
        self.flush(&mut cold, closed);

        let (count, sum, quantiles) = match cold.buckets.get(cold.head) {
            Some(head) if head.stream.count() > 0 => {
                let mut quantiles = Vec::with_capacity(self.opts.quantiles.len());
                for target in &self.opts.quantiles {
                    if let Some(value) = head.stream.query(target.quantile) {
                        quantiles.push(QuantileValue {
                            quantile: target.quantile,
                            value,
                        });
                    }
                }
                (head.stream.count(), head.sum, quantiles)
            }
            _ => (0, 0.0, Vec::new()),
        };

        Snapshot::new(
            self.desc.name(),
            self.desc.label_pairs(&self.label_values),
            SnapshotValue::Summary { count, sum, quantiles },
        )
    }

    /// Reset every bucket whose sub-window has fully elapsed and advance
    /// the head past them.
    fn rotate(&self, cold: &mut ColdState, now: SystemTime) {
        let len = cold.buckets.len();
        while now >= cold.head_expiry {
            if let Some(head) = cold.buckets.get_mut(cold.head) {
                head.reset();
            }
            cold.head = (cold.head + 1) % len;
            cold.head_expiry += self.bucket_span;
        }
    }

    /// Merge a closed hot buffer into every live bucket.
    fn flush(&self, cold: &mut ColdState, mut closed: Vec<f64>) {
        if closed.is_empty() {
            return;
        }
        closed.sort_by(f64::total_cmp);
        let batch_sum: f64 = closed.iter().sum();

        for bucket in &mut cold.buckets {
            bucket.stream.merge_sorted(&closed);
            bucket.sum += batch_sum;
        }

        tracing::debug!(
            metric = %self.desc.name(),
            merged = closed.len(),
            "flushed hot observation buffer"
        );
    }
}
