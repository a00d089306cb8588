//! Immutable point-in-time reads of metric state.
//!
//! A `Snapshot` is what `write()` hands to an exporter: the metric name,
//! the concrete label pairs sorted by label name, and either a counter
//! value or a summary's count/sum/quantile triple. Snapshots never alias
//! live metric state, so an exporter can hold them across a scrape without
//! blocking writers.

use serde::Serialize;

/// Metric type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Counter,
    Summary,
}

impl MetricKind {
    /// Name used by the text exposition format.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Summary => "summary",
        }
    }
}

/// One concrete label name/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelPair {
    pub name: String,
    pub value: String,
}

/// One estimated quantile value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuantileValue {
    pub quantile: f64,
    pub value: f64,
}

/// Payload of a snapshot, per metric kind.
///
/// Summary quantiles are sorted ascending by quantile and empty when the
/// live window holds no observations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotValue {
    Counter(f64),
    Summary {
        count: u64,
        sum: f64,
        quantiles: Vec<QuantileValue>,
    },
}

/// Immutable point-in-time read of a single metric instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub name: String,
    pub labels: Vec<LabelPair>,
    pub value: SnapshotValue,
}

impl Snapshot {
    /// Assemble a snapshot; label pairs are sorted by label name.
    pub fn new(name: &str, mut labels: Vec<LabelPair>, value: SnapshotValue) -> Self {
        labels.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            name: name.to_string(),
            labels,
            value,
        }
    }

    pub fn kind(&self) -> MetricKind {
        match self.value {
            SnapshotValue::Counter(_) => MetricKind::Counter,
            SnapshotValue::Summary { .. } => MetricKind::Summary,
        }
    }
}
