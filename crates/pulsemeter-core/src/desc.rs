//! Metric identity: name, help text, and the ordered label schema.

use crate::error::{PulseError, Result};
use crate::snapshot::LabelPair;

/// Immutable identity of a metric.
///
/// The label-name arity fixed here defines the required arity of every
/// label-value tuple used against the metric for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    name: String,
    help: String,
    label_names: Vec<String>,
}

impl MetricDescriptor {
    /// Build and validate a descriptor.
    ///
    /// The metric name must match `[a-zA-Z_:][a-zA-Z0-9_:]*`; label names
    /// must match `[a-zA-Z_][a-zA-Z0-9_]*`, be unique, and not use the
    /// reserved `__` prefix.
    pub fn new(name: &str, help: &str, label_names: &[&str]) -> Result<Self> {
        if !valid_metric_name(name) {
            return Err(PulseError::InvalidDescriptor(format!(
                "invalid metric name: {name:?}"
            )));
        }
        for (i, &label) in label_names.iter().enumerate() {
            if !valid_label_name(label) {
                return Err(PulseError::InvalidDescriptor(format!(
                    "invalid label name: {label:?}"
                )));
            }
            if label_names[..i].contains(&label) {
                return Err(PulseError::InvalidDescriptor(format!(
                    "duplicate label name: {label:?}"
                )));
            }
        }

        Ok(Self {
            name: name.to_string(),
            help: help.to_string(),
            label_names: label_names.iter().map(|l| (*l).to_string()).collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// Number of label values every tuple must carry.
    pub fn arity(&self) -> usize {
        self.label_names.len()
    }

    /// Zip the declared label names with a tuple of values.
    pub(crate) fn label_pairs(&self, values: &[String]) -> Vec<LabelPair> {
        self.label_names
            .iter()
            .zip(values.iter())
            .map(|(name, value)| LabelPair {
                name: name.clone(),
                value: value.clone(),
            })
            .collect()
    }
}

fn valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn valid_label_name(name: &str) -> bool {
    if name.starts_with("__") {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_names() {
        assert!(MetricDescriptor::new("", "", &[]).is_err());
        assert!(MetricDescriptor::new("1abc", "", &[]).is_err());
        assert!(MetricDescriptor::new("http requests", "", &[]).is_err());
        assert!(MetricDescriptor::new("http_requests_total", "", &[]).is_ok());
        assert!(MetricDescriptor::new("ns:subsystem:name", "", &[]).is_ok());
    }

    #[test]
    fn rejects_bad_labels() {
        assert!(MetricDescriptor::new("m", "", &["code", "code"]).is_err());
        assert!(MetricDescriptor::new("m", "", &["__internal"]).is_err());
        assert!(MetricDescriptor::new("m", "", &["with:colon"]).is_err());
        assert!(MetricDescriptor::new("m", "", &["code", "handler", "method"]).is_ok());
    }
}
