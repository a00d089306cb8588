//! Prometheus text exposition (format version 0.0.4).
//!
//! Output is byte-deterministic: families arrive sorted by name from the
//! registry, family snapshots are sorted by label tuple, and quantiles are
//! sorted ascending, so two scrapes of identical state render identically.

use std::fmt::Write;

use pulsemeter_core::{LabelPair, SnapshotValue};

use crate::registry::MetricFamily;

/// Content type served on the scrape endpoint.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render gathered families into the text format.
pub fn render_text(families: &[MetricFamily]) -> String {
    let mut out = String::new();

    for family in families {
        let _ = writeln!(out, "# HELP {} {}", family.name, escape_help(&family.help));
        let _ = writeln!(out, "# TYPE {} {}", family.name, family.kind.as_str());

        for snapshot in &family.snapshots {
            match &snapshot.value {
                SnapshotValue::Counter(value) => {
                    render_sample(&mut out, &family.name, &snapshot.labels, None, *value);
                }
                SnapshotValue::Summary { count, sum, quantiles } => {
                    for q in quantiles {
                        render_sample(
                            &mut out,
                            &family.name,
                            &snapshot.labels,
                            Some(q.quantile),
                            q.value,
                        );
                    }
                    render_sample(
                        &mut out,
                        &format!("{}_sum", family.name),
                        &snapshot.labels,
                        None,
                        *sum,
                    );
                    render_sample(
                        &mut out,
                        &format!("{}_count", family.name),
                        &snapshot.labels,
                        None,
                        *count as f64,
                    );
                }
            }
        }
    }

    out
}

fn render_sample(
    out: &mut String,
    name: &str,
    labels: &[LabelPair],
    quantile: Option<f64>,
    value: f64,
) {
    out.push_str(name);

    let mut first = true;
    if !labels.is_empty() || quantile.is_some() {
        out.push('{');
        for pair in labels {
            if !first {
                out.push(',');
            }
            first = false;
            let _ = write!(out, "{}=\"{}\"", pair.name, escape_label_value(&pair.value));
        }
        if let Some(q) = quantile {
            if !first {
                out.push(',');
            }
            let _ = write!(out, "quantile=\"{q}\"");
        }
        out.push('}');
    }

    let _ = writeln!(out, " {}", format_value(value));
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

fn escape_help(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('"', "\\\"")
}
