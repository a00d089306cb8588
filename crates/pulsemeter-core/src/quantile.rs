//! Streaming targeted-quantile sketch.
//!
//! Cormode-Korn-Muthukrishnan-Srivastava targeted quantiles: the stream
//! keeps a sorted list of samples `(value, g, delta)` where `g` is the gap
//! to the previous sample's minimum rank and `delta` bounds the rank
//! uncertainty. An invariant function derived from the configured
//! (quantile, rank-error) targets caps how much uncertainty a sample may
//! carry near each target, so memory grows with the logarithm of the
//! observation count while the targeted quantiles stay within their error
//! budgets.
//!
//! Inserts happen in sorted batches (the summary hands over whole closed
//! hot buffers), followed by a compression pass that merges neighbours
//! whose combined uncertainty still fits the invariant. The minimum and
//! maximum samples are never merged away, so clamped tail queries are
//! exact.

use crate::error::{PulseError, Result};

/// One tracked quantile with its allowed rank error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantileTarget {
    pub quantile: f64,
    pub error: f64,
}

impl QuantileTarget {
    /// Build a validated target. Both fields must lie in the open
    /// interval (0, 1).
    pub fn new(quantile: f64, error: f64) -> Result<Self> {
        let target = Self { quantile, error };
        target.validate()?;
        Ok(target)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.quantile > 0.0 && self.quantile < 1.0) {
            return Err(PulseError::InvalidQuantileTarget(format!(
                "quantile must lie in (0, 1), got {}",
                self.quantile
            )));
        }
        if !(self.error > 0.0 && self.error < 1.0) {
            return Err(PulseError::InvalidQuantileTarget(format!(
                "rank error must lie in (0, 1), got {}",
                self.error
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    value: f64,
    /// Rank gap to the previous sample.
    g: f64,
    /// Rank uncertainty of this sample.
    delta: f64,
}

/// CKMS stream specialised to a fixed target set.
#[derive(Debug, Clone)]
pub(crate) struct TargetedStream {
    targets: Vec<QuantileTarget>,
    samples: Vec<Sample>,
    count: u64,
}

impl TargetedStream {
    /// Targets must already be validated; see [`QuantileTarget::validate`].
    pub(crate) fn new(targets: Vec<QuantileTarget>) -> Self {
        Self {
            targets,
            samples: Vec::new(),
            count: 0,
        }
    }

    pub(crate) fn count(&self) -> u64 {
        self.count
    }

    /// Drop all state; used when an age bucket rotates out.
    pub(crate) fn reset(&mut self) {
        self.samples.clear();
        self.count = 0;
    }

    /// Allowed rank deviation around rank `r`.
    fn invariant(&self, r: f64) -> f64 {
        let n = self.count as f64;
        let mut width = f64::MAX;
        for t in &self.targets {
            let f = if r < t.quantile * n {
                2.0 * t.error * (n - r) / (1.0 - t.quantile)
            } else {
                2.0 * t.error * r / t.quantile
            };
            if f < width {
                width = f;
            }
        }
        width.max(1.0)
    }

    /// Merge an ascending batch of observations into the sample list.
    pub(crate) fn merge_sorted(&mut self, batch: &[f64]) {
        if batch.is_empty() {
            return;
        }

        let mut idx = 0; // insertion cursor into self.samples
        let mut rank = 0.0; // rank mass strictly before `idx`
        for &value in batch {
            while idx < self.samples.len() {
                let sample = self.samples[idx];
                if sample.value > value {
                    break;
                }
                rank += sample.g;
                idx += 1;
            }

            let delta = if idx == 0 || idx == self.samples.len() {
                // new minimum or maximum: exact rank
                0.0
            } else {
                (self.invariant(rank).floor() - 1.0).max(0.0)
            };

            self.samples.insert(idx, Sample { value, g: 1.0, delta });
            self.count += 1;
            rank += 1.0;
            idx += 1;
        }

        self.compress();
    }

    /// Merge adjacent samples whose combined uncertainty fits the
    /// invariant. The first sample is skipped so the minimum survives; the
    /// absorbing neighbour keeps its value, so the maximum survives too.
    fn compress(&mut self) {
        if self.samples.len() < 3 {
            return;
        }

        let mut i = self.samples.len() - 2;
        let mut rank: f64 = self.samples[..i].iter().map(|s| s.g).sum();
        while i >= 1 {
            let merged = self.samples[i].g + self.samples[i + 1].g + self.samples[i + 1].delta;
            if merged <= self.invariant(rank) {
                let g = self.samples[i].g;
                self.samples.remove(i);
                self.samples[i].g += g;
            }
            i -= 1;
            rank -= self.samples[i].g;
        }
    }

    /// Approximate φ-quantile.
    ///
    /// The desired continuous 1-based rank is `φ·n + ½`, clamped to
    /// `[1, n]`, with linear interpolation between the two straddling
    /// tracked rank positions. Two observations 40 and 42 therefore give a
    /// median of 41 while the 90th and 99th percentiles resolve to 42, and
    /// a single observation answers every quantile exactly.
    pub(crate) fn query(&self, quantile: f64) -> Option<f64> {
        let first = self.samples.first()?;
        let last = self.samples.last()?;
        let n = self.count as f64;

        let want = quantile * n + 0.5;
        if want <= 1.0 {
            return Some(first.value);
        }
        if want >= n {
            return Some(last.value);
        }

        let mut prev_rank = first.g;
        let mut prev_value = first.value;
        for sample in self.samples.iter().skip(1) {
            let rank = prev_rank + sample.g;
            if rank >= want {
                let span = rank - prev_rank;
                if span <= 0.0 {
                    return Some(sample.value);
                }
                let frac = (want - prev_rank) / span;
                return Some(prev_value + frac * (sample.value - prev_value));
            }
            prev_rank = rank;
            prev_value = sample.value;
        }

        Some(last.value)
    }

    /// Number of tracked samples; bounded logarithmically in `count`.
    #[cfg(test)]
    pub(crate) fn sample_len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn targets() -> Vec<QuantileTarget> {
        vec![
            QuantileTarget { quantile: 0.5, error: 0.05 },
            QuantileTarget { quantile: 0.9, error: 0.01 },
            QuantileTarget { quantile: 0.99, error: 0.001 },
        ]
    }

    #[test]
    fn rejects_out_of_range_targets() {
        assert!(QuantileTarget::new(0.0, 0.05).is_err());
        assert!(QuantileTarget::new(1.0, 0.05).is_err());
        assert!(QuantileTarget::new(0.5, 0.0).is_err());
        assert!(QuantileTarget::new(0.5, 1.0).is_err());
        assert!(QuantileTarget::new(f64::NAN, 0.05).is_err());
        assert!(QuantileTarget::new(0.5, 0.05).is_ok());
    }

    #[test]
    fn empty_stream_has_no_quantiles() {
        let stream = TargetedStream::new(targets());
        assert_eq!(stream.query(0.5), None);
    }

    #[test]
    fn single_observation_answers_every_quantile() {
        let mut stream = TargetedStream::new(targets());
        stream.merge_sorted(&[37.0]);
        for q in [0.01, 0.5, 0.9, 0.99] {
            assert_eq!(stream.query(q), Some(37.0));
        }
    }

    #[test]
    fn two_observations_interpolate_the_median() {
        let mut stream = TargetedStream::new(targets());
        stream.merge_sorted(&[40.0, 42.0]);
        assert_eq!(stream.query(0.5), Some(41.0));
        assert_eq!(stream.query(0.9), Some(42.0));
        assert_eq!(stream.query(0.99), Some(42.0));
    }

    #[test]
    fn targeted_error_bounds_hold() {
        let mut stream = TargetedStream::new(targets());
        let batch: Vec<f64> = (1..=1000).map(f64::from).collect();
        stream.merge_sorted(&batch);

        let p50 = stream.query(0.5).unwrap();
        assert!((p50 - 500.5).abs() <= 0.05 * 1000.0, "p50 = {p50}");
        let p90 = stream.query(0.9).unwrap();
        assert!((p90 - 900.5).abs() <= 0.01 * 1000.0 + 1.0, "p90 = {p90}");
        let p99 = stream.query(0.99).unwrap();
        assert!((p99 - 990.5).abs() <= 0.001 * 1000.0 + 1.0, "p99 = {p99}");
    }

    #[test]
    fn compression_bounds_sample_count() {
        let mut stream = TargetedStream::new(targets());
        for chunk in 0..100 {
            let batch: Vec<f64> = (0..1000).map(|i| f64::from(chunk * 1000 + i)).collect();
            stream.merge_sorted(&batch);
        }
        assert_eq!(stream.count(), 100_000);
        assert!(
            stream.sample_len() < 5_000,
            "sketch kept {} samples for 100k observations",
            stream.sample_len()
        );
    }

    #[test]
    fn reset_clears_state() {
        let mut stream = TargetedStream::new(targets());
        stream.merge_sorted(&[1.0, 2.0, 3.0]);
        stream.reset();
        assert_eq!(stream.count(), 0);
        assert_eq!(stream.query(0.5), None);
    }
}
