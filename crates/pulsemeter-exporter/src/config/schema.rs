use serde::Deserialize;

use pulsemeter_core::{PulseError, QuantileTarget, Result, SummaryOpts};

use std::time::Duration;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub summaries: SummarySection,
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(PulseError::Config(format!(
                "unsupported config version: {}",
                self.version
            )));
        }
        self.summaries.validate()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SummarySection {
    #[serde(default = "default_max_age_ms")]
    pub max_age_ms: u64,

    #[serde(default = "default_age_buckets")]
    pub age_buckets: usize,

    #[serde(default = "default_quantiles")]
    pub quantiles: Vec<QuantileSection>,
}

impl Default for SummarySection {
    fn default() -> Self {
        Self {
            max_age_ms: default_max_age_ms(),
            age_buckets: default_age_buckets(),
            quantiles: default_quantiles(),
        }
    }
}

impl SummarySection {
    pub fn validate(&self) -> Result<()> {
        if !(1000..=86_400_000).contains(&self.max_age_ms) {
            return Err(PulseError::Config(
                "summaries.max_age_ms must be between 1000 and 86400000".into(),
            ));
        }
        if !(1..=64).contains(&self.age_buckets) {
            return Err(PulseError::Config(
                "summaries.age_buckets must be between 1 and 64".into(),
            ));
        }
        if self.quantiles.is_empty() {
            return Err(PulseError::Config(
                "summaries.quantiles must not be empty".into(),
            ));
        }
        for q in &self.quantiles {
            QuantileTarget::new(q.quantile, q.error)?;
        }
        Ok(())
    }

    /// Translate the section into summary options; call after `validate`.
    pub fn opts(&self) -> Result<SummaryOpts> {
        let mut quantiles = Vec::with_capacity(self.quantiles.len());
        for q in &self.quantiles {
            quantiles.push(QuantileTarget::new(q.quantile, q.error)?);
        }
        Ok(SummaryOpts {
            quantiles,
            max_age: Duration::from_millis(self.max_age_ms),
            age_buckets: self.age_buckets,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuantileSection {
    pub quantile: f64,
    pub error: f64,
}

fn default_listen() -> String {
    "0.0.0.0:9600".into()
}

fn default_max_age_ms() -> u64 {
    600_000
}

fn default_age_buckets() -> usize {
    5
}

fn default_quantiles() -> Vec<QuantileSection> {
    vec![
        QuantileSection { quantile: 0.5, error: 0.05 },
        QuantileSection { quantile: 0.9, error: 0.01 },
        QuantileSection { quantile: 0.99, error: 0.001 },
    ]
}
