// src/hedging/stats.rs
//! Summary statistics over scenario PnLs
//!
//! Moments use a single sequential Welford pass over the PnLs in scenario
//! order, so the result does not depend on how the PnLs were computed.
//! Variance is the population variance (divide by n).

use crate::error::{validation::*, EngineError, EngineResult};
use statrs::statistics::{Data, OrderStatistics};

/// Below this standard deviation a PnL distribution counts as flat
pub const FLAT_STD: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PnlStats {
    pub count: usize,
    pub mean: f64,
    pub variance: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl PnlStats {
    pub fn from_samples(samples: &[f64]) -> EngineResult<Self> {
        if samples.is_empty() {
            return Err(EngineError::InvalidConfiguration {
                field: "pnl_values".to_string(),
                reason: "no samples to summarise".to_string(),
            });
        }

        let mut mean = 0.0;
        let mut m2 = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for (i, &x) in samples.iter().enumerate() {
            let delta = x - mean;
            mean += delta / (i + 1) as f64;
            m2 += delta * (x - mean);
            min = min.min(x);
            max = max.max(x);
        }

        let variance = (m2 / samples.len() as f64).max(0.0);
        Ok(Self {
            count: samples.len(),
            mean: validate_result("pnl mean", mean)?,
            variance: validate_result("pnl variance", variance)?,
            std: variance.sqrt(),
            min,
            max,
        })
    }

    /// Mean over standard deviation, 0 for a flat distribution
    pub fn sharpe(&self) -> f64 {
        if self.std < FLAT_STD {
            0.0
        } else {
            self.mean / self.std
        }
    }

    /// Percentage of `baseline` variance removed, 0 when the baseline is flat
    pub fn variance_reduction_vs(&self, baseline: &PnlStats) -> f64 {
        if baseline.variance < FLAT_STD * FLAT_STD {
            0.0
        } else {
            (1.0 - self.variance / baseline.variance) * 100.0
        }
    }
}

/// PnL quantiles at 5/25/50/75/95%.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PnlPercentiles {
    pub p5: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
}

impl PnlPercentiles {
    pub fn from_samples(samples: &[f64]) -> EngineResult<Self> {
        if samples.is_empty() {
            return Err(EngineError::InvalidConfiguration {
                field: "pnl_values".to_string(),
                reason: "no samples to summarise".to_string(),
            });
        }
        let mut data = Data::new(samples.to_vec());
        Ok(Self {
            p5: data.percentile(5),
            p25: data.percentile(25),
            p50: data.percentile(50),
            p75: data.percentile(75),
            p95: data.percentile(95),
        })
    }
}
