// src/hedging/scenarios.rs
//! Random market scenarios for hedge stress testing
//!
//! Each scenario perturbs a base market state:
//! ```text
//! spot' = spot * (1 + spot_shock),   spot_shock ~ U[spot_lo, spot_hi)
//! vol'  = max(vol * (1 + vol_shock), min_volatility),   vol_shock ~ U[vol_lo, vol_hi)
//! ```
//! and moves the clock forward by `time_step` years.

use crate::error::{validation::*, EngineError, EngineResult};
use crate::rng::{self, RngFactory};
use rayon::prelude::*;

/// Shock ranges and time step used to draw scenarios.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioConfig {
    /// Relative spot shock bounds, e.g. (-0.2, 0.2) for ±20%
    pub spot_shock_range: (f64, f64),
    /// Relative volatility shock bounds
    pub vol_shock_range: (f64, f64),
    /// Years elapsed between the base state and each scenario
    pub time_step: f64,
    /// Floor applied to shocked volatility
    pub min_volatility: f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            spot_shock_range: (-0.2, 0.2),
            vol_shock_range: (-0.5, 0.5),
            time_step: 1.0 / 252.0,
            min_volatility: 0.01,
        }
    }
}

impl ScenarioConfig {
    pub fn validate(&self) -> EngineResult<()> {
        Self::validate_shock_range("spot_shock_range", self.spot_shock_range)?;
        Self::validate_shock_range("vol_shock_range", self.vol_shock_range)?;
        // Spot must stay strictly positive after the largest down move
        if self.spot_shock_range.0 <= -1.0 {
            return Err(EngineError::InvalidConfiguration {
                field: "spot_shock_range".to_string(),
                reason: format!(
                    "lower bound {} would drive spot to zero or below",
                    self.spot_shock_range.0
                ),
            });
        }
        validate_non_negative("time_step", self.time_step)?;
        validate_positive("min_volatility", self.min_volatility)?;
        Ok(())
    }

    fn validate_shock_range(field: &str, (low, high): (f64, f64)) -> EngineResult<()> {
        validate_finite(field, low)?;
        validate_finite(field, high)?;
        if low > high {
            return Err(EngineError::InvalidConfiguration {
                field: field.to_string(),
                reason: format!("lower bound {} exceeds upper bound {}", low, high),
            });
        }
        Ok(())
    }
}

/// One sampled perturbation of the base market state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketScenario {
    pub spot_shock: f64,
    pub vol_shock: f64,
    pub time_step: f64,
}

impl MarketScenario {
    pub fn spot(&self, base_spot: f64) -> f64 {
        base_spot * (1.0 + self.spot_shock)
    }

    /// Shocked volatility before flooring
    pub fn raw_volatility(&self, base_vol: f64) -> f64 {
        base_vol * (1.0 + self.vol_shock)
    }

    pub fn volatility(&self, base_vol: f64, min_volatility: f64) -> f64 {
        self.raw_volatility(base_vol).max(min_volatility)
    }
}

/// Draw `n_scenarios` scenarios.
///
/// Scenario `i` uses RNG stream `seed + i`, so the batch is reproducible
/// and independent of how rayon splits the work.
pub fn generate_scenarios(
    config: &ScenarioConfig,
    n_scenarios: usize,
    seed: u64,
) -> EngineResult<Vec<MarketScenario>> {
    config.validate()?;
    validate_scenarios(n_scenarios)?;

    let factory = RngFactory::new(seed);
    let (spot_lo, spot_hi) = config.spot_shock_range;
    let (vol_lo, vol_hi) = config.vol_shock_range;

    Ok((0..n_scenarios)
        .into_par_iter()
        .map(|i| {
            let mut rng = factory.stream(i as u64);
            MarketScenario {
                spot_shock: rng::get_uniform_draw(&mut rng, spot_lo, spot_hi),
                vol_shock: rng::get_uniform_draw(&mut rng, vol_lo, vol_hi),
                time_step: config.time_step,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ScenarioConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_configs() {
        let inverted = ScenarioConfig {
            spot_shock_range: (0.2, -0.2),
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let wipeout = ScenarioConfig {
            spot_shock_range: (-1.0, 0.2),
            ..Default::default()
        };
        assert!(wipeout.validate().is_err());

        let no_floor = ScenarioConfig {
            min_volatility: 0.0,
            ..Default::default()
        };
        assert!(no_floor.validate().is_err());
    }

    #[test]
    fn test_scenarios_within_ranges() {
        let config = ScenarioConfig::default();
        let scenarios = generate_scenarios(&config, 2000, 42).unwrap();
        assert_eq!(scenarios.len(), 2000);
        for s in &scenarios {
            assert!((-0.2..0.2).contains(&s.spot_shock));
            assert!((-0.5..0.5).contains(&s.vol_shock));
            assert_eq!(s.time_step, 1.0 / 252.0);
        }
        // Uniform on a symmetric range: mean close to zero
        let mean = scenarios.iter().map(|s| s.spot_shock).sum::<f64>() / 2000.0;
        assert!(mean.abs() < 0.01, "mean spot shock {}", mean);
    }

    #[test]
    fn test_scenarios_reproducible() {
        let config = ScenarioConfig::default();
        let a = generate_scenarios(&config, 500, 7).unwrap();
        let b = generate_scenarios(&config, 500, 7).unwrap();
        let c = generate_scenarios(&config, 500, 8).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        // A longer batch extends the shorter one
        let longer = generate_scenarios(&config, 600, 7).unwrap();
        assert_eq!(&longer[..500], &a[..]);
    }

    #[test]
    fn test_volatility_floor() {
        let scenario = MarketScenario {
            spot_shock: -0.1,
            vol_shock: -0.99,
            time_step: 0.0,
        };
        assert!((scenario.spot(100.0) - 90.0).abs() < 1e-12);
        assert_eq!(scenario.volatility(0.2, 0.01), 0.01);
        assert!(scenario.raw_volatility(0.2) < 0.01);
    }

    #[test]
    fn test_zero_scenarios_rejected() {
        assert!(generate_scenarios(&ScenarioConfig::default(), 0, 1).is_err());
    }
}
