// src/pricing/optimized.rs
//! Batch pricing and path simulation
//!
//! `OptimizedEngine` prices single options like [`OptionPricer`](super::OptionPricer)
//! and adds two bulk operations parallelised with rayon:
//!
//! - `price_multiple`: closed-form prices over a grid of spots
//! - `simulate_paths`: GBM paths on an `n_paths × (n_steps + 1)` grid
//!
//! Path `i` draws from stream `seed + i`, so the output only depends on the
//! inputs, not on the number of threads.

use super::black_scholes::bs_d1_d2;
use super::{
    BinomialTree, BlackScholes, ExerciseStyle, GreeksResult, OptionParams, OptionType,
    PricingEngine,
};
use crate::error::{validation::*, EngineError, EngineResult};
use crate::math_utils::fast_norm_cdf;
use crate::rng::{self, RngFactory};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use tracing::debug;

/// Pricing engine with vectorised entry points.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptimizedEngine {
    tree: BinomialTree,
}

impl OptimizedEngine {
    pub const NAME: &'static str = "Optimized engine";

    pub fn new(binomial_steps: usize) -> EngineResult<Self> {
        Ok(Self {
            tree: BinomialTree::new(binomial_steps)?,
        })
    }

    pub fn binomial_steps(&self) -> usize {
        self.tree.steps()
    }

    /// Price the same contract at many spot levels.
    ///
    /// European options use the closed form with the polynomial normal CDF.
    /// American options fall back to one tree per spot.
    pub fn price_multiple(
        &self,
        spots: &[f64],
        params: &OptionParams,
    ) -> EngineResult<Array1<f64>> {
        for &spot in spots {
            validate_positive("spot", spot)?;
        }

        let prices: Vec<f64> = match params.style() {
            ExerciseStyle::European => {
                if params.maturity() <= 0.0 {
                    return Err(EngineError::InvalidParams {
                        parameter: "maturity".to_string(),
                        value: params.maturity(),
                        constraint: "must be > 0 for closed-form pricing".to_string(),
                    });
                }
                let (k, r, sigma, t) = (
                    params.strike(),
                    params.rate(),
                    params.volatility(),
                    params.maturity(),
                );
                let discount = (-r * t).exp();
                let option_type = params.option_type();

                spots
                    .par_iter()
                    .map(|&s| {
                        let (d1, d2) = bs_d1_d2(s, k, r, sigma, t);
                        let price = match option_type {
                            OptionType::Call => {
                                s * fast_norm_cdf(d1) - k * discount * fast_norm_cdf(d2)
                            }
                            OptionType::Put => {
                                k * discount * fast_norm_cdf(-d2) - s * fast_norm_cdf(-d1)
                            }
                        };
                        validate_result(Self::NAME, price).map(|p| p.max(0.0))
                    })
                    .collect::<EngineResult<Vec<f64>>>()?
            }
            ExerciseStyle::American => spots
                .par_iter()
                .map(|&s| self.tree.price(&params.with_spot(s)?))
                .collect::<EngineResult<Vec<f64>>>()?,
        };

        debug!(count = prices.len(), style = %params.style(), "priced spot grid");
        Ok(Array1::from_vec(prices))
    }

    /// Simulate geometric Brownian motion paths.
    ///
    /// # Discretisation
    /// ```text
    /// S_{t+1} = S_t * exp((r - σ²/2)Δt + σ√Δt * Z),   Z ~ N(0,1),  Δt = T / n_steps
    /// ```
    ///
    /// Row `i` is path `i`; column 0 holds `s0`.
    #[allow(clippy::too_many_arguments)]
    pub fn simulate_paths(
        &self,
        s0: f64,
        sigma: f64,
        r: f64,
        t: f64,
        n_paths: usize,
        n_steps: usize,
        seed: u64,
    ) -> EngineResult<Array2<f64>> {
        validate_positive("s0", s0)?;
        validate_positive("sigma", sigma)?;
        validate_finite("r", r)?;
        validate_positive("t", t)?;
        validate_scenarios(n_paths)?;
        validate_steps("n_steps", n_steps, 1)?;

        let dt = t / n_steps as f64;
        let drift = (r - 0.5 * sigma * sigma) * dt;
        let diffusion = sigma * dt.sqrt();
        let width = n_steps + 1;
        let factory = RngFactory::new(seed);

        let grid: Vec<f64> = (0..n_paths)
            .into_par_iter()
            .flat_map_iter(|i| {
                let mut rng = factory.stream(i as u64);
                let mut s = s0;
                std::iter::once(s0).chain((0..n_steps).map(move |_| {
                    s *= (drift + diffusion * rng::get_normal_draw(&mut rng)).exp();
                    s
                }))
            })
            .collect();

        if let Some(bad) = grid.iter().find(|s| !s.is_finite()) {
            return Err(EngineError::NumericalInstability {
                method: "simulate_paths".to_string(),
                reason: format!("path value is not finite: {}", bad),
            });
        }

        debug!(n_paths, n_steps, seed, "simulated GBM paths");

        Array2::from_shape_vec((n_paths, width), grid).map_err(|e| {
            EngineError::NumericalInstability {
                method: "simulate_paths".to_string(),
                reason: e.to_string(),
            }
        })
    }
}

impl PricingEngine for OptimizedEngine {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn price(&self, params: &OptionParams) -> EngineResult<f64> {
        match params.style() {
            ExerciseStyle::European => BlackScholes.price(params),
            ExerciseStyle::American => self.tree.price(params),
        }
    }

    fn greeks(&self, params: &OptionParams) -> EngineResult<GreeksResult> {
        match params.style() {
            ExerciseStyle::European => BlackScholes.greeks(params),
            ExerciseStyle::American => self.tree.greeks(params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn call() -> OptionParams {
        OptionParams::european(100.0, 100.0, 0.2, 0.05, 1.0, OptionType::Call).unwrap()
    }

    #[test]
    fn test_price_multiple_matches_closed_form() {
        let engine = OptimizedEngine::default();
        let spots = [80.0, 90.0, 100.0, 110.0, 120.0];
        let prices = engine.price_multiple(&spots, &call()).unwrap();
        assert_eq!(prices.len(), spots.len());
        for (&s, &price) in spots.iter().zip(prices.iter()) {
            let exact = BlackScholes.price(&call().with_spot(s).unwrap()).unwrap();
            assert_abs_diff_eq!(price, exact, epsilon = 1e-4);
        }
        assert!(prices.to_vec().windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_price_multiple_american_uses_tree() {
        let engine = OptimizedEngine::new(50).unwrap();
        let put = OptionParams::american(100.0, 100.0, 0.2, 0.05, 1.0, OptionType::Put).unwrap();
        let prices = engine.price_multiple(&[95.0, 105.0], &put).unwrap();
        let tree = BinomialTree::new(50).unwrap();
        assert_eq!(prices[0], tree.price(&put.with_spot(95.0).unwrap()).unwrap());
        assert_eq!(prices[1], tree.price(&put.with_spot(105.0).unwrap()).unwrap());
    }

    #[test]
    fn test_price_multiple_rejects_bad_spot() {
        let engine = OptimizedEngine::default();
        assert!(engine.price_multiple(&[100.0, -5.0], &call()).is_err());
        assert_eq!(engine.price_multiple(&[], &call()).unwrap().len(), 0);
    }

    #[test]
    fn test_simulate_paths_shape_and_start() {
        let engine = OptimizedEngine::default();
        let paths = engine
            .simulate_paths(100.0, 0.2, 0.05, 1.0, 64, 12, 7)
            .unwrap();
        assert_eq!(paths.dim(), (64, 13));
        assert!(paths.column(0).iter().all(|&s| s == 100.0));
        assert!(paths.iter().all(|&s| s > 0.0));
    }

    #[test]
    fn test_simulate_paths_deterministic() {
        let engine = OptimizedEngine::default();
        let a = engine.simulate_paths(100.0, 0.3, 0.01, 0.5, 100, 10, 42).unwrap();
        let b = engine.simulate_paths(100.0, 0.3, 0.01, 0.5, 100, 10, 42).unwrap();
        let c = engine.simulate_paths(100.0, 0.3, 0.01, 0.5, 100, 10, 43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_simulate_paths_martingale() {
        // E[S_T] = S_0 e^{rT}
        let engine = OptimizedEngine::default();
        let paths = engine
            .simulate_paths(100.0, 0.2, 0.05, 1.0, 20_000, 4, 2024)
            .unwrap();
        let terminal_mean = paths.column(4).mean().unwrap();
        let expected = 100.0 * 0.05f64.exp();
        assert!(
            (terminal_mean - expected).abs() < 0.6,
            "mean {} vs {}",
            terminal_mean,
            expected
        );
    }

    #[test]
    fn test_simulate_paths_rejects_zero_counts() {
        let engine = OptimizedEngine::default();
        assert!(engine.simulate_paths(100.0, 0.2, 0.05, 1.0, 0, 10, 1).is_err());
        assert!(engine.simulate_paths(100.0, 0.2, 0.05, 1.0, 10, 0, 1).is_err());
        assert!(engine.simulate_paths(100.0, 0.0, 0.05, 1.0, 10, 10, 1).is_err());
    }
}
