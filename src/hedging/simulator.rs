// src/hedging/simulator.rs
//! Monte Carlo measurement of hedge effectiveness
//!
//! # Procedure
//!
//! 1. Take spot and volatility of the first option in the book as the base state.
//! 2. Hedge the book according to the strategy.
//! 3. Draw `n` scenarios, revalue the hedged book under each one.
//! 4. PnL = scenario value - base value; summarise the distribution.
//!
//! The unhedged book is revalued over the *same* scenarios, and the variance
//! reduction is measured against it:
//! ```text
//! VR = (1 - Var[PnL_hedged] / Var[PnL_unhedged]) * 100
//! ```

use super::scenarios::{generate_scenarios, MarketScenario, ScenarioConfig};
use super::stats::{PnlPercentiles, PnlStats};
use super::strategies::{delta_hedge, gamma_hedge, HedgeStrategy};
use crate::error::{validation::*, EngineError, EngineResult};
use crate::portfolio::{calculate_portfolio_greeks, calculate_portfolio_value, Portfolio};
use crate::pricing::{GreeksResult, OptionParams, PricingEngine};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info, warn};

/// Minimum delta-hedge variance reduction, in percent
pub const VARIANCE_REDUCTION_TARGET: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    pub scenarios: ScenarioConfig,
    /// Worker threads in the simulator's pool
    pub threads: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            scenarios: ScenarioConfig::default(),
            threads: num_cpus::get(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> EngineResult<()> {
        self.scenarios.validate()?;
        if self.threads == 0 {
            return Err(EngineError::InvalidConfiguration {
                field: "threads".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Outcome of one strategy over a scenario batch.
#[derive(Debug, Clone, PartialEq)]
pub struct HedgeResult {
    pub strategy: HedgeStrategy,
    pub n_scenarios: usize,
    /// Value of the hedged book in the base state
    pub initial_value: f64,
    /// Percent of unhedged PnL variance removed; 0 for the unhedged book
    pub variance_reduction: f64,
    pub pnl_mean: f64,
    pub pnl_std: f64,
    pub pnl_variance: f64,
    /// Most negative PnL (signed)
    pub max_loss: f64,
    pub max_gain: f64,
    /// Mean over std, 0 when the PnL is flat
    pub sharpe: f64,
    pub percentiles: PnlPercentiles,
    /// Greeks of the hedged book in the base state
    pub portfolio_greeks: GreeksResult,
    /// PnL per scenario, in scenario order
    pub pnl_values: Vec<f64>,
}

/// Results of the three strategies over one shared scenario batch.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyComparison {
    pub none: HedgeResult,
    pub delta: HedgeResult,
    pub gamma: Option<HedgeResult>,
}

impl StrategyComparison {
    /// Whether the delta hedge removes at least `target_pct` percent of variance
    pub fn meets_target(&self, target_pct: f64) -> bool {
        self.delta.variance_reduction >= target_pct
    }

    pub fn results(&self) -> impl Iterator<Item = &HedgeResult> + '_ {
        [Some(&self.none), Some(&self.delta), self.gamma.as_ref()]
            .into_iter()
            .flatten()
    }
}

/// Revalued PnLs of one book over a scenario batch
struct PnlRun {
    initial_value: f64,
    pnls: Vec<f64>,
    stats: PnlStats,
}

/// Runs hedging experiments on a dedicated rayon pool.
pub struct HedgingSimulator<E> {
    engine: E,
    config: SimulationConfig,
    pool: ThreadPool,
}

impl<E: PricingEngine> HedgingSimulator<E> {
    pub fn new(engine: E) -> EngineResult<Self> {
        Self::with_config(engine, SimulationConfig::default())
    }

    pub fn with_config(engine: E, config: SimulationConfig) -> EngineResult<Self> {
        config.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()
            .map_err(|e| EngineError::InvalidConfiguration {
                field: "threads".to_string(),
                reason: e.to_string(),
            })?;
        debug!(threads = config.threads, engine = engine.name(), "hedging simulator ready");
        Ok(Self {
            engine,
            config,
            pool,
        })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn calculate_portfolio_greeks(&self, portfolio: &Portfolio) -> EngineResult<GreeksResult> {
        calculate_portfolio_greeks(portfolio, &self.engine)
    }

    pub fn delta_hedge(&self, portfolio: &Portfolio) -> EngineResult<Portfolio> {
        delta_hedge(portfolio, &self.engine)
    }

    pub fn gamma_hedge(
        &self,
        portfolio: &Portfolio,
        hedge_option: &OptionParams,
    ) -> EngineResult<Portfolio> {
        gamma_hedge(portfolio, hedge_option, &self.engine)
    }

    /// Simulate one strategy over `n_scenarios` draws seeded by `seed`.
    pub fn simulate_hedging_effectiveness(
        &self,
        portfolio: &Portfolio,
        strategy: &HedgeStrategy,
        n_scenarios: usize,
        seed: u64,
    ) -> EngineResult<HedgeResult> {
        let base = Self::base_option(portfolio)?;
        let scenarios = self.scenarios(n_scenarios, seed)?;
        let baseline = self.revalue(portfolio, &base, &scenarios)?;
        self.evaluate(portfolio, &base, strategy, &scenarios, &baseline)
    }

    /// Run none, delta and (when a hedge option is given) gamma over one
    /// scenario batch.
    pub fn compare_strategies(
        &self,
        portfolio: &Portfolio,
        n_scenarios: usize,
        hedge_option: Option<&OptionParams>,
        seed: u64,
    ) -> EngineResult<StrategyComparison> {
        let base = Self::base_option(portfolio)?;
        let scenarios = self.scenarios(n_scenarios, seed)?;
        let baseline = self.revalue(portfolio, &base, &scenarios)?;

        let none = self.evaluate(portfolio, &base, &HedgeStrategy::None, &scenarios, &baseline)?;
        let delta = self.evaluate(portfolio, &base, &HedgeStrategy::Delta, &scenarios, &baseline)?;
        let gamma = hedge_option
            .map(|&hedge_option| {
                let strategy = HedgeStrategy::Gamma { hedge_option };
                self.evaluate(portfolio, &base, &strategy, &scenarios, &baseline)
            })
            .transpose()?;

        let comparison = StrategyComparison { none, delta, gamma };
        info!(
            n_scenarios,
            delta_reduction = comparison.delta.variance_reduction,
            gamma_reduction = comparison.gamma.as_ref().map(|g| g.variance_reduction),
            target_met = comparison.meets_target(VARIANCE_REDUCTION_TARGET),
            "hedging strategies compared"
        );
        Ok(comparison)
    }

    fn base_option(portfolio: &Portfolio) -> EngineResult<OptionParams> {
        portfolio
            .base_option()
            .copied()
            .ok_or_else(|| EngineError::InvalidConfiguration {
                field: "portfolio".to_string(),
                reason: "must contain at least one option position".to_string(),
            })
    }

    fn scenarios(&self, n_scenarios: usize, seed: u64) -> EngineResult<Vec<MarketScenario>> {
        validate_scenarios(n_scenarios)?;
        self.pool
            .install(|| generate_scenarios(&self.config.scenarios, n_scenarios, seed))
    }

    fn evaluate(
        &self,
        portfolio: &Portfolio,
        base: &OptionParams,
        strategy: &HedgeStrategy,
        scenarios: &[MarketScenario],
        baseline: &PnlRun,
    ) -> EngineResult<HedgeResult> {
        let hedged = strategy.apply(portfolio, &self.engine)?;
        let run = match strategy {
            HedgeStrategy::None => None,
            _ => Some(self.revalue(&hedged, base, scenarios)?),
        };
        let run = run.as_ref().unwrap_or(baseline);

        let variance_reduction = match strategy {
            HedgeStrategy::None => 0.0,
            _ => run.stats.variance_reduction_vs(&baseline.stats),
        };

        let result = HedgeResult {
            strategy: *strategy,
            n_scenarios: scenarios.len(),
            initial_value: run.initial_value,
            variance_reduction,
            pnl_mean: run.stats.mean,
            pnl_std: run.stats.std,
            pnl_variance: run.stats.variance,
            max_loss: run.stats.min,
            max_gain: run.stats.max,
            sharpe: run.stats.sharpe(),
            percentiles: PnlPercentiles::from_samples(&run.pnls)?,
            portfolio_greeks: calculate_portfolio_greeks(&hedged, &self.engine)?,
            pnl_values: run.pnls.clone(),
        };

        info!(
            strategy = %strategy,
            n_scenarios = result.n_scenarios,
            pnl_mean = result.pnl_mean,
            pnl_std = result.pnl_std,
            variance_reduction = result.variance_reduction,
            "hedging simulation complete"
        );
        Ok(result)
    }

    /// Revalue `portfolio` under every scenario, in parallel on the pool.
    fn revalue(
        &self,
        portfolio: &Portfolio,
        base: &OptionParams,
        scenarios: &[MarketScenario],
    ) -> EngineResult<PnlRun> {
        let base_spot = base.spot();
        let base_vol = base.volatility();
        let min_vol = self.config.scenarios.min_volatility;

        let floored = scenarios
            .iter()
            .filter(|s| s.raw_volatility(base_vol) < min_vol)
            .count();
        if floored > 0 {
            warn!(
                floored,
                min_volatility = min_vol,
                "scenario volatility floored"
            );
        }

        let initial_value =
            calculate_portfolio_value(portfolio, base_spot, Some(base_vol), 0.0, &self.engine)?;

        let pnls = self.pool.install(|| {
            scenarios
                .par_iter()
                .map(|scenario| {
                    calculate_portfolio_value(
                        portfolio,
                        scenario.spot(base_spot),
                        Some(scenario.volatility(base_vol, min_vol)),
                        scenario.time_step,
                        &self.engine,
                    )
                    .map(|value| value - initial_value)
                })
                .collect::<EngineResult<Vec<f64>>>()
        })?;

        let stats = PnlStats::from_samples(&pnls)?;
        Ok(PnlRun {
            initial_value,
            pnls,
            stats,
        })
    }
}
