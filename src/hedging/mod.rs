// src/hedging/mod.rs
//! Hedge construction and Monte Carlo effectiveness scoring

pub mod scenarios;
pub mod simulator;
pub mod stats;
pub mod strategies;

pub use scenarios::{generate_scenarios, MarketScenario, ScenarioConfig};
pub use simulator::{
    HedgeResult, HedgingSimulator, SimulationConfig, StrategyComparison,
    VARIANCE_REDUCTION_TARGET,
};
pub use stats::{PnlPercentiles, PnlStats};
pub use strategies::{delta_hedge, gamma_hedge, HedgeStrategy};
