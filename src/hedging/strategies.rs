// src/hedging/strategies.rs
//! Delta-neutral and delta+gamma-neutral hedge construction
//!
//! Both constructions return a new portfolio holding the original positions
//! plus hedge positions flagged with `is_hedge`.
//!
//! ```text
//! delta hedge:  stock quantity  = -Δ_portfolio
//! gamma hedge:  option quantity = -Γ_portfolio / Γ_hedge, then delta hedge
//! ```

use crate::error::{EngineError, EngineResult};
use crate::portfolio::{calculate_portfolio_greeks, Portfolio, Position};
use crate::pricing::{OptionParams, PricingEngine};
use std::fmt;
use tracing::debug;

/// Deltas smaller than this are already neutral
pub const MIN_HEDGE_DELTA: f64 = 1e-12;
/// Hedge options with less gamma than this cannot neutralise gamma
pub const MIN_HEDGE_GAMMA: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HedgeStrategy {
    /// Leave the portfolio unhedged
    None,
    /// Neutralise delta with the underlying
    Delta,
    /// Neutralise gamma with `hedge_option`, then delta with the underlying
    Gamma { hedge_option: OptionParams },
}

impl HedgeStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            HedgeStrategy::None => "none",
            HedgeStrategy::Delta => "delta",
            HedgeStrategy::Gamma { .. } => "gamma",
        }
    }

    /// Build the hedged portfolio for this strategy
    pub fn apply<E: PricingEngine + ?Sized>(
        &self,
        portfolio: &Portfolio,
        engine: &E,
    ) -> EngineResult<Portfolio> {
        match self {
            HedgeStrategy::None => Ok(portfolio.clone()),
            HedgeStrategy::Delta => delta_hedge(portfolio, engine),
            HedgeStrategy::Gamma { hedge_option } => gamma_hedge(portfolio, hedge_option, engine),
        }
    }
}

impl fmt::Display for HedgeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Append a stock position that cancels the portfolio delta.
pub fn delta_hedge<E: PricingEngine + ?Sized>(
    portfolio: &Portfolio,
    engine: &E,
) -> EngineResult<Portfolio> {
    let delta = calculate_portfolio_greeks(portfolio, engine)?.delta;
    let mut hedged = portfolio.clone();

    if delta.abs() >= MIN_HEDGE_DELTA {
        debug!(delta, stock_quantity = -delta, "adding delta hedge");
        hedged.add_position(Position::stock(-delta).as_hedge())?;
    }

    Ok(hedged)
}

/// Append `hedge_option` in the quantity that cancels portfolio gamma, then
/// delta hedge the result.
pub fn gamma_hedge<E: PricingEngine + ?Sized>(
    portfolio: &Portfolio,
    hedge_option: &OptionParams,
    engine: &E,
) -> EngineResult<Portfolio> {
    let portfolio_gamma = calculate_portfolio_greeks(portfolio, engine)?.gamma;
    let hedge_gamma = engine.greeks(hedge_option)?.gamma;

    if hedge_gamma.abs() < MIN_HEDGE_GAMMA {
        return Err(EngineError::DegenerateHedge { gamma: hedge_gamma });
    }

    let quantity = -portfolio_gamma / hedge_gamma;
    debug!(
        portfolio_gamma,
        hedge_gamma,
        option_quantity = quantity,
        "adding gamma hedge"
    );

    let mut hedged = portfolio.clone();
    hedged.add_position(Position::option(*hedge_option, quantity).as_hedge())?;
    delta_hedge(&hedged, engine)
}
