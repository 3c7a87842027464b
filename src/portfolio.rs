// src/portfolio.rs
//! Positions, portfolios and their aggregate value and Greeks
//!
//! A [`Portfolio`] owns an ordered list of [`Position`]s. Positions are plain
//! values: options carry their own [`OptionParams`], stock positions carry
//! nothing but a quantity. Valuation is delegated to any [`PricingEngine`].

use crate::error::{validation::*, EngineError, EngineResult};
use crate::pricing::{GreeksResult, OptionParams, PricingEngine};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstrumentType {
    Option,
    Stock,
}

impl fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstrumentType::Option => write!(f, "option"),
            InstrumentType::Stock => write!(f, "stock"),
        }
    }
}

/// What a position holds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instrument {
    /// The underlying share
    Stock,
    /// A vanilla option on the underlying
    Option(OptionParams),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub instrument: Instrument,
    /// Signed number of units, negative for short positions
    pub quantity: f64,
    /// Set on positions added by a hedging strategy
    pub is_hedge: bool,
}

impl Position {
    pub fn option(params: OptionParams, quantity: f64) -> Self {
        Self {
            instrument: Instrument::Option(params),
            quantity,
            is_hedge: false,
        }
    }

    pub fn stock(quantity: f64) -> Self {
        Self {
            instrument: Instrument::Stock,
            quantity,
            is_hedge: false,
        }
    }

    pub fn as_hedge(self) -> Self {
        Self {
            is_hedge: true,
            ..self
        }
    }

    pub fn instrument_type(&self) -> InstrumentType {
        match self.instrument {
            Instrument::Stock => InstrumentType::Stock,
            Instrument::Option(_) => InstrumentType::Option,
        }
    }

    /// Contract parameters, `None` for stock
    pub fn params(&self) -> Option<&OptionParams> {
        match &self.instrument {
            Instrument::Option(params) => Some(params),
            Instrument::Stock => None,
        }
    }

    /// Quantity-weighted Greeks of this position
    pub fn greeks<E: PricingEngine + ?Sized>(&self, engine: &E) -> EngineResult<GreeksResult> {
        match &self.instrument {
            Instrument::Stock => Ok(GreeksResult::stock().scaled(self.quantity)),
            Instrument::Option(params) => Ok(engine.greeks(params)?.scaled(self.quantity)),
        }
    }
}

/// Ordered collection of positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Portfolio {
    positions: Vec<Position>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_position(&mut self, position: Position) -> EngineResult<()> {
        validate_finite("quantity", position.quantity)?;
        self.positions.push(position);
        Ok(())
    }

    /// Builder-style variant of [`Portfolio::add_position`]
    pub fn with_position(mut self, position: Position) -> EngineResult<Self> {
        self.add_position(position)?;
        Ok(self)
    }

    /// Remove and return the position at `index`
    pub fn remove_position(&mut self, index: usize) -> Option<Position> {
        if index < self.positions.len() {
            Some(self.positions.remove(index))
        } else {
            None
        }
    }

    /// Drop every position added by a hedging strategy
    pub fn clear_hedges(&mut self) {
        self.positions.retain(|p| !p.is_hedge);
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn option_positions(&self) -> impl Iterator<Item = (&OptionParams, f64)> + '_ {
        self.positions
            .iter()
            .filter_map(|p| p.params().map(|params| (params, p.quantity)))
    }

    /// First option in the book; its spot and volatility define the base market state
    pub fn base_option(&self) -> Option<&OptionParams> {
        self.option_positions().next().map(|(params, _)| params)
    }

    pub fn hedge_count(&self) -> usize {
        self.positions.iter().filter(|p| p.is_hedge).count()
    }
}

/// Sum of quantity-weighted Greeks over all positions.
///
/// Stock contributes delta equal to its quantity and nothing else.
pub fn calculate_portfolio_greeks<E: PricingEngine + ?Sized>(
    portfolio: &Portfolio,
    engine: &E,
) -> EngineResult<GreeksResult> {
    portfolio
        .positions()
        .iter()
        .try_fold(GreeksResult::default(), |acc, position| {
            Ok(acc + position.greeks(engine)?)
        })
}

/// Mark the portfolio to market under a shifted market state.
///
/// Every option is repriced at `spot`, at `volatility` when given (its own
/// volatility otherwise) and with `time_elapsed` years taken off its
/// maturity. Options that would reach expiry are rejected.
pub fn calculate_portfolio_value<E: PricingEngine + ?Sized>(
    portfolio: &Portfolio,
    spot: f64,
    volatility: Option<f64>,
    time_elapsed: f64,
    engine: &E,
) -> EngineResult<f64> {
    validate_positive("spot", spot)?;
    validate_non_negative("time_elapsed", time_elapsed)?;
    if let Some(vol) = volatility {
        validate_positive("volatility", vol)?;
    }

    let mut total = 0.0;
    for position in portfolio.positions() {
        let value = match &position.instrument {
            Instrument::Stock => spot,
            Instrument::Option(params) => {
                let remaining = params.maturity() - time_elapsed;
                if remaining <= 0.0 {
                    return Err(EngineError::InvalidParams {
                        parameter: "time_elapsed".to_string(),
                        value: time_elapsed,
                        constraint: format!(
                            "must be < option maturity ({}); value expired options by payoff",
                            params.maturity()
                        ),
                    });
                }
                let mut shifted = params.with_spot(spot)?.with_maturity(remaining)?;
                if let Some(vol) = volatility {
                    shifted = shifted.with_volatility(vol)?;
                }
                engine.price(&shifted)?
            }
        };
        total += position.quantity * value;
    }

    validate_result("calculate_portfolio_value", total)
}
