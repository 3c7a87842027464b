// src/pricing/mod.rs
//! Option pricing engines
//!
//! Every model implements [`PricingEngine`], so portfolio aggregation and
//! hedging code never needs to know which model values a given option.
//!
//! | Engine           | European | American | Greeks                         |
//! |------------------|----------|----------|--------------------------------|
//! | `BlackScholes`   | yes      | no       | closed form                    |
//! | `BinomialTree`   | yes      | yes      | lattice + bump-and-reprice     |
//! | `OptionPricer`   | yes      | yes      | routes by exercise style       |
//! | `OptimizedEngine`| yes      | yes      | routes by style, vectorised    |

pub mod binomial;
pub mod black_scholes;
pub mod optimized;
pub mod params;

pub use binomial::{BinomialTree, Lattice};
pub use black_scholes::BlackScholes;
pub use optimized::OptimizedEngine;
pub use params::{ExerciseStyle, GreeksResult, OptionParams, OptionType};

use crate::error::EngineResult;

/// Common contract of all pricing models.
pub trait PricingEngine: Send + Sync {
    /// Human readable model name, used in errors and logs
    fn name(&self) -> &'static str;

    /// Present value of one option
    fn price(&self, params: &OptionParams) -> EngineResult<f64>;

    /// Sensitivities of one option
    fn greeks(&self, params: &OptionParams) -> EngineResult<GreeksResult>;
}

impl<E: PricingEngine + ?Sized> PricingEngine for &E {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn price(&self, params: &OptionParams) -> EngineResult<f64> {
        (**self).price(params)
    }

    fn greeks(&self, params: &OptionParams) -> EngineResult<GreeksResult> {
        (**self).greeks(params)
    }
}

impl<E: PricingEngine + ?Sized> PricingEngine for Box<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn price(&self, params: &OptionParams) -> EngineResult<f64> {
        (**self).price(params)
    }

    fn greeks(&self, params: &OptionParams) -> EngineResult<GreeksResult> {
        (**self).greeks(params)
    }
}

/// Default engine: closed form for European options, tree for American ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionPricer {
    black_scholes: BlackScholes,
    tree: BinomialTree,
}

impl OptionPricer {
    pub const NAME: &'static str = "Option pricer";

    pub fn new(tree_steps: usize) -> EngineResult<Self> {
        Ok(Self {
            black_scholes: BlackScholes,
            tree: BinomialTree::new(tree_steps)?,
        })
    }

    pub fn tree(&self) -> &BinomialTree {
        &self.tree
    }

    fn engine_for(&self, params: &OptionParams) -> &dyn PricingEngine {
        match params.style() {
            ExerciseStyle::European => &self.black_scholes,
            ExerciseStyle::American => &self.tree,
        }
    }
}

impl PricingEngine for OptionPricer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn price(&self, params: &OptionParams) -> EngineResult<f64> {
        self.engine_for(params).price(params)
    }

    fn greeks(&self, params: &OptionParams) -> EngineResult<GreeksResult> {
        self.engine_for(params).greeks(params)
    }
}
