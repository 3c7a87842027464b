//! # fast-hedge: Option Pricing, Greeks and Hedge Simulation
//!
//! A Rust library for pricing vanilla options, computing their risk
//! sensitivities and measuring how well delta and gamma hedges reduce PnL
//! variance under randomised market scenarios.
//!
//! ## Key Features
//!
//! - **Two Pricing Models**: Black-Scholes closed form and a CRR binomial tree
//!   (European and American)
//! - **Complete Greeks**: Delta, Gamma, Theta, Vega, Rho, closed form or lattice + bump-and-reprice
//! - **Portfolios**: Mixed option and stock positions with aggregate value and Greeks
//! - **Hedging**: Delta-neutral and gamma-neutral construction, Monte Carlo effectiveness scoring
//! - **High Performance**: Parallel scenarios and batch pricing with Rayon, reproducible per seed
//! - **Robust Numerics**: Typed errors instead of NaN, validated inputs everywhere
//!
//! ## Quick Start
//!
//! ```rust
//! use fast_hedge::hedging::{HedgeStrategy, HedgingSimulator};
//! use fast_hedge::portfolio::{Portfolio, Position};
//! use fast_hedge::pricing::{BlackScholes, OptionParams, OptionType, PricingEngine};
//!
//! let call = OptionParams::european(100.0, 100.0, 0.2, 0.05, 1.0, OptionType::Call)
//!     .expect("valid parameters");
//! let price = BlackScholes.price(&call).expect("priced");
//! assert!((price - 10.4506).abs() < 1e-3);
//!
//! let mut book = Portfolio::new();
//! book.add_position(Position::option(call, 10.0)).expect("finite quantity");
//!
//! let simulator = HedgingSimulator::new(BlackScholes).expect("thread pool");
//! let result = simulator
//!     .simulate_hedging_effectiveness(&book, &HedgeStrategy::Delta, 1_000, 42)
//!     .expect("simulation");
//! assert!(result.variance_reduction > 0.0);
//! ```
//!
//! ## Mathematical Foundation
//!
//! Prices are discounted risk-neutral expectations under geometric Brownian
//! motion. The closed form and the tree agree as the number of tree steps
//! grows; hedge effectiveness compares the PnL variance of the hedged and
//! unhedged books over the same scenario draws.

pub mod error;
pub mod hedging;
pub mod math_utils;
pub mod portfolio;
pub mod pricing;
pub mod rng;
pub mod validation;

// Re-export commonly used types for convenience
pub use error::{EngineError, EngineResult};
pub use hedging::{HedgeResult, HedgeStrategy, HedgingSimulator, StrategyComparison};
pub use portfolio::{Portfolio, Position};
pub use pricing::{
    BinomialTree, BlackScholes, ExerciseStyle, GreeksResult, OptimizedEngine, OptionParams,
    OptionPricer, OptionType, PricingEngine,
};
