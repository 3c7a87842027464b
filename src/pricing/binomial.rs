// src/pricing/binomial.rs
//! Cox-Ross-Rubinstein binomial tree
//!
//! # Lattice
//!
//! ```text
//! Δt = T/N,  u = e^(σ√Δt),  d = 1/u
//! p  = (e^(rΔt) - d) / (u - d)
//! S(i, j) = S₀ · u^j · d^(i-j)      0 ≤ j ≤ i ≤ N
//! ```
//!
//! Backward induction from the terminal payoffs:
//! ```text
//! V(i, j) = e^(-rΔt) · [p·V(i+1, j+1) + (1-p)·V(i+1, j)]
//! ```
//! American exercise takes the max with the payoff at S(i, j).
//!
//! # Storage
//!
//! All nodes live in one flat buffer of (N+1)(N+2)/2 entries, level by
//! level, so node (i, j) sits at `i(i+1)/2 + j`. Level i+1 directly follows
//! level i, which keeps backward induction a linear sweep over memory.
//!
//! # Greeks
//!
//! Delta, gamma and theta are read off the first two lattice levels. Vega
//! and rho have no lattice representation and are computed by central
//! bump-and-reprice, so they carry discretisation noise that shrinks with N.

use super::{ExerciseStyle, GreeksResult, OptionParams, OptionType, PricingEngine};
use crate::error::{validation::*, EngineError, EngineResult};
use tracing::debug;

/// Fully evaluated tree: spot and option value at every node.
#[derive(Debug, Clone)]
pub struct Lattice {
    steps: usize,
    dt: f64,
    probability: f64,
    option_type: OptionType,
    spots: Vec<f64>,
    values: Vec<f64>,
}

impl Lattice {
    /// Number of nodes in a tree with `steps` levels below the root
    pub fn node_count(steps: usize) -> usize {
        (steps + 1) * (steps + 2) / 2
    }

    #[inline(always)]
    fn index(i: usize, j: usize) -> usize {
        i * (i + 1) / 2 + j
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Risk-neutral up probability
    pub fn probability(&self) -> f64 {
        self.probability
    }

    fn contains(&self, i: usize, j: usize) -> bool {
        j <= i && i <= self.steps
    }

    /// Underlying price at step `i` after `j` up moves, `None` outside the tree
    pub fn spot(&self, i: usize, j: usize) -> Option<f64> {
        self.contains(i, j).then(|| self.spots[Self::index(i, j)])
    }

    /// Option value at step `i` after `j` up moves, `None` outside the tree
    pub fn value(&self, i: usize, j: usize) -> Option<f64> {
        self.contains(i, j).then(|| self.values[Self::index(i, j)])
    }

    // Levels 0..=2 always exist: trees have at least two steps
    #[inline(always)]
    fn node(&self, i: usize, j: usize) -> (f64, f64) {
        let k = Self::index(i, j);
        (self.spots[k], self.values[k])
    }

    pub fn root_value(&self) -> f64 {
        self.values[0]
    }

    /// Finite-difference delta from the two nodes of level 1.
    ///
    /// Clamped to [0, 1] for calls and [-1, 0] for puts; deep in or out of
    /// the money the raw quotient overshoots by rounding.
    pub fn delta(&self) -> f64 {
        let (s_down, v_down) = self.node(1, 0);
        let (s_up, v_up) = self.node(1, 1);
        let raw = (v_up - v_down) / (s_up - s_down);
        match self.option_type {
            OptionType::Call => raw.clamp(0.0, 1.0),
            OptionType::Put => raw.clamp(-1.0, 0.0),
        }
    }

    /// Centered second difference over the three nodes of level 2, floored at 0
    pub fn gamma(&self) -> f64 {
        let (s0, v0) = self.node(2, 0);
        let (s1, v1) = self.node(2, 1);
        let (s2, v2) = self.node(2, 2);
        let upper = (v2 - v1) / (s2 - s1);
        let lower = (v1 - v0) / (s1 - s0);
        floor_at_zero((upper - lower) / (0.5 * (s2 - s0)))
    }

    /// Time decay per year, from the level-2 middle node (same spot as the root)
    pub fn theta(&self) -> f64 {
        (self.node(2, 1).1 - self.root_value()) / (2.0 * self.dt)
    }
}

/// Clamp rounding noise below zero; NaN passes through to result validation
#[inline]
fn floor_at_zero(x: f64) -> f64 {
    if x < 0.0 {
        0.0
    } else {
        x
    }
}

/// Binomial tree pricer for European and American options.
#[derive(Debug, Clone, Copy)]
pub struct BinomialTree {
    steps: usize,
}

impl Default for BinomialTree {
    fn default() -> Self {
        Self {
            steps: Self::DEFAULT_STEPS,
        }
    }
}

impl BinomialTree {
    pub const NAME: &'static str = "Binomial tree";
    pub const DEFAULT_STEPS: usize = 100;
    /// Absolute volatility bump for vega
    pub const VOL_BUMP: f64 = 0.01;
    /// Absolute rate bump for rho
    pub const RATE_BUMP: f64 = 1e-4;

    /// Tree with `steps` time steps. At least two are needed for gamma.
    pub fn new(steps: usize) -> EngineResult<Self> {
        validate_steps("steps", steps, 2)?;
        Ok(Self { steps })
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Build the lattice and run backward induction
    pub fn build_lattice(&self, params: &OptionParams) -> EngineResult<Lattice> {
        let n = self.steps;
        let t = params.maturity();
        if t <= 0.0 {
            return Err(EngineError::InvalidParams {
                parameter: "maturity".to_string(),
                value: t,
                constraint: "must be > 0 for tree pricing; value expiring options by payoff"
                    .to_string(),
            });
        }

        let dt = t / n as f64;
        let u = (params.volatility() * dt.sqrt()).exp();
        let d = 1.0 / u;
        let p = ((params.rate() * dt).exp() - d) / (u - d);
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(EngineError::ArbitrageInconsistent {
                probability: p,
                steps: n,
                dt,
            });
        }
        let disc = (-params.rate() * dt).exp();
        let disc_p = disc * p;
        let disc_q = disc * (1.0 - p);
        let american = params.style() == ExerciseStyle::American;

        debug!(steps = n, dt, u, p, american, "building binomial lattice");

        let size = Lattice::node_count(n);
        let mut spots = vec![0.0_f64; size];
        let mut values = vec![0.0_f64; size];

        let u2 = u * u;
        for i in 0..=n {
            let start = Lattice::index(i, 0);
            let mut s = params.spot() * d.powi(i as i32);
            for spot in &mut spots[start..=start + i] {
                *spot = s;
                s *= u2;
            }
        }

        let terminal = Lattice::index(n, 0);
        for (value, spot) in values[terminal..].iter_mut().zip(&spots[terminal..]) {
            *value = params.payoff(*spot);
        }

        for i in (0..n).rev() {
            let start = Lattice::index(i, 0);
            let next = Lattice::index(i + 1, 0);
            for j in 0..=i {
                let continuation = disc_p * values[next + j + 1] + disc_q * values[next + j];
                values[start + j] = if american {
                    continuation.max(params.payoff(spots[start + j]))
                } else {
                    continuation
                };
            }
        }

        validate_result(Self::NAME, values[0])?;

        Ok(Lattice {
            steps: n,
            dt,
            probability: p,
            option_type: params.option_type(),
            spots,
            values,
        })
    }

    /// Bumped vega, floored at 0 (vanilla value is non-decreasing in volatility)
    fn vega(&self, params: &OptionParams) -> EngineResult<f64> {
        let h = Self::VOL_BUMP;
        let up = self.price(&params.with_volatility(params.volatility() + h)?)?;
        // Forward difference when the down bump would leave the domain
        let raw = if params.volatility() > h {
            let down = self.price(&params.with_volatility(params.volatility() - h)?)?;
            (up - down) / (2.0 * h)
        } else {
            (up - self.price(params)?) / h
        };
        Ok(floor_at_zero(raw))
    }

    fn rho(&self, params: &OptionParams) -> EngineResult<f64> {
        let h = Self::RATE_BUMP;
        let up = self.price(&params.with_rate(params.rate() + h)?)?;
        let down = self.price(&params.with_rate(params.rate() - h)?)?;
        Ok((up - down) / (2.0 * h))
    }
}

impl PricingEngine for BinomialTree {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn price(&self, params: &OptionParams) -> EngineResult<f64> {
        Ok(self.build_lattice(params)?.root_value())
    }

    fn greeks(&self, params: &OptionParams) -> EngineResult<GreeksResult> {
        let lattice = self.build_lattice(params)?;

        GreeksResult {
            delta: lattice.delta(),
            gamma: lattice.gamma(),
            theta: lattice.theta() / 365.0,
            vega: self.vega(params)? / 100.0,
            rho: self.rho(params)? / 100.0,
        }
        .validated(Self::NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{BlackScholes, OptionType};
    use approx::assert_abs_diff_eq;

    fn params(option_type: OptionType, style: ExerciseStyle) -> OptionParams {
        OptionParams::new(100.0, 100.0, 0.2, 0.05, 1.0, option_type, style).unwrap()
    }

    #[test]
    fn test_node_count() {
        assert_eq!(Lattice::node_count(0), 1);
        assert_eq!(Lattice::node_count(1), 3);
        assert_eq!(Lattice::node_count(100), 5151);
    }

    #[test]
    fn test_rejects_too_few_steps() {
        assert!(BinomialTree::new(1).is_err());
        assert!(BinomialTree::new(2).is_ok());
    }

    #[test]
    fn test_lattice_layout() {
        let tree = BinomialTree::new(4).unwrap();
        let lattice = tree
            .build_lattice(&params(OptionType::Call, ExerciseStyle::European))
            .unwrap();

        assert_eq!(lattice.steps(), 4);
        assert_abs_diff_eq!(lattice.spot(0, 0).unwrap(), 100.0, epsilon = 1e-12);
        // u * d = 1 so the middle node of every even level is the root spot
        assert_abs_diff_eq!(lattice.spot(2, 1).unwrap(), 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(lattice.spot(4, 2).unwrap(), 100.0, epsilon = 1e-9);
        assert!(lattice.spot(1, 1) > lattice.spot(1, 0));
        // Terminal values are payoffs
        assert_abs_diff_eq!(
            lattice.value(4, 4).unwrap(),
            (lattice.spot(4, 4).unwrap() - 100.0).max(0.0),
            epsilon = 1e-12
        );
        assert_eq!(lattice.value(4, 0), Some(0.0));
    }

    #[test]
    fn test_lattice_accessors_reject_missing_nodes() {
        let lattice = BinomialTree::new(4)
            .unwrap()
            .build_lattice(&params(OptionType::Call, ExerciseStyle::European))
            .unwrap();

        assert_eq!(lattice.spot(1, 5), None);
        assert_eq!(lattice.value(1, 2), None);
        assert_eq!(lattice.spot(5, 0), None);
        assert!(lattice.value(4, 4).is_some());
    }

    #[test]
    fn test_close_to_black_scholes() {
        let p = params(OptionType::Call, ExerciseStyle::European);
        let tree = BinomialTree::new(500).unwrap().price(&p).unwrap();
        let bs = BlackScholes.price(&p).unwrap();
        assert!((tree - bs).abs() / bs < 0.01, "tree {} vs bs {}", tree, bs);
    }

    #[test]
    fn test_american_put_early_exercise_premium() {
        let tree = BinomialTree::default();
        let european = tree
            .price(&params(OptionType::Put, ExerciseStyle::European))
            .unwrap();
        let american = tree
            .price(&params(OptionType::Put, ExerciseStyle::American))
            .unwrap();
        assert!(american > european);
    }

    #[test]
    fn test_american_call_equals_european_without_dividends() {
        let tree = BinomialTree::default();
        let european = tree
            .price(&params(OptionType::Call, ExerciseStyle::European))
            .unwrap();
        let american = tree
            .price(&params(OptionType::Call, ExerciseStyle::American))
            .unwrap();
        assert_abs_diff_eq!(american, european, epsilon = 1e-10);
    }

    #[test]
    fn test_arbitrage_inconsistent_probability() {
        let p = OptionParams::european(100.0, 100.0, 0.01, 5.0, 1.0, OptionType::Call).unwrap();
        let err = BinomialTree::new(10).unwrap().price(&p).unwrap_err();
        match err {
            EngineError::ArbitrageInconsistent { probability, steps, .. } => {
                assert!(probability > 1.0);
                assert_eq!(steps, 10);
            }
            other => panic!("expected ArbitrageInconsistent, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_zero_maturity() {
        let p = params(OptionType::Call, ExerciseStyle::American)
            .with_maturity(0.0)
            .unwrap();
        assert!(matches!(
            BinomialTree::default().price(&p),
            Err(EngineError::InvalidParams { .. })
        ));
    }

    #[test]
    fn test_greeks_bounded_deep_in_the_money() {
        let tree = BinomialTree::default();
        let cases = [
            (50.0, 80.0, 0.05, 0.5, OptionType::Put),
            (150.0, 80.0, 0.2, 0.1, OptionType::Call),
        ];
        for (spot, strike, vol, maturity, option_type) in cases {
            for style in [ExerciseStyle::European, ExerciseStyle::American] {
                let p = OptionParams::new(spot, strike, vol, 0.05, maturity, option_type, style)
                    .unwrap();
                let g = tree.greeks(&p).unwrap();
                match option_type {
                    OptionType::Call => assert!((0.0..=1.0).contains(&g.delta), "{:?}", g),
                    OptionType::Put => assert!((-1.0..=0.0).contains(&g.delta), "{:?}", g),
                }
                assert!(g.gamma >= 0.0, "{:?}", g);
                assert!(g.vega >= 0.0, "{:?}", g);
            }
        }
    }

    #[test]
    fn test_greeks_near_closed_form() {
        let p = params(OptionType::Call, ExerciseStyle::European);
        let tree = BinomialTree::new(200).unwrap().greeks(&p).unwrap();
        let bs = BlackScholes.greeks(&p).unwrap();

        assert_abs_diff_eq!(tree.delta, bs.delta, epsilon = 0.01);
        assert!((tree.gamma - bs.gamma).abs() / bs.gamma < 0.05);
        assert!((tree.vega - bs.vega).abs() / bs.vega < 0.05);
        assert!((tree.theta - bs.theta).abs() / bs.theta.abs() < 0.05);
        assert!((tree.rho - bs.rho).abs() / bs.rho < 0.05);
    }
}
