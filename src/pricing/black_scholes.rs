// src/pricing/black_scholes.rs
//! Analytical Black-Scholes formulas for European options and Greeks
//!
//! # Mathematical Foundation
//!
//! Under the Black-Scholes model, the underlying asset follows:
//! ```text
//! dS_t = r S_t dt + σ S_t dW_t
//! ```
//!
//! The risk-neutral pricing formula gives:
//! ```text
//! V(S,t) = e^(-r(T-t)) * E^Q[payoff(S_T) | S_t = S]
//! ```
//!
//! For European options, this has closed-form solutions involving
//! the cumulative normal distribution function Φ(x).
//!
//! The free functions below work in raw annual units and assume `t > 0`,
//! `sigma > 0`. [`BlackScholes`] wraps them behind [`PricingEngine`] with
//! input checks and desk scaling (vega/rho per 1%, theta per day).

use super::{ExerciseStyle, GreeksResult, OptionParams, OptionType, PricingEngine};
use crate::error::{validation::validate_result, EngineError, EngineResult};
use crate::math_utils::{norm_cdf, norm_pdf};

/// Compute d₁ and d₂
///
/// ```text
/// d₁ = [ln(S/K) + (r + σ²/2)T] / (σ√T)
/// d₂ = d₁ - σ√T
/// ```
#[inline]
pub fn bs_d1_d2(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> (f64, f64) {
    let sig_sqrt_t = sigma * t.sqrt();
    let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / sig_sqrt_t;
    (d1, d1 - sig_sqrt_t)
}

/// Black-Scholes European call option price
///
/// # Formula
/// ```text
/// C(S,K,r,σ,T) = S*Φ(d₁) - K*e^(-rT)*Φ(d₂)
/// ```
pub fn bs_call_price(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> f64 {
    let (d1, d2) = bs_d1_d2(s, k, r, sigma, t);
    s * norm_cdf(d1) - k * (-r * t).exp() * norm_cdf(d2)
}

/// Black-Scholes European put option price
///
/// # Formula
/// ```text
/// P(S,K,r,σ,T) = K*e^(-rT)*Φ(-d₂) - S*Φ(-d₁)
/// ```
pub fn bs_put_price(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> f64 {
    let (d1, d2) = bs_d1_d2(s, k, r, sigma, t);
    k * (-r * t).exp() * norm_cdf(-d2) - s * norm_cdf(-d1)
}

/// Black-Scholes Delta (∂V/∂S)
///
/// ```text
/// Δ_call = Φ(d₁)        ∈ [0, 1]
/// Δ_put  = Φ(d₁) - 1    ∈ [-1, 0]
/// ```
pub fn bs_delta(option_type: OptionType, s: f64, k: f64, r: f64, sigma: f64, t: f64) -> f64 {
    let (d1, _) = bs_d1_d2(s, k, r, sigma, t);
    match option_type {
        OptionType::Call => norm_cdf(d1),
        OptionType::Put => norm_cdf(d1) - 1.0,
    }
}

/// Black-Scholes Gamma (∂²V/∂S²), identical for calls and puts
///
/// ```text
/// Γ = φ(d₁) / (S * σ * √T)
/// ```
pub fn bs_gamma(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> f64 {
    let (d1, _) = bs_d1_d2(s, k, r, sigma, t);
    norm_pdf(d1) / (s * sigma * t.sqrt())
}

/// Black-Scholes Vega (∂V/∂σ) per unit of volatility
///
/// ```text
/// ν = S * φ(d₁) * √T
/// ```
pub fn bs_vega(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> f64 {
    let (d1, _) = bs_d1_d2(s, k, r, sigma, t);
    s * norm_pdf(d1) * t.sqrt()
}

/// Black-Scholes Theta (∂V/∂t) per year
///
/// ```text
/// Θ_call = -S*φ(d₁)*σ/(2√T) - r*K*e^(-rT)*Φ(d₂)
/// Θ_put  = -S*φ(d₁)*σ/(2√T) + r*K*e^(-rT)*Φ(-d₂)
/// ```
///
/// Usually negative for long options: time erodes value.
pub fn bs_theta(option_type: OptionType, s: f64, k: f64, r: f64, sigma: f64, t: f64) -> f64 {
    let (d1, d2) = bs_d1_d2(s, k, r, sigma, t);
    let decay = -s * norm_pdf(d1) * sigma / (2.0 * t.sqrt());
    let carry = r * k * (-r * t).exp();
    match option_type {
        OptionType::Call => decay - carry * norm_cdf(d2),
        OptionType::Put => decay + carry * norm_cdf(-d2),
    }
}

/// Black-Scholes Rho (∂V/∂r) per unit of rate
///
/// ```text
/// ρ_call =  K * T * e^(-rT) * Φ(d₂)
/// ρ_put  = -K * T * e^(-rT) * Φ(-d₂)
/// ```
pub fn bs_rho(option_type: OptionType, s: f64, k: f64, r: f64, sigma: f64, t: f64) -> f64 {
    let (_, d2) = bs_d1_d2(s, k, r, sigma, t);
    let pv_strike_t = k * t * (-r * t).exp();
    match option_type {
        OptionType::Call => pv_strike_t * norm_cdf(d2),
        OptionType::Put => -pv_strike_t * norm_cdf(-d2),
    }
}

/// Closed-form pricer for European options.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlackScholes;

impl BlackScholes {
    pub const NAME: &'static str = "Black-Scholes";

    pub fn new() -> Self {
        BlackScholes
    }

    fn check(params: &OptionParams) -> EngineResult<()> {
        if params.style() != ExerciseStyle::European {
            return Err(EngineError::UnsupportedStyle {
                model: Self::NAME,
                style: params.style(),
            });
        }
        // Volatility > 0 is guaranteed by OptionParams; T = 0 is not.
        if params.maturity() <= 0.0 {
            return Err(EngineError::InvalidParams {
                parameter: "maturity".to_string(),
                value: params.maturity(),
                constraint: "must be > 0 for closed-form pricing; value expiring options by payoff"
                    .to_string(),
            });
        }
        Ok(())
    }
}

impl PricingEngine for BlackScholes {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn price(&self, params: &OptionParams) -> EngineResult<f64> {
        Self::check(params)?;
        let (s, k, r, sigma, t) = (
            params.spot(),
            params.strike(),
            params.rate(),
            params.volatility(),
            params.maturity(),
        );
        let price = match params.option_type() {
            OptionType::Call => bs_call_price(s, k, r, sigma, t),
            OptionType::Put => bs_put_price(s, k, r, sigma, t),
        };
        // Cancellation in deep out-of-the-money tails can leave a tiny negative residue
        validate_result(Self::NAME, price).map(|p| p.max(0.0))
    }

    fn greeks(&self, params: &OptionParams) -> EngineResult<GreeksResult> {
        Self::check(params)?;
        let (s, k, r, sigma, t) = (
            params.spot(),
            params.strike(),
            params.rate(),
            params.volatility(),
            params.maturity(),
        );
        let kind = params.option_type();

        GreeksResult {
            delta: bs_delta(kind, s, k, r, sigma, t),
            gamma: bs_gamma(s, k, r, sigma, t),
            theta: bs_theta(kind, s, k, r, sigma, t) / 365.0,
            vega: bs_vega(s, k, r, sigma, t) / 100.0,
            rho: bs_rho(kind, s, k, r, sigma, t) / 100.0,
        }
        .validated(Self::NAME)
    }
}
