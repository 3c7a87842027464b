// src/pricing/params.rs
use crate::error::{validation::*, EngineError, EngineResult};
use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionType {
    Call,
    Put,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

impl FromStr for OptionType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" => Ok(OptionType::Call),
            "put" => Ok(OptionType::Put),
            other => Err(EngineError::InvalidConfiguration {
                field: "option_type".to_string(),
                reason: format!("expected 'call' or 'put', got '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExerciseStyle {
    #[default]
    European,
    American,
}

impl fmt::Display for ExerciseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExerciseStyle::European => write!(f, "european"),
            ExerciseStyle::American => write!(f, "american"),
        }
    }
}

impl FromStr for ExerciseStyle {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "european" => Ok(ExerciseStyle::European),
            "american" => Ok(ExerciseStyle::American),
            other => Err(EngineError::InvalidConfiguration {
                field: "style".to_string(),
                reason: format!("expected 'european' or 'american', got '{}'", other),
            }),
        }
    }
}

/// Contract and market inputs for pricing one vanilla option.
///
/// Fields are only reachable through validated constructors, so a value of
/// this type always satisfies spot > 0, strike > 0, volatility > 0,
/// finite rate and maturity ≥ 0. Maturity 0 is representable (an expiring
/// contract) but the pricing models reject it; use [`OptionParams::payoff`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionParams {
    spot: f64,
    strike: f64,
    volatility: f64,
    rate: f64,
    maturity: f64,
    option_type: OptionType,
    style: ExerciseStyle,
}

impl OptionParams {
    pub fn new(
        spot: f64,
        strike: f64,
        volatility: f64,
        rate: f64,
        maturity: f64,
        option_type: OptionType,
        style: ExerciseStyle,
    ) -> EngineResult<Self> {
        validate_positive("spot", spot)?;
        validate_positive("strike", strike)?;
        validate_positive("volatility", volatility)?;
        validate_finite("rate", rate)?;
        validate_non_negative("maturity", maturity)?;

        Ok(Self {
            spot,
            strike,
            volatility,
            rate,
            maturity,
            option_type,
            style,
        })
    }

    pub fn european(
        spot: f64,
        strike: f64,
        volatility: f64,
        rate: f64,
        maturity: f64,
        option_type: OptionType,
    ) -> EngineResult<Self> {
        Self::new(
            spot,
            strike,
            volatility,
            rate,
            maturity,
            option_type,
            ExerciseStyle::European,
        )
    }

    pub fn american(
        spot: f64,
        strike: f64,
        volatility: f64,
        rate: f64,
        maturity: f64,
        option_type: OptionType,
    ) -> EngineResult<Self> {
        Self::new(
            spot,
            strike,
            volatility,
            rate,
            maturity,
            option_type,
            ExerciseStyle::American,
        )
    }

    pub fn spot(&self) -> f64 {
        self.spot
    }

    pub fn strike(&self) -> f64 {
        self.strike
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn maturity(&self) -> f64 {
        self.maturity
    }

    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    pub fn style(&self) -> ExerciseStyle {
        self.style
    }

    pub fn is_call(&self) -> bool {
        self.option_type == OptionType::Call
    }

    pub fn with_spot(&self, spot: f64) -> EngineResult<Self> {
        validate_positive("spot", spot)?;
        Ok(Self { spot, ..*self })
    }

    pub fn with_volatility(&self, volatility: f64) -> EngineResult<Self> {
        validate_positive("volatility", volatility)?;
        Ok(Self { volatility, ..*self })
    }

    pub fn with_rate(&self, rate: f64) -> EngineResult<Self> {
        validate_finite("rate", rate)?;
        Ok(Self { rate, ..*self })
    }

    pub fn with_maturity(&self, maturity: f64) -> EngineResult<Self> {
        validate_non_negative("maturity", maturity)?;
        Ok(Self { maturity, ..*self })
    }

    pub fn with_style(&self, style: ExerciseStyle) -> Self {
        Self { style, ..*self }
    }

    /// Exercise value at a given underlying price
    #[inline]
    pub fn payoff(&self, spot: f64) -> f64 {
        match self.option_type {
            OptionType::Call => (spot - self.strike).max(0.0),
            OptionType::Put => (self.strike - spot).max(0.0),
        }
    }

    /// Exercise value at the current spot
    pub fn intrinsic_value(&self) -> f64 {
        self.payoff(self.spot)
    }
}

/// First-order and second-order sensitivities of an option or portfolio.
///
/// Units follow desk conventions: vega and rho per 1% move, theta per
/// calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GreeksResult {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
}

impl GreeksResult {
    /// Greeks of `quantity` units of the instrument
    pub fn scaled(&self, quantity: f64) -> Self {
        Self {
            delta: self.delta * quantity,
            gamma: self.gamma * quantity,
            theta: self.theta * quantity,
            vega: self.vega * quantity,
            rho: self.rho * quantity,
        }
    }

    /// Greeks of one share of the underlying
    pub fn stock() -> Self {
        Self {
            delta: 1.0,
            ..Default::default()
        }
    }

    /// Reject non-finite sensitivities before they reach the caller
    pub fn validated(self, method: &str) -> EngineResult<Self> {
        validate_result(method, self.delta)?;
        validate_result(method, self.gamma)?;
        validate_result(method, self.theta)?;
        validate_result(method, self.vega)?;
        validate_result(method, self.rho)?;
        Ok(self)
    }
}

impl Add for GreeksResult {
    type Output = GreeksResult;

    fn add(self, rhs: GreeksResult) -> GreeksResult {
        GreeksResult {
            delta: self.delta + rhs.delta,
            gamma: self.gamma + rhs.gamma,
            theta: self.theta + rhs.theta,
            vega: self.vega + rhs.vega,
            rho: self.rho + rhs.rho,
        }
    }
}

impl AddAssign for GreeksResult {
    fn add_assign(&mut self, rhs: GreeksResult) {
        *self = *self + rhs;
    }
}
