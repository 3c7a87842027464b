// src/error.rs
use crate::pricing::ExerciseStyle;

/// Error type shared by every pricing, portfolio and hedging operation.
///
/// All variants are local conditions the caller can react to. The engine
/// never hands back NaN or infinite values: anything that would produce one
/// is reported through this enum instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// A market or contract parameter is outside its domain
    #[error("Invalid parameter '{parameter}' = {value}: {constraint}")]
    InvalidParams {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// The pricing model cannot handle the requested exercise style
    #[error("{model} does not support {style} exercise")]
    UnsupportedStyle {
        model: &'static str,
        style: ExerciseStyle,
    },

    /// The hedge instrument carries no gamma, so no hedge quantity exists
    #[error("Degenerate hedge: hedge option gamma {gamma:e} is too close to zero")]
    DegenerateHedge { gamma: f64 },

    /// Binomial risk-neutral probability outside [0, 1]
    #[error(
        "Arbitrage-inconsistent tree: risk-neutral probability {probability} outside [0, 1] \
         (steps = {steps}, dt = {dt})"
    )]
    ArbitrageInconsistent {
        probability: f64,
        steps: usize,
        dt: f64,
    },

    /// Invalid engine or simulation configuration
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// A non-finite intermediate result was detected
    #[error("Numerical instability in {method}: {reason}")]
    NumericalInstability { method: String, reason: String },
}

/// Result type alias for fast-hedge operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Validation utilities
pub mod validation {
    use super::{EngineError, EngineResult};

    /// Validate that a parameter is finite and strictly positive
    pub fn validate_positive(name: &str, value: f64) -> EngineResult<()> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(EngineError::InvalidParams {
                parameter: name.to_string(),
                value,
                constraint: "must be finite and positive (> 0)".to_string(),
            })
        }
    }

    /// Validate that a parameter is finite and non-negative
    pub fn validate_non_negative(name: &str, value: f64) -> EngineResult<()> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(EngineError::InvalidParams {
                parameter: name.to_string(),
                value,
                constraint: "must be finite and non-negative (≥ 0)".to_string(),
            })
        }
    }

    /// Validate that a parameter is within a closed range
    pub fn validate_range(name: &str, value: f64, min: f64, max: f64) -> EngineResult<()> {
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(EngineError::InvalidParams {
                parameter: name.to_string(),
                value,
                constraint: format!("must be in range [{}, {}]", min, max),
            })
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> EngineResult<()> {
        if !value.is_finite() {
            Err(EngineError::InvalidParams {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Check a computed output before it leaves the engine
    pub fn validate_result(method: &str, value: f64) -> EngineResult<f64> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(EngineError::NumericalInstability {
                method: method.to_string(),
                reason: format!("result is not finite: {}", value),
            })
        }
    }

    /// Validate scenario count
    pub fn validate_scenarios(scenarios: usize) -> EngineResult<()> {
        if scenarios == 0 {
            Err(EngineError::InvalidConfiguration {
                field: "n_scenarios".to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else if scenarios > 100_000_000 {
            Err(EngineError::InvalidConfiguration {
                field: "n_scenarios".to_string(),
                reason: "exceeds maximum allowed (100 million)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate tree / path step count
    pub fn validate_steps(field: &str, steps: usize, min: usize) -> EngineResult<()> {
        if steps < min {
            Err(EngineError::InvalidConfiguration {
                field: field.to_string(),
                reason: format!("must be at least {}", min),
            })
        } else if steps > 10_000 {
            Err(EngineError::InvalidConfiguration {
                field: field.to_string(),
                reason: "exceeds maximum allowed (10,000)".to_string(),
            })
        } else {
            Ok(())
        }
    }
}
