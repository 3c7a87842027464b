// src/validation.rs
//! Accuracy checks of a pricing engine against reference prices
//!
//! - `validate_pricing`: benchmark cases within a relative error budget (0.5% by default)
//! - `validate_greeks`: sign and range sanity checks on an ATM call
//! - `convergence_study`: binomial tree error against the closed form as steps grow

use crate::error::{validation::*, EngineResult};
use crate::pricing::{
    BinomialTree, BlackScholes, ExerciseStyle, OptionParams, OptionType, PricingEngine,
};
use std::fmt;
use tracing::{info, warn};

/// Default relative error budget, in percent
pub const DEFAULT_TOLERANCE_PCT: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkCase {
    pub name: String,
    pub params: OptionParams,
    pub expected_price: f64,
}

impl BenchmarkCase {
    pub fn new(name: &str, params: OptionParams, expected_price: f64) -> Self {
        Self {
            name: name.to_string(),
            params,
            expected_price,
        }
    }
}

/// Closed-form reference prices for European options.
pub fn standard_cases() -> EngineResult<Vec<BenchmarkCase>> {
    use OptionType::{Call, Put};
    let european = OptionParams::european;
    Ok(vec![
        BenchmarkCase::new(
            "ATM European Call",
            european(100.0, 100.0, 0.2, 0.05, 1.0, Call)?,
            10.4506,
        ),
        BenchmarkCase::new(
            "OTM European Put",
            european(100.0, 95.0, 0.2, 0.05, 1.0, Put)?,
            3.7133,
        ),
        BenchmarkCase::new(
            "ITM European Call",
            european(110.0, 100.0, 0.25, 0.04, 0.5, Call)?,
            14.8152,
        ),
        BenchmarkCase::new(
            "Deep OTM Put",
            european(100.0, 80.0, 0.3, 0.06, 2.0, Put)?,
            4.1738,
        ),
        BenchmarkCase::new(
            "Short-dated ATM Call",
            european(50.0, 50.0, 0.15, 0.03, 0.25, Call)?,
            1.6843,
        ),
        BenchmarkCase::new(
            "Hull 42/40 Call",
            european(42.0, 40.0, 0.2, 0.1, 0.5, Call)?,
            4.7594,
        ),
        BenchmarkCase::new(
            "Hull 42/40 Put",
            european(42.0, 40.0, 0.2, 0.1, 0.5, Put)?,
            0.8086,
        ),
    ])
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub name: String,
    pub expected: f64,
    pub calculated: f64,
    pub error_pct: f64,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub results: Vec<ValidationResult>,
    pub max_error_pct: f64,
    pub avg_error_pct: f64,
    pub passed: usize,
    pub total: usize,
    pub target_met: bool,
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<25} {:>12} {:>12} {:>10}",
            "Test Case", "Expected", "Calculated", "Error %"
        )?;
        for r in &self.results {
            writeln!(
                f,
                "{:<25} {:>12.4} {:>12.4} {:>9.4}% {}",
                r.name,
                r.expected,
                r.calculated,
                r.error_pct,
                if r.passed { "PASS" } else { "FAIL" }
            )?;
        }
        writeln!(f, "Tests passed:  {}/{}", self.passed, self.total)?;
        writeln!(f, "Average error: {:.4}%", self.avg_error_pct)?;
        write!(
            f,
            "Maximum error: {:.4}% (target met: {})",
            self.max_error_pct,
            if self.target_met { "YES" } else { "NO" }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SanityCheck {
    pub name: &'static str,
    pub value: f64,
    pub passed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergencePoint {
    pub steps: usize,
    pub tree_price: f64,
    pub reference_price: f64,
    pub error_pct: f64,
}

/// Runs benchmark comparisons for one engine.
pub struct PricingValidator<E> {
    engine: E,
    cases: Vec<BenchmarkCase>,
    tolerance_pct: f64,
}

impl<E: PricingEngine> PricingValidator<E> {
    /// Validator over [`standard_cases`] with the default tolerance
    pub fn new(engine: E) -> EngineResult<Self> {
        Ok(Self {
            engine,
            cases: standard_cases()?,
            tolerance_pct: DEFAULT_TOLERANCE_PCT,
        })
    }

    pub fn with_cases(mut self, cases: Vec<BenchmarkCase>) -> Self {
        self.cases = cases;
        self
    }

    pub fn with_tolerance(mut self, tolerance_pct: f64) -> EngineResult<Self> {
        validate_positive("tolerance_pct", tolerance_pct)?;
        self.tolerance_pct = tolerance_pct;
        Ok(self)
    }

    pub fn cases(&self) -> &[BenchmarkCase] {
        &self.cases
    }

    pub fn validate_pricing(&self) -> EngineResult<ValidationReport> {
        let mut results = Vec::with_capacity(self.cases.len());
        for case in &self.cases {
            validate_positive("expected_price", case.expected_price)?;
            let calculated = self.engine.price(&case.params)?;
            let error_pct =
                ((calculated - case.expected_price) / case.expected_price).abs() * 100.0;
            let passed = error_pct <= self.tolerance_pct;
            if !passed {
                warn!(case = %case.name, error_pct, "benchmark outside tolerance");
            }
            results.push(ValidationResult {
                name: case.name.clone(),
                expected: case.expected_price,
                calculated,
                error_pct,
                passed,
            });
        }

        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let max_error_pct = results.iter().map(|r| r.error_pct).fold(0.0, f64::max);
        let avg_error_pct = if total == 0 {
            0.0
        } else {
            results.iter().map(|r| r.error_pct).sum::<f64>() / total as f64
        };
        let target_met = max_error_pct <= self.tolerance_pct;

        info!(
            engine = self.engine.name(),
            passed, total, max_error_pct, target_met, "pricing validation finished"
        );

        Ok(ValidationReport {
            results,
            max_error_pct,
            avg_error_pct,
            passed,
            total,
            target_met,
        })
    }

    /// Sign and range checks on the ATM call S=K=100, σ=20%, r=5%, T=1
    pub fn validate_greeks(&self) -> EngineResult<Vec<SanityCheck>> {
        let params = OptionParams::european(100.0, 100.0, 0.2, 0.05, 1.0, OptionType::Call)?;
        let g = self.engine.greeks(&params)?;
        Ok(vec![
            SanityCheck {
                name: "Delta in [0.4, 0.7]",
                value: g.delta,
                passed: (0.4..=0.7).contains(&g.delta),
            },
            SanityCheck {
                name: "Gamma positive",
                value: g.gamma,
                passed: g.gamma > 0.0,
            },
            SanityCheck {
                name: "Vega positive",
                value: g.vega,
                passed: g.vega > 0.0,
            },
            SanityCheck {
                name: "Theta negative",
                value: g.theta,
                passed: g.theta < 0.0,
            },
            SanityCheck {
                name: "Rho positive",
                value: g.rho,
                passed: g.rho > 0.0,
            },
        ])
    }
}

/// Binomial tree price against the closed form for each step count.
///
/// `params` is priced as a European option regardless of its style.
pub fn convergence_study(
    params: &OptionParams,
    steps: &[usize],
) -> EngineResult<Vec<ConvergencePoint>> {
    let european = params.with_style(ExerciseStyle::European);
    let reference_price = BlackScholes.price(&european)?;
    validate_positive("reference_price", reference_price)?;

    steps
        .iter()
        .map(|&n| {
            let tree_price = BinomialTree::new(n)?.price(&european)?;
            Ok(ConvergencePoint {
                steps: n,
                tree_price,
                reference_price,
                error_pct: ((tree_price - reference_price) / reference_price).abs() * 100.0,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::OptionPricer;

    #[test]
    fn test_closed_form_meets_target() {
        let report = PricingValidator::new(BlackScholes)
            .unwrap()
            .validate_pricing()
            .unwrap();
        assert_eq!(report.total, 7);
        assert_eq!(report.passed, report.total);
        assert!(report.target_met);
        assert!(report.max_error_pct < 0.01, "max error {}", report.max_error_pct);
    }

    #[test]
    fn test_tree_meets_target() {
        let validator = PricingValidator::new(BinomialTree::new(1000).unwrap()).unwrap();
        let report = validator.validate_pricing().unwrap();
        assert!(report.target_met, "{}", report);
    }

    #[test]
    fn test_wrong_benchmark_fails() {
        let params =
            OptionParams::european(100.0, 100.0, 0.2, 0.05, 1.0, OptionType::Call).unwrap();
        let report = PricingValidator::new(BlackScholes)
            .unwrap()
            .with_cases(vec![BenchmarkCase::new("wrong", params, 11.0)])
            .validate_pricing()
            .unwrap();
        assert_eq!(report.passed, 0);
        assert!(!report.target_met);
        assert!(report.to_string().contains("FAIL"));
    }

    #[test]
    fn test_tolerance_must_be_positive() {
        assert!(PricingValidator::new(BlackScholes)
            .unwrap()
            .with_tolerance(0.0)
            .is_err());
    }

    #[test]
    fn test_greeks_sanity() {
        let checks = PricingValidator::new(OptionPricer::default())
            .unwrap()
            .validate_greeks()
            .unwrap();
        assert_eq!(checks.len(), 5);
        assert!(checks.iter().all(|c| c.passed), "{:?}", checks);
    }

    #[test]
    fn test_convergence_study() {
        let params =
            OptionParams::american(100.0, 100.0, 0.2, 0.05, 1.0, OptionType::Call).unwrap();
        let points = convergence_study(&params, &[10, 50, 100, 500]).unwrap();
        assert_eq!(points.len(), 4);
        assert!(points[3].error_pct < 1.0);
        assert!(points[3].error_pct < points[0].error_pct);
        assert!(convergence_study(&params, &[1]).is_err());
    }
}
