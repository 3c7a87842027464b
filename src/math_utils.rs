// src/math_utils.rs
//! Shared math primitives for the pricing engines.
//!
//! `norm_cdf` is the reference implementation used by the closed-form
//! pricer: it goes through the complementary error function so deep
//! out-of-the-money tails keep full relative precision. `fast_norm_cdf` is
//! the polynomial approximation used by the vectorised engine.

use statrs::function::erf;
use std::f64::consts::SQRT_2;

const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Standard normal cumulative distribution function Φ(x)
///
/// ```text
/// Φ(x) = ½ · erfc(-x/√2)
/// ```
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erf::erfc(-x / SQRT_2)
}

/// Standard normal probability density function φ(x)
///
/// ```text
/// φ(x) = (1/√(2π)) · exp(-x²/2)
/// ```
#[inline]
pub fn norm_pdf(x: f64) -> f64 {
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Abramowitz-Stegun 26.2.17 polynomial approximation of Φ(x).
///
/// Max absolute error is about 7.5e-8. Symmetric by construction:
/// `fast_norm_cdf(-x) == 1 - fast_norm_cdf(x)`.
#[inline]
pub fn fast_norm_cdf(x: f64) -> f64 {
    const P: f64 = 0.231_641_9;
    const A1: f64 = 0.319_381_530;
    const A2: f64 = -0.356_563_782;
    const A3: f64 = 1.781_477_937;
    const A4: f64 = -1.821_255_978;
    const A5: f64 = 1.330_274_429;

    let z = x.abs();
    let t = 1.0 / P.mul_add(z, 1.0);
    let poly = A5.mul_add(t, A4).mul_add(t, A3).mul_add(t, A2).mul_add(t, A1) * t;
    let upper = norm_pdf(z) * poly;

    if x >= 0.0 {
        1.0 - upper
    } else {
        upper
    }
}

pub struct Timer {
    start_time: std::time::Instant,
}

impl Timer {
    pub fn new() -> Timer {
        Timer {
            start_time: std::time::Instant::now(),
        }
    }

    pub fn start(&mut self) {
        self.start_time = std::time::Instant::now();
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use statrs::distribution::{ContinuousCDF, Normal};

    #[test]
    fn test_norm_cdf_at_zero() {
        assert_abs_diff_eq!(norm_cdf(0.0), 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(fast_norm_cdf(0.0), 0.5, epsilon = 1e-7);
    }

    #[test]
    fn test_norm_cdf_matches_reference() {
        let reference = Normal::new(0.0, 1.0).unwrap();
        let mut x = -8.0;
        while x <= 8.0 {
            assert_abs_diff_eq!(norm_cdf(x), reference.cdf(x), epsilon = 1e-12);
            assert_abs_diff_eq!(fast_norm_cdf(x), reference.cdf(x), epsilon = 1e-6);
            x += 0.05;
        }
    }

    #[test]
    fn test_symmetry() {
        for &x in &[0.1, 0.5, 1.0, 1.96, 3.0, 6.5] {
            assert_abs_diff_eq!(norm_cdf(-x), 1.0 - norm_cdf(x), epsilon = 1e-12);
            assert_abs_diff_eq!(fast_norm_cdf(-x), 1.0 - fast_norm_cdf(x), epsilon = 1e-15);
        }
    }

    #[test]
    fn test_monotonic() {
        let mut prev = 0.0;
        let mut x = -10.0;
        while x <= 10.0 {
            let v = norm_cdf(x);
            assert!(v >= prev, "norm_cdf decreased at x = {}", x);
            assert!((0.0..=1.0).contains(&v));
            prev = v;
            x += 0.01;
        }
    }

    #[test]
    fn test_tail_stays_positive() {
        // Deep tails must not collapse to zero before the true value does
        assert!(norm_cdf(-11.0) > 0.0);
        assert!(norm_cdf(-11.0) < 1e-27);
    }

    #[test]
    fn test_norm_pdf_peak() {
        assert_abs_diff_eq!(norm_pdf(0.0), INV_SQRT_2PI, epsilon = 1e-15);
        assert_abs_diff_eq!(norm_pdf(1.0), norm_pdf(-1.0), epsilon = 1e-15);
    }

    proptest! {
        #[test]
        fn prop_cdf_symmetry(x in -12.0f64..12.0) {
            prop_assert!((norm_cdf(x) + norm_cdf(-x) - 1.0).abs() < 1e-14);
            prop_assert!((fast_norm_cdf(x) + fast_norm_cdf(-x) - 1.0).abs() < 1e-14);
        }
    }
}
