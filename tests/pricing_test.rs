// tests/pricing_test.rs
use fast_hedge::pricing::{
    BinomialTree, BlackScholes, ExerciseStyle, OptimizedEngine, OptionParams, OptionPricer,
    OptionType, PricingEngine,
};
use fast_hedge::EngineError;
use proptest::prelude::*;

#[test]
fn test_benchmark_atm_call() {
    let params = OptionParams::european(100.0, 100.0, 0.2, 0.05, 1.0, OptionType::Call).unwrap();
    let price = BlackScholes.price(&params).unwrap();
    let expected = 10.45;

    let rel_error = (price - expected).abs() / expected;
    println!("\nBlack-Scholes ATM call: {} (benchmark {})", price, expected);

    assert!(rel_error < 0.005, "Benchmark error exceeds 0.5%: {}", rel_error);
}

#[test]
fn test_hull_textbook_pair() {
    // Hull, Options Futures and Other Derivatives: S=42, K=40, r=10%, σ=20%, T=0.5
    let call = OptionParams::european(42.0, 40.0, 0.2, 0.1, 0.5, OptionType::Call).unwrap();
    let put = OptionParams::european(42.0, 40.0, 0.2, 0.1, 0.5, OptionType::Put).unwrap();

    let c = BlackScholes.price(&call).unwrap();
    let p = BlackScholes.price(&put).unwrap();
    println!("\nHull call: {}, put: {}", c, p);

    assert!((c - 4.76).abs() < 0.005, "Call price {}", c);
    assert!((p - 0.81).abs() < 0.005, "Put price {}", p);
}

#[test]
fn test_deep_otm_strictly_positive() {
    let params = OptionParams::european(100.0, 1000.0, 0.2, 0.05, 1.0, OptionType::Call).unwrap();
    for engine in [&BlackScholes as &dyn PricingEngine, &OptionPricer::default()] {
        let price = engine.price(&params).unwrap();
        println!("\n{} deep OTM call: {:e}", engine.name(), price);
        assert!(price > 0.0 && price < 1e-10, "{}: {}", engine.name(), price);
    }
}

#[test]
fn test_american_put_early_exercise_premium() {
    let tree = BinomialTree::new(500).unwrap();
    let european = OptionParams::european(100.0, 110.0, 0.25, 0.08, 1.0, OptionType::Put).unwrap();
    let american = european.with_style(ExerciseStyle::American);

    let eu = tree.price(&european).unwrap();
    let am = tree.price(&american).unwrap();
    println!("\nEuropean put: {}, American put: {}", eu, am);

    assert!(am > eu, "American put must carry an early-exercise premium");
    assert!(am >= american.intrinsic_value());
}

#[test]
fn test_router_and_optimized_engine_agree() {
    let pricer = OptionPricer::new(200).unwrap();
    let optimized = OptimizedEngine::new(200).unwrap();
    for style in [ExerciseStyle::European, ExerciseStyle::American] {
        for option_type in [OptionType::Call, OptionType::Put] {
            let params =
                OptionParams::new(100.0, 95.0, 0.3, 0.04, 0.75, option_type, style).unwrap();
            assert_eq!(pricer.price(&params).unwrap(), optimized.price(&params).unwrap());
            assert_eq!(pricer.greeks(&params).unwrap(), optimized.greeks(&params).unwrap());
        }
    }
}

#[test]
fn test_vectorised_pricing_matches_scalar() {
    let engine = OptimizedEngine::default();
    let params = OptionParams::european(100.0, 100.0, 0.2, 0.05, 1.0, OptionType::Put).unwrap();
    let spots: Vec<f64> = (0..200).map(|i| 60.0 + 0.4 * i as f64).collect();

    let prices = engine.price_multiple(&spots, &params).unwrap();
    let max_diff = spots
        .iter()
        .zip(prices.iter())
        .map(|(&s, &p)| (p - BlackScholes.price(&params.with_spot(s).unwrap()).unwrap()).abs())
        .fold(0.0, f64::max);

    println!("\nMax vectorised vs scalar difference: {:e}", max_diff);
    assert!(max_diff < 1e-4, "Vectorised prices drift from closed form: {}", max_diff);
}

#[test]
fn test_error_kinds() {
    assert!(matches!(
        OptionParams::european(-1.0, 100.0, 0.2, 0.05, 1.0, OptionType::Call),
        Err(EngineError::InvalidParams { .. })
    ));

    let american = OptionParams::american(100.0, 100.0, 0.2, 0.05, 1.0, OptionType::Call).unwrap();
    assert!(matches!(
        BlackScholes.price(&american),
        Err(EngineError::UnsupportedStyle { .. })
    ));

    let expiring = OptionParams::european(100.0, 100.0, 0.2, 0.05, 0.0, OptionType::Call).unwrap();
    assert!(matches!(
        BlackScholes.greeks(&expiring),
        Err(EngineError::InvalidParams { .. })
    ));
    assert!(matches!(
        BinomialTree::default().price(&expiring),
        Err(EngineError::InvalidParams { .. })
    ));
    assert_eq!(expiring.with_spot(120.0).unwrap().intrinsic_value(), 20.0);

    // Rate far above what the tree's up move can carry
    let inconsistent =
        OptionParams::european(100.0, 100.0, 0.01, 5.0, 1.0, OptionType::Call).unwrap();
    assert!(matches!(
        BinomialTree::new(10).unwrap().price(&inconsistent),
        Err(EngineError::ArbitrageInconsistent { .. })
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_put_call_parity(
        spot in 10.0f64..500.0,
        strike in 10.0f64..500.0,
        vol in 0.01f64..1.0,
        rate in -0.05f64..0.15,
        maturity in 0.01f64..5.0,
    ) {
        let call =
            OptionParams::european(spot, strike, vol, rate, maturity, OptionType::Call).unwrap();
        let put =
            OptionParams::european(spot, strike, vol, rate, maturity, OptionType::Put).unwrap();
        let lhs = BlackScholes.price(&call).unwrap() - BlackScholes.price(&put).unwrap();
        let rhs = spot - strike * (-rate * maturity).exp();
        let scale = spot.max(strike);
        prop_assert!((lhs - rhs).abs() <= 1e-6 * scale, "C - P = {}, S - K e^-rT = {}", lhs, rhs);
    }

    #[test]
    fn prop_price_above_intrinsic(
        spot in 10.0f64..500.0,
        strike in 10.0f64..500.0,
        vol in 0.01f64..1.0,
        rate in -0.05f64..0.15,
        maturity in 0.01f64..5.0,
    ) {
        let call =
            OptionParams::european(spot, strike, vol, rate, maturity, OptionType::Call).unwrap();
        let put =
            OptionParams::european(spot, strike, vol, rate, maturity, OptionType::Put).unwrap();
        let tol = 1e-9 * spot.max(strike);
        let discount = (-rate * maturity).exp();

        // European lower bounds are on the discounted strike; with r >= 0 the
        // call bound dominates intrinsic, with r <= 0 the put bound does.
        let c = BlackScholes.price(&call).unwrap();
        let p = BlackScholes.price(&put).unwrap();
        prop_assert!(c >= (spot - strike * discount).max(0.0) - tol);
        prop_assert!(p >= (strike * discount - spot).max(0.0) - tol);
        if rate >= 0.0 {
            prop_assert!(c >= call.intrinsic_value() - tol);
        } else {
            prop_assert!(p >= put.intrinsic_value() - tol);
        }
    }
}
