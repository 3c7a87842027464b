// demos/error_handling_demo.rs
use fast_hedge::error::EngineError;
use fast_hedge::hedging::{HedgeStrategy, HedgingSimulator, ScenarioConfig, SimulationConfig};
use fast_hedge::portfolio::{calculate_portfolio_value, Portfolio, Position};
use fast_hedge::pricing::{
    BinomialTree, BlackScholes, OptimizedEngine, OptionParams, OptionType, PricingEngine,
};

fn report<T: std::fmt::Debug>(result: Result<T, EngineError>) {
    match result {
        Ok(value) => println!("   Unexpected: Should have failed! Got {:?}", value),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }
}

fn main() {
    println!("Error Handling Demo for fast-hedge");
    println!("==================================\n");

    // Test 1: Invalid option parameters
    println!("1. Testing negative spot...");
    report(OptionParams::european(-100.0, 100.0, 0.2, 0.05, 1.0, OptionType::Call));

    println!("\n2. Testing zero volatility...");
    report(OptionParams::european(100.0, 100.0, 0.0, 0.05, 1.0, OptionType::Call));

    // Test 3: Wrong model for the exercise style
    println!("\n3. Testing American option on Black-Scholes...");
    match OptionParams::american(100.0, 100.0, 0.2, 0.05, 1.0, OptionType::Put) {
        Ok(american) => report(BlackScholes.price(&american)),
        Err(e) => println!("   Unexpected error: {}", e),
    }

    // Test 4: Expired option handed to a model
    println!("\n4. Testing zero maturity...");
    match OptionParams::european(100.0, 100.0, 0.2, 0.05, 0.0, OptionType::Call) {
        Ok(expiring) => {
            report(BlackScholes.greeks(&expiring));
            println!("   Payoff at expiry instead: {:.4}", expiring.intrinsic_value());
        }
        Err(e) => println!("   Unexpected error: {}", e),
    }

    // Test 5: Arbitrage-inconsistent tree
    println!("\n5. Testing arbitrage-inconsistent tree (r = 500%, σ = 1%)...");
    match (
        BinomialTree::new(10),
        OptionParams::european(100.0, 100.0, 0.01, 5.0, 1.0, OptionType::Call),
    ) {
        (Ok(tree), Ok(params)) => report(tree.price(&params)),
        _ => println!("   Unexpected setup failure"),
    }

    println!("\n6. Testing tree with too few steps...");
    report(BinomialTree::new(1));

    // Test 7: Degenerate gamma hedge
    println!("\n7. Testing gamma hedge with a gammaless option...");
    let call = OptionParams::european(100.0, 100.0, 0.25, 0.05, 0.25, OptionType::Call);
    let dead = OptionParams::european(100.0, 1000.0, 0.1, 0.05, 1.0 / 365.0, OptionType::Call);
    match (call, dead, HedgingSimulator::new(BlackScholes)) {
        (Ok(call), Ok(dead), Ok(simulator)) => {
            let book = Portfolio::new().with_position(Position::option(call, 1.0));
            match book {
                Ok(book) => {
                    report(simulator.gamma_hedge(&book, &dead));

                    // Test 8: Revaluing past expiry
                    println!("\n8. Testing valuation past maturity...");
                    report(calculate_portfolio_value(&book, 100.0, None, 0.5, &BlackScholes));

                    // Test 9: Zero scenarios
                    println!("\n9. Testing zero scenarios...");
                    report(simulator.simulate_hedging_effectiveness(
                        &book,
                        &HedgeStrategy::Delta,
                        0,
                        42,
                    ));

                    // Test 10: Valid run
                    println!("\n10. Testing valid simulation...");
                    match simulator.simulate_hedging_effectiveness(
                        &book,
                        &HedgeStrategy::Delta,
                        1000,
                        42,
                    ) {
                        Ok(result) => println!(
                            "   ✓ Success: variance reduction = {:.2}%",
                            result.variance_reduction
                        ),
                        Err(e) => println!("   Unexpected error: {}", e),
                    }
                }
                Err(e) => println!("   Unexpected error: {}", e),
            }
        }
        _ => println!("   Unexpected setup failure"),
    }

    // Test 11: Bad simulation configuration
    println!("\n11. Testing invalid scenario configuration...");
    let config = SimulationConfig {
        scenarios: ScenarioConfig {
            spot_shock_range: (-1.5, 0.2),
            ..Default::default()
        },
        ..Default::default()
    };
    match HedgingSimulator::with_config(BlackScholes, config) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    println!("\n12. Testing path simulation with zero paths...");
    report(OptimizedEngine::default().simulate_paths(100.0, 0.2, 0.05, 1.0, 0, 252, 42));

    // Test 13: Error type matching
    println!("\n13. Testing error type matching...");
    match OptionParams::european(100.0, 100.0, 0.2, f64::NAN, 1.0, OptionType::Call) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(EngineError::InvalidParams {
            parameter,
            value,
            constraint,
        }) => {
            println!("   ✓ Caught InvalidParams: {} = {} ({})", parameter, value, constraint);
        }
        Err(other) => println!("   Unexpected error type: {}", other),
    }

    println!("\n✓ Error handling demo complete!");
    println!("All error cases were properly caught and handled.");
}
