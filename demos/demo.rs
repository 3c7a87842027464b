// demos/demo.rs
use fast_hedge::hedging::{HedgeResult, HedgingSimulator, VARIANCE_REDUCTION_TARGET};
use fast_hedge::math_utils::Timer;
use fast_hedge::portfolio::{Portfolio, Position};
use fast_hedge::pricing::{
    BinomialTree, BlackScholes, ExerciseStyle, OptimizedEngine, OptionParams, OptionPricer,
    OptionType, PricingEngine,
};
use fast_hedge::validation::{convergence_study, PricingValidator};
use fast_hedge::EngineResult;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run_demo_mode() {
        eprintln!("Demo failed: {}", e);
        std::process::exit(1);
    }
}

fn run_demo_mode() -> EngineResult<()> {
    println!("Running fast-hedge Demo\n");

    let s0 = 100.0;
    let k = 100.0;
    let r = 0.05;
    let sigma = 0.2;
    let t = 1.0;

    let call = OptionParams::european(s0, k, sigma, r, t, OptionType::Call)?;
    let put = OptionParams::european(s0, k, sigma, r, t, OptionType::Put)?;
    let american_put = put.with_style(ExerciseStyle::American);

    // Pricing
    let tree = BinomialTree::new(500)?;
    let mut timer = Timer::new();
    timer.start();
    let bs_call = BlackScholes.price(&call)?;
    let bs_put = BlackScholes.price(&put)?;
    let bs_time = timer.elapsed_ms();
    timer.start();
    let tree_call = tree.price(&call)?;
    let tree_am_put = tree.price(&american_put)?;
    let tree_time = timer.elapsed_ms();

    println!("--- Pricing (S={}, K={}, r={}, σ={}, T={}) ---", s0, k, r, sigma, t);
    println!("Black-Scholes call:        {:.6}", bs_call);
    println!("Black-Scholes put:         {:.6}", bs_put);
    println!("Binomial call (500 steps): {:.6}", tree_call);
    println!("American put (500 steps):  {:.6}", tree_am_put);
    println!(
        "Early exercise premium:    {:.6}",
        tree_am_put - tree.price(&put)?
    );
    println!(
        "Put-call parity residual:  {:.2e}",
        bs_call - bs_put - (s0 - k * (-r * t).exp())
    );
    println!("Closed form took {:.4} ms, tree took {:.4} ms\n", bs_time, tree_time);

    // Greeks
    println!("--- Greeks (vega/rho per 1%, theta per day) ---");
    println!(
        "{:<22} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "", "Delta", "Gamma", "Theta", "Vega", "Rho"
    );
    let pricer = OptionPricer::default();
    for (label, params) in [
        ("European call (BS)", &call),
        ("European put (BS)", &put),
        ("American put (tree)", &american_put),
    ] {
        let g = pricer.greeks(params)?;
        println!(
            "{:<22} {:>9.4} {:>9.4} {:>9.4} {:>9.4} {:>9.4}",
            label, g.delta, g.gamma, g.theta, g.vega, g.rho
        );
    }
    println!();

    // Vectorised pricing and paths
    let engine = OptimizedEngine::default();
    let spots = [80.0, 90.0, 100.0, 110.0, 120.0];
    let prices = engine.price_multiple(&spots, &call)?;
    println!("--- Vectorised call prices ---");
    for (s, p) in spots.iter().zip(prices.iter()) {
        println!("  S = {:>6.1}: {:.4}", s, p);
    }
    let paths = engine.simulate_paths(s0, sigma, r, t, 10_000, 252, 42)?;
    let terminal_mean = paths.column(252).mean().unwrap_or(f64::NAN);
    println!(
        "GBM terminal mean over {} paths: {:.4} (expected {:.4})\n",
        paths.nrows(),
        terminal_mean,
        s0 * (r * t).exp()
    );

    // Convergence
    println!("--- Binomial convergence ---");
    for point in convergence_study(&call, &[10, 50, 100, 500, 1000])? {
        println!(
            "  {:>5} steps: {:.6} (error {:.4}%)",
            point.steps, point.tree_price, point.error_pct
        );
    }
    println!();

    // Validation
    println!("--- Benchmark validation ---");
    let validator = PricingValidator::new(pricer)?;
    println!("{}", validator.validate_pricing()?);
    for check in validator.validate_greeks()? {
        println!(
            "  {:<22} {:>9.4} {}",
            check.name,
            check.value,
            if check.passed { "ok" } else { "FAILED" }
        );
    }
    println!();

    // Hedging
    let short_dated = OptionParams::european(100.0, 100.0, 0.25, 0.05, 0.25, OptionType::Call)?;
    let hedge_option = OptionParams::european(100.0, 95.0, 0.25, 0.05, 0.25, OptionType::Put)?;
    let book = Portfolio::new().with_position(Position::option(short_dated, 100.0))?;

    let simulator = HedgingSimulator::new(BlackScholes)?;
    let n_scenarios = 1000;
    timer.start();
    let comparison = simulator.compare_strategies(&book, n_scenarios, Some(&hedge_option), 42)?;
    let hedge_time = timer.elapsed_ms();

    println!("--- Hedging strategy comparison ({} scenarios) ---", n_scenarios);
    println!("Initial portfolio value: {:.2}", comparison.none.initial_value);
    println!(
        "{:<10} {:>12} {:>14} {:>12} {:>10} {:>10} {:>10}",
        "Strategy", "PnL std", "Variance", "Max loss", "Sharpe", "Delta", "Reduction"
    );
    for result in comparison.results() {
        print_result(result);
    }
    println!(
        "\nTarget met: {} (delta hedge >= {}% variance reduction)",
        if comparison.meets_target(VARIANCE_REDUCTION_TARGET) {
            "YES"
        } else {
            "NO"
        },
        VARIANCE_REDUCTION_TARGET
    );
    println!("Simulation took {:.2} ms", hedge_time);

    Ok(())
}

fn print_result(result: &HedgeResult) {
    println!(
        "{:<10} {:>12.4} {:>14.4} {:>12.4} {:>10.4} {:>10.4} {:>9.2}%",
        result.strategy.label(),
        result.pnl_std,
        result.pnl_variance,
        result.max_loss,
        result.sharpe,
        result.portfolio_greeks.delta,
        result.variance_reduction
    );
}
