// scripts/benchmark.rs
use fast_hedge::hedging::HedgingSimulator;
use fast_hedge::math_utils::Timer;
use fast_hedge::portfolio::{Portfolio, Position};
use fast_hedge::pricing::{
    BinomialTree, BlackScholes, OptimizedEngine, OptionParams, OptionType, PricingEngine,
};
use std::env;
use std::hint::black_box;
use std::process::Command;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct SystemInfo {
    os: String,
    cpu_model: String,
    cpu_cores: usize,
    rust_version: String,
    rayon_threads: usize,
}

impl SystemInfo {
    fn gather() -> Self {
        Self {
            os: env::consts::OS.to_string(),
            cpu_model: Self::get_cpu_model(),
            cpu_cores: num_cpus::get(),
            rust_version: Self::get_rust_version(),
            rayon_threads: rayon::current_num_threads(),
        }
    }

    fn get_cpu_model() -> String {
        std::fs::read_to_string("/proc/cpuinfo")
            .ok()
            .and_then(|content| {
                content
                    .lines()
                    .find(|line| line.starts_with("model name"))
                    .and_then(|line| line.split(':').nth(1))
                    .map(|s| s.trim().to_string())
            })
            .unwrap_or_else(|| "Unknown CPU".to_string())
    }

    fn get_rust_version() -> String {
        Command::new("rustc")
            .arg("--version")
            .output()
            .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
            .unwrap_or_else(|_| "Unknown Rust version".to_string())
    }
}

#[derive(Debug)]
struct BenchmarkResult {
    name: String,
    units: usize,
    time_ms: f64,
    value: f64,
    reference: Option<f64>,
}

impl BenchmarkResult {
    fn throughput(&self) -> f64 {
        self.units as f64 / (self.time_ms / 1000.0)
    }

    fn relative_error(&self) -> Option<f64> {
        self.reference.map(|r| (self.value - r).abs() / r.abs())
    }
}

fn atm_call() -> OptionParams {
    OptionParams::european(100.0, 100.0, 0.2, 0.05, 1.0, OptionType::Call)
        .expect("Valid parameters")
}

fn run_pricing_benchmarks() -> Vec<BenchmarkResult> {
    let mut results = Vec::new();
    let params = atm_call();
    let reference = BlackScholes.price(&params).expect("Closed form price");
    let mut timer = Timer::new();

    let iterations = 1_000_000;
    timer.start();
    let mut price = 0.0;
    for _ in 0..iterations {
        price = BlackScholes.price(black_box(&params)).expect("Closed form price");
    }
    results.push(BenchmarkResult {
        name: "Black-Scholes price".to_string(),
        units: iterations,
        time_ms: timer.elapsed_ms(),
        value: price,
        reference: Some(10.4506),
    });

    timer.start();
    let mut delta = 0.0;
    for _ in 0..iterations {
        delta = BlackScholes.greeks(black_box(&params)).expect("Closed form Greeks").delta;
    }
    results.push(BenchmarkResult {
        name: "Black-Scholes Greeks".to_string(),
        units: iterations,
        time_ms: timer.elapsed_ms(),
        value: delta,
        reference: None,
    });

    for steps in [100, 500, 1000] {
        let tree = BinomialTree::new(steps).expect("Valid step count");
        let iterations = 200;
        timer.start();
        let mut price = 0.0;
        for _ in 0..iterations {
            price = tree.price(black_box(&params)).expect("Tree price");
        }
        results.push(BenchmarkResult {
            name: format!("Binomial price ({} steps)", steps),
            units: iterations,
            time_ms: timer.elapsed_ms(),
            value: price,
            reference: Some(reference),
        });
    }

    results
}

fn run_vectorised_benchmarks() -> Vec<BenchmarkResult> {
    let mut results = Vec::new();
    let engine = OptimizedEngine::default();
    let params = atm_call();
    let mut timer = Timer::new();

    let n_spots = 1_000_000;
    let spots: Vec<f64> = (0..n_spots)
        .map(|i| 50.0 + 100.0 * i as f64 / n_spots as f64)
        .collect();
    timer.start();
    let prices = engine.price_multiple(&spots, &params).expect("Batch pricing");
    results.push(BenchmarkResult {
        name: "Vectorised price (1M spots)".to_string(),
        units: n_spots,
        time_ms: timer.elapsed_ms(),
        value: prices[n_spots / 2],
        reference: Some(BlackScholes.price(&params).expect("Closed form price")),
    });

    let (n_paths, n_steps) = (50_000, 252);
    timer.start();
    let paths = engine
        .simulate_paths(100.0, 0.2, 0.05, 1.0, n_paths, n_steps, 42)
        .expect("Path simulation");
    let terminal_mean = paths.column(n_steps).mean().unwrap_or(f64::NAN);
    results.push(BenchmarkResult {
        name: "GBM paths (50k x 252)".to_string(),
        units: n_paths,
        time_ms: timer.elapsed_ms(),
        value: terminal_mean,
        reference: Some(100.0 * 0.05f64.exp()),
    });

    results
}

fn run_hedging_benchmarks() -> Vec<BenchmarkResult> {
    let mut results = Vec::new();
    let call = OptionParams::european(100.0, 100.0, 0.25, 0.05, 0.25, OptionType::Call)
        .expect("Valid parameters");
    let hedge = OptionParams::european(100.0, 95.0, 0.25, 0.05, 0.25, OptionType::Put)
        .expect("Valid parameters");
    let book = Portfolio::new()
        .with_position(Position::option(call, 100.0))
        .expect("Finite quantity");
    let simulator = HedgingSimulator::new(BlackScholes).expect("Thread pool");
    let mut timer = Timer::new();

    for n_scenarios in [1_000, 10_000, 100_000] {
        println!("Running hedging comparison with {} scenarios...", n_scenarios);
        timer.start();
        let comparison = simulator
            .compare_strategies(&book, n_scenarios, Some(&hedge), 42)
            .expect("Hedging simulation");
        results.push(BenchmarkResult {
            name: format!("Hedge comparison ({}k scenarios)", n_scenarios / 1000),
            units: n_scenarios,
            time_ms: timer.elapsed_ms(),
            value: comparison.delta.variance_reduction,
            reference: None,
        });
    }

    results
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("fast-hedge Benchmark Suite");
    println!("==========================\n");

    let system_info = SystemInfo::gather();
    println!("System Information:");
    println!("  OS: {}", system_info.os);
    println!("  CPU: {}", system_info.cpu_model);
    println!("  CPU Cores: {}", system_info.cpu_cores);
    println!("  Rust Version: {}", system_info.rust_version);
    println!("  Rayon Threads: {}", system_info.rayon_threads);
    println!(
        "  Benchmark Date: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    println!("Running pricing benchmarks...");
    let mut all_results = run_pricing_benchmarks();
    println!("Running vectorised benchmarks...");
    all_results.extend(run_vectorised_benchmarks());
    all_results.extend(run_hedging_benchmarks());

    println!("\n{:=<96}", "");
    println!("BENCHMARK RESULTS");
    println!("{:=<96}", "");
    println!(
        "{:<34} {:>10} {:>12} {:>15} {:>10} {:>10}",
        "Benchmark", "Units", "Time (ms)", "Units/sec", "Value", "Rel Error"
    );
    println!("{:-<96}", "");

    for result in &all_results {
        println!(
            "{:<34} {:>10} {:>12.2} {:>15.0} {:>10.4} {:>10}",
            result.name,
            result.units,
            result.time_ms,
            result.throughput(),
            result.value,
            result
                .relative_error()
                .map(|e| format!("{:.3}%", e * 100.0))
                .unwrap_or_else(|| "N/A".to_string())
        );
    }

    println!("{:=<96}", "");
    println!("\nRun with: cargo run --bin benchmark --release");
}
