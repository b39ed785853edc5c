//! cm-factor CLI: construct and factor CM-structured semiprimes.
//!
//! Modes:
//!   --mode=demo --d=11 --v-bits=16        Construct an instance, then factor it (default)
//!   --mode=construct --d=11 --v-bits=20   Print a fresh instance with its secrets
//!   --mode=factor --n=<N> --d=11          Factor a given n
//!   --mode=benchmark --d=11               Sweep bit sizes and save cm_benchmark.json
//!
//! Options:
//!   --d=<N>          Discriminant, must be 3 mod 8 (default: 11)
//!   --n=<N>          Number to factor (factor mode)
//!   --v-bits=<N>     Bit size of the secret V (default: 16)
//!   --q-bits=<N>     Bit size of the companion prime q (default: 24)
//!   --seed=<N>       Seed the RNG for reproducible runs

use std::time::Instant;

use num_bigint::BigUint;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use cm_factor::{
    construct_cm_instance, factor_cm_semiprime_with, CmInstance, FactorBudget,
};

/// CLI configuration parsed from command-line arguments.
struct CliConfig {
    mode: Mode,
    d: BigUint,
    n: Option<BigUint>,
    v_bits: u64,
    q_bits: u64,
    seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
enum Mode {
    Construct,
    Factor,
    Demo,
    Benchmark,
}

/// One benchmark sweep entry.
#[derive(Serialize)]
struct BenchmarkRecord {
    v_bits: u64,
    q_bits: u64,
    n_bits: u64,
    n: String,
    method: String,
    success: bool,
    recovered_v: bool,
    construct_secs: f64,
    factor_secs: f64,
}

fn parse_args() -> CliConfig {
    let args: Vec<String> = std::env::args().collect();

    let mode = if args.iter().any(|a| a.contains("benchmark")) {
        Mode::Benchmark
    } else if args.iter().any(|a| a.contains("construct")) {
        Mode::Construct
    } else if args.iter().any(|a| a.contains("--mode=factor")) {
        Mode::Factor
    } else {
        Mode::Demo
    };

    let d = args
        .iter()
        .find(|a| a.starts_with("--d="))
        .and_then(|a| a.strip_prefix("--d=")?.parse::<BigUint>().ok())
        .unwrap_or_else(|| BigUint::from(11u32));

    let n = args
        .iter()
        .find(|a| a.starts_with("--n="))
        .and_then(|a| a.strip_prefix("--n=")?.parse::<BigUint>().ok());

    let v_bits = args
        .iter()
        .find(|a| a.starts_with("--v-bits="))
        .and_then(|a| a.strip_prefix("--v-bits=")?.parse::<u64>().ok())
        .unwrap_or(16);

    let q_bits = args
        .iter()
        .find(|a| a.starts_with("--q-bits="))
        .and_then(|a| a.strip_prefix("--q-bits=")?.parse::<u64>().ok())
        .unwrap_or(24);

    let seed = args
        .iter()
        .find(|a| a.starts_with("--seed="))
        .and_then(|a| a.strip_prefix("--seed=")?.parse::<u64>().ok());

    CliConfig {
        mode,
        d,
        n,
        v_bits,
        q_bits,
        seed,
    }
}

fn make_rng(config: &CliConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn main() {
    env_logger::init();

    let config = parse_args();

    println!("========================================");
    println!("  cm-factor: CM Semiprime Engine");
    println!("========================================");
    println!();

    match config.mode {
        Mode::Construct => run_construct_mode(&config),
        Mode::Factor => run_factor_mode(&config),
        Mode::Demo => run_demo_mode(&config),
        Mode::Benchmark => run_benchmark_mode(&config),
    }

    println!();
    println!("========================================");
    println!("  Done.");
    println!("========================================");
}

fn construct_or_exit(config: &CliConfig, rng: &mut StdRng) -> CmInstance {
    match construct_cm_instance(&config.d, config.v_bits, config.q_bits, rng) {
        Ok(inst) => inst,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Try a discriminant that is 3 mod 8 (e.g. 3, 11, 19, 43, 67, 163).");
            std::process::exit(1);
        }
    }
}

/// Construct an instance and print it, secrets included.
fn run_construct_mode(config: &CliConfig) {
    println!("--- Construct Mode ---");
    println!("  D = {}, V: {} bits, q: {} bits", config.d, config.v_bits, config.q_bits);
    println!();

    let mut rng = make_rng(config);
    let start = Instant::now();
    let inst = construct_or_exit(config, &mut rng);
    let elapsed = start.elapsed();

    println!("  n = {} ({} bits)", inst.n, inst.n.bits());
    println!("  p = {}", inst.p);
    println!("  q = {}", inst.q);
    println!("  V = {}", inst.v);
    println!();
    println!("Constructed in {:.3}s", elapsed.as_secs_f64());
}

/// Factor a caller-supplied n.
fn run_factor_mode(config: &CliConfig) {
    println!("--- Factor Mode ---");

    let n = match &config.n {
        Some(n) => n.clone(),
        None => {
            eprintln!("Error: factor mode needs --n=<number>");
            std::process::exit(1);
        }
    };
    println!("  n = {} ({} bits), D = {}", n, n.bits(), config.d);
    println!();

    let mut rng = make_rng(config);
    match factor_cm_semiprime_with(&n, &config.d, &FactorBudget::default(), &mut rng) {
        Ok(result) => {
            println!("  {} = {} * {}", result.n, result.factor_a, result.factor_b);
            match &result.recovered_v {
                Some(v) => println!("  Recovered V = {}", v),
                None => println!("  No CM structure recovered for either factor."),
            }
            println!("  Method: {}", result.method);
            println!("  Time:   {:.3}s", result.duration.as_secs_f64());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Construct an instance, forget the secrets, factor it back, and check.
fn run_demo_mode(config: &CliConfig) {
    println!("--- Demo Mode ---");
    println!("  D = {}, V: {} bits, q: {} bits", config.d, config.v_bits, config.q_bits);
    println!();

    let mut rng = make_rng(config);
    let inst = construct_or_exit(config, &mut rng);

    println!("Step 1: Constructed instance");
    println!("  n = {} ({} bits)", inst.n, inst.n.bits());
    println!("  (secret: p = {}, q = {}, V = {})", inst.p, inst.q, inst.v);
    println!();

    println!("Step 2: Factoring from (n, D) alone...");
    let result = match factor_cm_semiprime_with(&inst.n, &inst.d, &FactorBudget::default(), &mut rng)
    {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!("  {} = {} * {}", result.n, result.factor_a, result.factor_b);
    println!("  Method: {}", result.method);
    println!("  Time:   {:.3}s", result.duration.as_secs_f64());
    println!();

    let factors_match = (result.factor_a == inst.p && result.factor_b == inst.q)
        || (result.factor_a == inst.q && result.factor_b == inst.p);
    let v_match = result.recovered_v.as_ref() == Some(&inst.v);

    println!("Step 3: Verification");
    println!("  Factors match: {}", if factors_match { "YES" } else { "NO" });
    println!(
        "  V recovered:   {}",
        match &result.recovered_v {
            Some(v) if v_match => format!("YES ({})", v),
            Some(v) => format!("DIFFERENT ({} vs secret {})", v, inst.v),
            None => "NO".to_string(),
        }
    );
}

/// Sweep (v_bits, q_bits) pairs, report a summary table, save JSON.
fn run_benchmark_mode(config: &CliConfig) {
    println!("--- Benchmark Mode ---");
    println!("  D = {}", config.d);
    println!();

    let sweep: [(u64, u64); 4] = [(16, 16), (20, 20), (24, 24), (28, 28)];
    let mut rng = make_rng(config);
    let mut records = Vec::new();

    for (v_bits, q_bits) in sweep {
        let params = CliConfig {
            mode: Mode::Benchmark,
            d: config.d.clone(),
            n: None,
            v_bits,
            q_bits,
            seed: config.seed,
        };

        let t0 = Instant::now();
        let inst = construct_or_exit(&params, &mut rng);
        let construct_secs = t0.elapsed().as_secs_f64();

        let t1 = Instant::now();
        let outcome =
            factor_cm_semiprime_with(&inst.n, &inst.d, &FactorBudget::default(), &mut rng);
        let factor_secs = t1.elapsed().as_secs_f64();

        let (method, success, recovered_v) = match &outcome {
            Ok(result) => (
                result.method.to_string(),
                true,
                result.recovered_v.as_ref() == Some(&inst.v),
            ),
            Err(_) => ("-".to_string(), false, false),
        };

        println!(
            "  V {:>2} bits, q {:>2} bits | n {:>3} bits | {:<22} | V recovered: {}",
            v_bits,
            q_bits,
            inst.n.bits(),
            method,
            if recovered_v { "yes" } else { "no" },
        );

        records.push(BenchmarkRecord {
            v_bits,
            q_bits,
            n_bits: inst.n.bits(),
            n: inst.n.to_string(),
            method,
            success,
            recovered_v,
            construct_secs,
            factor_secs,
        });
    }

    println!();
    println!("Benchmark Summary:");
    println!(
        "  {:>6} | {:>6} | {:>6} | {:>12} | {:>12}",
        "V bits", "q bits", "n bits", "construct(s)", "factor(s)"
    );
    println!("  {}", "-".repeat(56));
    for r in &records {
        println!(
            "  {:>6} | {:>6} | {:>6} | {:>12.4} | {:>12.4}",
            r.v_bits, r.q_bits, r.n_bits, r.construct_secs, r.factor_secs
        );
    }

    save_json("cm_benchmark.json", &records);
    println!();
    println!("Results saved: cm_benchmark.json");
}

/// Save a serializable value as JSON.
fn save_json<T: Serialize>(path: &str, data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => {
            if let Err(e) = std::fs::write(path, &json) {
                eprintln!("  Warning: failed to write {}: {}", path, e);
            }
        }
        Err(e) => {
            eprintln!("  Warning: failed to serialize {}: {}", path, e);
        }
    }
}
