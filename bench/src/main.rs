//! Tagtable Benchmark Tool
//!
//! Stores `count` entries from several threads into one shared table,
//! then reads every entry back in random order and reports timings.

use clap::Parser;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tagtable::{Outcome, TableConfig, TableResult};

mod metrics;
mod scenarios;

use metrics::Metrics;
use scenarios::Scenario;

#[derive(Parser, Debug, Clone)]
#[command(name = "tagtable-bench")]
#[command(about = "Tagtable hash table stress and timing tool")]
struct Args {
    #[arg(short = 't', long, default_value = "6")]
    threads: i64,

    #[arg(short = 'n', long, default_value = "1000000")]
    count: i64,

    /// Bucket count; defaults to the configuration file, else count / 4
    #[arg(short = 'b', long)]
    buckets: Option<usize>,

    #[arg(short = 's', long, default_value = "string_keyed_ints")]
    scenario: String,

    /// JSON table configuration
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "0")]
    seed: u64,
}

fn run_store_thread(start: i64, args: &Args, scenario: &dyn Scenario, metrics: &Metrics) {
    let mut i = start;
    while i < args.count {
        match metrics.timed(|| scenario.store(i)) {
            Ok(outcome) => {
                // Every sequence number is stored exactly once
                if outcome != Outcome::Added {
                    tracing::warn!(key = i, outcome = %outcome, "store hit an existing entry");
                }
                metrics.record_outcome(outcome);
            }
            Err(err) => {
                tracing::warn!(key = i, error = %err, "store failed");
                metrics.record_failure();
            }
        }
        i += args.threads;
    }
}

fn run_verify(keys: &[i64], scenario: &dyn Scenario, metrics: &Metrics) {
    for &i in keys {
        match metrics.timed(|| scenario.verify(i)) {
            Ok(Some(true)) => metrics.record_outcome(Outcome::Found),
            Ok(Some(false)) => {
                println!("Error: value for {} did not read back", i);
                metrics.record_mismatch();
            }
            Ok(None) => {
                println!("Error: {} was lost", i);
                metrics.record_outcome(Outcome::NotFound);
            }
            Err(err) => {
                println!("Error: reading {}: {}", i, err);
                metrics.record_failure();
            }
        }
    }
}

fn build_scenario(name: &str, buckets: usize) -> TableResult<Option<Arc<dyn Scenario>>> {
    let scenario: Arc<dyn Scenario> = match name {
        "string_keyed_ints" => Arc::new(scenarios::StringKeyedInts::new(buckets)?),
        "int_keyed_texts" => Arc::new(scenarios::IntKeyedTexts::new(buckets)?),
        "table_locked" => Arc::new(scenarios::TableLocked::new(buckets)?),
        _ => return Ok(None),
    };
    Ok(Some(scenario))
}

fn print_phase(label: &str, count: i64, elapsed: Duration, metrics: &Metrics) {
    println!(
        "{} {} entries: {}.{:06} sec ({:.1} ops/s)",
        label,
        count,
        elapsed.as_secs(),
        elapsed.subsec_micros(),
        metrics.total_ops() as f64 / elapsed.as_secs_f64()
    );
    println!(
        "    latency: {:6.2} us (avg), {:6.2} us (max)",
        metrics.avg_latency_us(),
        metrics.max_latency_us()
    );
    println!(
        "    outcomes: {}, unexpected: {}",
        metrics.summary(),
        metrics.unexpected()
    );
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match TableConfig::load(path) {
            Ok(config) => Some(config),
            Err(err) => {
                eprintln!("Failed to load configuration: {}", err);
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };
    if config.as_ref().is_none_or(|config| config.enable_log) {
        let level = config
            .as_ref()
            .map_or(tracing::Level::WARN, |config| config.log_level.into());
        tracing_subscriber::fmt().with_max_level(level).init();
    }

    if args.threads < 1 || args.count < 0 {
        eprintln!("threads must be at least 1 and count non-negative");
        return ExitCode::FAILURE;
    }
    let buckets = args
        .buckets
        .or(config.as_ref().map(|config| config.bucket_count))
        .unwrap_or((args.count as usize >> 2).max(1));

    let scenario = match build_scenario(&args.scenario, buckets) {
        Ok(Some(scenario)) => scenario,
        Ok(None) => {
            eprintln!("Unknown scenario: {}", args.scenario);
            return ExitCode::FAILURE;
        }
        Err(err) => {
            eprintln!("Failed to create table: {}", err);
            return ExitCode::FAILURE;
        }
    };

    println!("Tagtable Benchmark Tool");
    println!("=======================");
    println!("Started: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("Scenario: {}", scenario.name());
    println!("Threads: {}", args.threads);
    println!("Entries: {}", args.count);
    println!("Buckets: {}", buckets);
    println!();

    let store_metrics = Arc::new(Metrics::new(Outcome::Added));
    let start_time = Instant::now();
    let handles: Vec<_> = (0..args.threads)
        .map(|start| {
            let scenario = Arc::clone(&scenario);
            let metrics = Arc::clone(&store_metrics);
            let thread_args = args.clone();
            std::thread::spawn(move || {
                run_store_thread(start, &thread_args, scenario.as_ref(), &metrics);
            })
        })
        .collect();
    for handle in handles {
        if handle.join().is_err() {
            store_metrics.record_failure();
        }
    }
    let store_elapsed = start_time.elapsed();

    let mut keys: Vec<i64> = (0..args.count).collect();
    keys.shuffle(&mut rand::rngs::StdRng::seed_from_u64(args.seed));

    let verify_metrics = Metrics::new(Outcome::Found);
    let verify_start = Instant::now();
    run_verify(&keys, scenario.as_ref(), &verify_metrics);
    let verify_elapsed = verify_start.elapsed();

    let stored = scenario.len();
    if stored != args.count as usize {
        println!("Error: table holds {} entries, expected {}", stored, args.count);
    }

    print_phase("Store", args.count, store_elapsed, &store_metrics);
    print_phase("Read", args.count, verify_elapsed, &verify_metrics);

    let unexpected = store_metrics.unexpected() + verify_metrics.unexpected();
    if unexpected == 0 && stored == args.count as usize {
        println!("No errors.");
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
