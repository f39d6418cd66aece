//! Tagtable demo program: fills a small table by integer and by text key
//! and prints what comes back.

// Use jemalloc as global allocator
#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

use std::process::ExitCode;

use tagtable::{Outcome, Table, TableConfig, TableResult};

fn init_logging(config: &TableConfig) {
    if config.enable_log {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::from(config.log_level))
            .init();
    }
}

fn load_config() -> TableResult<TableConfig> {
    match std::env::args().nth(1) {
        Some(path) => TableConfig::load(path),
        None => Ok(TableConfig {
            bucket_count: 10,
            ..TableConfig::default()
        }),
    }
}

fn basic_test(config: &TableConfig) -> TableResult<bool> {
    let mut table = Table::with_config(config)?;
    let mut passed = true;

    for key in 0..5i64 {
        table.insert_text_by_int(key, &format!("string {}", key + 1))?;
    }
    println!("got strings:");
    for key in 0..5i64 {
        let value = table.get_text_by_int(key)?;
        println!("{}->{}", key + 1, value.unwrap_or("<missing>"));
        passed &= value == Some(format!("string {}", key + 1).as_str());
    }
    for key in 0..5i64 {
        passed &= table.delete_by_int(key) == Outcome::Deleted;
    }

    let family = [
        ("oldest", "Jonathan"),
        ("2ndoldest", "Zevi"),
        ("3rdoldest", "Jude"),
        ("4tholdest", "Voldemort"),
    ];
    for (key, value) in family {
        table.insert_text_by_text(key, value)?;
    }
    println!("got strings:");
    for (key, expected) in family {
        let value = table.get_text_by_text(key)?;
        println!("{}->{}", key, value.unwrap_or("<missing>"));
        passed &= value == Some(expected);
    }

    let again = table.insert_text_by_text("oldest", "Jonathan")?;
    let replaced = table.insert_text_by_text("oldest", "Zevi")?;
    println!("re-adding oldest: {}, replacing oldest: {}", again, replaced);
    passed &= again == Outcome::AlreadyPresent && replaced == Outcome::Replaced;

    tracing::info!(entries = table.len(), "basic test finished");
    Ok(passed)
}

fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config);

    match basic_test(&config) {
        Ok(true) => {
            println!("basic_test:\tPassed");
            ExitCode::SUCCESS
        }
        Ok(false) => {
            println!("basic_test:\tFailed");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("basic_test:\tError: {}", err);
            ExitCode::FAILURE
        }
    }
}
