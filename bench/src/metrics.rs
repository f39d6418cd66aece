//! Per-phase outcome and latency accounting

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use tagtable::Outcome;

const OUTCOMES: [Outcome; 6] = [
    Outcome::Added,
    Outcome::Replaced,
    Outcome::AlreadyPresent,
    Outcome::Deleted,
    Outcome::NotFound,
    Outcome::Found,
];

fn slot(outcome: Outcome) -> usize {
    match outcome {
        Outcome::Added => 0,
        Outcome::Replaced => 1,
        Outcome::AlreadyPresent => 2,
        Outcome::Deleted => 3,
        Outcome::NotFound => 4,
        Outcome::Found => 5,
    }
}

/// Counters for one benchmark phase
///
/// Every operation of a phase is expected to end in the same outcome
/// (`ADDED` while storing, `FOUND` while reading back). Anything else,
/// including read-back values that differ from what was stored and table
/// errors, counts against the phase.
pub struct Metrics {
    expected: Outcome,
    outcomes: [AtomicU64; OUTCOMES.len()],
    mismatches: AtomicU64,
    failures: AtomicU64,
    latency_sum_ns: AtomicU64,
    latency_max_ns: AtomicU64,
}

impl Metrics {
    pub fn new(expected: Outcome) -> Self {
        Self {
            expected,
            outcomes: Default::default(),
            mismatches: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            latency_sum_ns: AtomicU64::new(0),
            latency_max_ns: AtomicU64::new(0),
        }
    }

    /// Run one table operation and charge its latency to this phase
    pub fn timed<T>(&self, op: impl FnOnce() -> T) -> T {
        let begin = Instant::now();
        let result = op();
        let latency_ns = begin.elapsed().as_nanos() as u64;
        self.latency_sum_ns.fetch_add(latency_ns, Ordering::Relaxed);
        self.latency_max_ns.fetch_max(latency_ns, Ordering::Relaxed);
        result
    }

    pub fn record_outcome(&self, outcome: Outcome) {
        self.outcomes[slot(outcome)].fetch_add(1, Ordering::Relaxed);
    }

    /// A read-back found the key holding some other value
    pub fn record_mismatch(&self) {
        self.mismatches.fetch_add(1, Ordering::Relaxed);
    }

    /// A table error or a worker that died
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self, outcome: Outcome) -> u64 {
        self.outcomes[slot(outcome)].load(Ordering::Relaxed)
    }

    /// Operations that completed, whatever their outcome
    pub fn total_ops(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|count| count.load(Ordering::Relaxed))
            .sum::<u64>()
            + self.mismatches.load(Ordering::Relaxed)
            + self.failures.load(Ordering::Relaxed)
    }

    /// Operations that did not end in the expected outcome
    pub fn unexpected(&self) -> u64 {
        self.total_ops() - self.count(self.expected)
    }

    pub fn avg_latency_us(&self) -> f64 {
        let ops = self.total_ops();
        if ops == 0 {
            return 0.0;
        }
        self.latency_sum_ns.load(Ordering::Relaxed) as f64 / ops as f64 / 1000.0
    }

    pub fn max_latency_us(&self) -> f64 {
        self.latency_max_ns.load(Ordering::Relaxed) as f64 / 1000.0
    }

    /// Non-zero counters, e.g. `ADDED=999998 ALREADY_PRESENT=2`
    pub fn summary(&self) -> String {
        let mut parts: Vec<String> = OUTCOMES
            .iter()
            .filter_map(|&outcome| match self.count(outcome) {
                0 => None,
                count => Some(format!("{}={}", outcome, count)),
            })
            .collect();
        for (label, counter) in [("MISMATCH", &self.mismatches), ("FAILED", &self.failures)] {
            let count = counter.load(Ordering::Relaxed);
            if count > 0 {
                parts.push(format!("{}={}", label, count));
            }
        }
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(" ")
        }
    }
}
