use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use std::thread;

use tagtable::infrastructure::hash_table::{ConcurrentTable, Table};

// Test configuration
const THREAD_COUNT: i64 = 8;
const OPERATIONS_PER_THREAD: i64 = 10_000;
const BUCKET_COUNT: usize = 1024;

// Benchmark concurrent insertions into a per-bucket locked table
pub fn bench_concurrent_insertions(c: &mut Criterion) {
    let mut group = c.benchmark_group("ConcurrentInsertions");

    group.bench_function("ConcurrentTable", |b| {
        b.iter(|| {
            let table = Arc::new(ConcurrentTable::new(BUCKET_COUNT).unwrap());

            // Spawn threads for concurrent insertions
            let handles: Vec<_> = (0..THREAD_COUNT)
                .map(|thread_id| {
                    let table = table.clone();
                    thread::spawn(move || {
                        for i in 0..OPERATIONS_PER_THREAD {
                            let key = thread_id * OPERATIONS_PER_THREAD + i;
                            table.insert_int_by_text(&key.to_string(), key).unwrap();
                        }
                    })
                })
                .collect();

            // Wait for all threads to complete
            for handle in handles {
                handle.join().unwrap();
            }
        });
    });

    group.finish();
}

// Benchmark single-threaded insert, lookup and delete by integer key
pub fn bench_single_threaded_int_keys(c: &mut Criterion) {
    let mut group = c.benchmark_group("SingleThreaded");

    group.bench_function("IntKeys", |b| {
        b.iter(|| {
            let mut table = Table::new(BUCKET_COUNT).unwrap();

            for i in 0..OPERATIONS_PER_THREAD {
                table.insert_text_by_int(i, "test_value").unwrap();
            }
            for i in 0..OPERATIONS_PER_THREAD {
                assert!(table.get_text_by_int(i).unwrap().is_some());
            }
            for i in 0..OPERATIONS_PER_THREAD {
                table.delete_by_int(i);
            }
        });
    });

    group.finish();
}

// Benchmark single-threaded insert, lookup and delete by text key
pub fn bench_single_threaded_text_keys(c: &mut Criterion) {
    let keys: Vec<String> = (0..OPERATIONS_PER_THREAD).map(|i| i.to_string()).collect();
    let mut group = c.benchmark_group("SingleThreaded");

    group.bench_function("TextKeys", |b| {
        b.iter(|| {
            let mut table = Table::new(BUCKET_COUNT).unwrap();

            for (i, key) in keys.iter().enumerate() {
                table.insert_int_by_text(key, i as i64).unwrap();
            }
            for key in &keys {
                assert!(table.get_int_by_text(key).unwrap().is_some());
            }
            for key in &keys {
                table.delete_by_text(key);
            }
        });
    });

    group.finish();
}

// Benchmark read-heavy workloads (90% reads, 10% writes)
pub fn bench_read_heavy(c: &mut Criterion) {
    let mut group = c.benchmark_group("ReadHeavy");

    group.bench_function("Table", |b| {
        b.iter(|| {
            let mut table = Table::new(BUCKET_COUNT).unwrap();
            for i in 0..OPERATIONS_PER_THREAD {
                table.insert_text_by_int(i, "test_value").unwrap();
            }

            for i in 0..OPERATIONS_PER_THREAD {
                if i % 10 == 0 {
                    table.insert_text_by_int(i, "updated_value").unwrap();
                } else {
                    assert!(table.get_text_by_int(i).unwrap().is_some());
                }
            }
        });
    });

    group.finish();
}

// Export the benchmark group for criterion
criterion_group!(
    benches,
    bench_concurrent_insertions,
    bench_single_threaded_int_keys,
    bench_single_threaded_text_keys,
    bench_read_heavy
);

criterion_main!(benches);
