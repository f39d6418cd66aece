use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::Rng;

// Import the hash functions from the main crate
use tagtable::infrastructure::hash::{hash_integer, hash_text};
use xxhash_rust::xxh64::xxh64;

// Generate a random string of specified length
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    let mut s = String::with_capacity(length);

    for _ in 0..length {
        let idx = rng.gen_range(0..CHARSET.len());
        s.push(CHARSET[idx] as char);
    }

    s
}

// Text key hashing at several lengths, xxh64 as a baseline
pub fn bench_text_keys(c: &mut Criterion) {
    for (name, length) in [("ShortStrings", 10), ("MediumStrings", 100), ("LongStrings", 1000)] {
        let s = generate_random_string(length);
        let mut group = c.benchmark_group(name);

        group.bench_function("djb2", |b: &mut criterion::Bencher| {
            b.iter(|| hash_text(black_box(&s)))
        });
        group.bench_function("xxh64", |b: &mut criterion::Bencher| {
            b.iter(|| xxh64(black_box(s.as_bytes()), 0))
        });

        group.finish();
    }
}

// Decimal-string keys, the shape of the stress driver's workload
pub fn bench_formatted_strings(c: &mut Criterion) {
    let keys: Vec<String> = (0..1000).map(|i| i.to_string()).collect();
    let mut group = c.benchmark_group("FormattedStrings");

    group.bench_function("djb2", |b: &mut criterion::Bencher| {
        b.iter(|| {
            for key in &keys {
                black_box(hash_text(black_box(key)));
            }
        })
    });

    group.finish();
}

// Integer key hashing
pub fn bench_integer_keys(c: &mut Criterion) {
    let mut rng = rand::thread_rng();
    let keys: Vec<i64> = (0..1000).map(|_| rng.gen_range(i64::MIN..i64::MAX)).collect();
    let mut group = c.benchmark_group("IntegerKeys");

    group.bench_function("avalanche", |b: &mut criterion::Bencher| {
        b.iter(|| {
            for key in &keys {
                black_box(hash_integer(black_box(*key)));
            }
        })
    });
    group.bench_function("xxh64", |b: &mut criterion::Bencher| {
        b.iter(|| {
            for key in &keys {
                black_box(xxh64(black_box(&key.to_le_bytes()), 0));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_text_keys, bench_formatted_strings, bench_integer_keys);
criterion_main!(benches);
