// Concurrent table with one lock per bucket chain

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use super::chain::{allocate_buckets, Chain, ChainKey, ChainStats};
use super::value::{
    copy_text, BorrowedText, Outcome, PendingValue, Reference, Value, ValueTag,
};
use crate::types::{TableConfig, TableError, TableResult};

/// Array of individually locked chains for one key domain
struct LockedBuckets<K> {
    chains: Vec<Mutex<Chain<K>>>,
}

impl<K: ChainKey> LockedBuckets<K> {
    fn new(bucket_count: usize) -> TableResult<Self> {
        let mut chains = Vec::new();
        chains.try_reserve_exact(bucket_count)?;
        chains.extend(
            allocate_buckets::<K>(bucket_count)?
                .into_iter()
                .map(Mutex::new),
        );
        Ok(LockedBuckets { chains })
    }

    fn chain(&self, key: &K::Borrowed) -> &Mutex<Chain<K>> {
        &self.chains[K::bucket(key, self.chains.len())]
    }
}

/// Hash table shared between threads
///
/// Same key domains and operation matrix as [`super::Table`], but every
/// operation takes `&self` and locks only the bucket chain the key hashes
/// to. Lookups return owned copies since no borrow can outlive the lock.
pub struct ConcurrentTable {
    text_buckets: LockedBuckets<String>,
    int_buckets: LockedBuckets<i64>,
    bucket_count: usize,
    len: AtomicUsize,
}

impl ConcurrentTable {
    /// Create a new concurrent table with the specified number of buckets
    pub fn new(bucket_count: usize) -> TableResult<Self> {
        if bucket_count == 0 {
            return Err(TableError::InvalidCapacity(bucket_count));
        }

        let text_buckets = LockedBuckets::new(bucket_count)?;
        let int_buckets = LockedBuckets::new(bucket_count)?;
        debug!(bucket_count = bucket_count, "created concurrent table");
        Ok(ConcurrentTable {
            text_buckets,
            int_buckets,
            bucket_count,
            len: AtomicUsize::new(0),
        })
    }

    /// Create a concurrent table sized from configuration
    pub fn with_config(config: &TableConfig) -> TableResult<Self> {
        config.validate()?;
        Self::new(config.bucket_count)
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Number of entries in both key domains
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn upsert<K: ChainKey, V: PendingValue>(
        &self,
        buckets: &LockedBuckets<K>,
        key: &K::Borrowed,
        value: V,
    ) -> TableResult<Outcome> {
        // len changes only while the chain is locked
        let mut chain = buckets.chain(key).lock();
        let outcome = chain.upsert(key, value)?;
        if outcome == Outcome::Added {
            self.len.fetch_add(1, Ordering::Relaxed);
        }
        Ok(outcome)
    }

    fn remove<K: ChainKey>(&self, buckets: &LockedBuckets<K>, key: &K::Borrowed) -> Outcome {
        let mut chain = buckets.chain(key).lock();
        match chain.remove(key) {
            Some(_) => {
                self.len.fetch_sub(1, Ordering::Relaxed);
                Outcome::Deleted
            }
            None => Outcome::NotFound,
        }
    }

    /// Run `read` on the value stored under `key` while its chain is locked
    fn read<K: ChainKey, T>(
        buckets: &LockedBuckets<K>,
        key: &K::Borrowed,
        read: impl FnOnce(&Value) -> TableResult<T>,
    ) -> TableResult<Option<T>> {
        let chain = buckets.chain(key).lock();
        chain.find(key).map(|entry| read(entry.value())).transpose()
    }

    // Keyed by text

    pub fn insert_by_text(&self, key: &str, value: Value) -> TableResult<Outcome> {
        self.store_by_text(key, value)
    }

    fn store_by_text<V: PendingValue>(&self, key: &str, value: V) -> TableResult<Outcome> {
        trace!(key = %key, tag = %value.tag(), "concurrent insert by text key");
        self.upsert(&self.text_buckets, key, value).inspect_err(|err| {
            warn!(key = %key, error = %err, "concurrent insert by text key failed");
        })
    }

    pub fn insert_text_by_text(&self, key: &str, value: &str) -> TableResult<Outcome> {
        self.store_by_text(key, BorrowedText(value))
    }

    pub fn insert_int_by_text(&self, key: &str, value: i64) -> TableResult<Outcome> {
        self.insert_by_text(key, Value::Integer(value))
    }

    pub fn insert_float_by_text(&self, key: &str, value: f64) -> TableResult<Outcome> {
        self.insert_by_text(key, Value::Float(value))
    }

    pub fn insert_ref_by_text(&self, key: &str, value: Reference) -> TableResult<Outcome> {
        self.insert_by_text(key, Value::Reference(value))
    }

    /// Copy of the value stored under a text key
    pub fn get_by_text(&self, key: &str) -> Option<Value> {
        Self::read(&self.text_buckets, key, |value| Ok(value.clone())).unwrap_or(None)
    }

    pub fn get_text_by_text(&self, key: &str) -> TableResult<Option<String>> {
        Self::read(&self.text_buckets, key, read_text)
    }

    pub fn get_int_by_text(&self, key: &str) -> TableResult<Option<i64>> {
        Self::read(&self.text_buckets, key, read_integer)
    }

    pub fn get_float_by_text(&self, key: &str) -> TableResult<Option<f64>> {
        Self::read(&self.text_buckets, key, read_float)
    }

    pub fn get_ref_by_text(&self, key: &str) -> TableResult<Option<Reference>> {
        Self::read(&self.text_buckets, key, read_reference)
    }

    pub fn delete_by_text(&self, key: &str) -> Outcome {
        trace!(key = %key, "concurrent delete by text key");
        self.remove(&self.text_buckets, key)
    }

    // Keyed by integer

    pub fn insert_by_int(&self, key: i64, value: Value) -> TableResult<Outcome> {
        self.store_by_int(key, value)
    }

    fn store_by_int<V: PendingValue>(&self, key: i64, value: V) -> TableResult<Outcome> {
        trace!(key = %key, tag = %value.tag(), "concurrent insert by integer key");
        self.upsert(&self.int_buckets, &key, value).inspect_err(|err| {
            warn!(key = %key, error = %err, "concurrent insert by integer key failed");
        })
    }

    pub fn insert_text_by_int(&self, key: i64, value: &str) -> TableResult<Outcome> {
        self.store_by_int(key, BorrowedText(value))
    }

    pub fn insert_int_by_int(&self, key: i64, value: i64) -> TableResult<Outcome> {
        self.insert_by_int(key, Value::Integer(value))
    }

    pub fn insert_float_by_int(&self, key: i64, value: f64) -> TableResult<Outcome> {
        self.insert_by_int(key, Value::Float(value))
    }

    pub fn insert_ref_by_int(&self, key: i64, value: Reference) -> TableResult<Outcome> {
        self.insert_by_int(key, Value::Reference(value))
    }

    /// Copy of the value stored under an integer key
    pub fn get_by_int(&self, key: i64) -> Option<Value> {
        Self::read(&self.int_buckets, &key, |value| Ok(value.clone())).unwrap_or(None)
    }

    pub fn get_text_by_int(&self, key: i64) -> TableResult<Option<String>> {
        Self::read(&self.int_buckets, &key, read_text)
    }

    pub fn get_int_by_int(&self, key: i64) -> TableResult<Option<i64>> {
        Self::read(&self.int_buckets, &key, read_integer)
    }

    pub fn get_float_by_int(&self, key: i64) -> TableResult<Option<f64>> {
        Self::read(&self.int_buckets, &key, read_float)
    }

    pub fn get_ref_by_int(&self, key: i64) -> TableResult<Option<Reference>> {
        Self::read(&self.int_buckets, &key, read_reference)
    }

    pub fn delete_by_int(&self, key: i64) -> Outcome {
        trace!(key = %key, "concurrent delete by integer key");
        self.remove(&self.int_buckets, &key)
    }

    // Whole table

    /// Release every entry. Buckets are locked one at a time, so entries
    /// inserted concurrently into already-cleared buckets survive.
    pub fn clear(&self) -> usize {
        let released =
            self.clear_domain(&self.text_buckets) + self.clear_domain(&self.int_buckets);
        debug!(released = released, "cleared concurrent table");
        released
    }

    fn clear_domain<K: ChainKey>(&self, buckets: &LockedBuckets<K>) -> usize {
        let mut released = 0;
        for chain in &buckets.chains {
            let mut chain = chain.lock();
            let count = chain.clear();
            self.len.fetch_sub(count, Ordering::Relaxed);
            released += count;
        }
        released
    }

    /// Chain occupancy over both key domains, sampled bucket by bucket
    pub fn stats(&self) -> ChainStats {
        let mut stats = ChainStats::default();
        for chain in &self.text_buckets.chains {
            stats.accumulate(std::slice::from_ref(&*chain.lock()));
        }
        for chain in &self.int_buckets.chains {
            stats.accumulate(std::slice::from_ref(&*chain.lock()));
        }
        stats
    }
}

fn mismatch(expected: ValueTag, value: &Value) -> TableError {
    TableError::TagMismatch {
        expected,
        found: value.tag(),
    }
}

fn read_text(value: &Value) -> TableResult<String> {
    match value {
        Value::Text(text) => copy_text(text),
        other => Err(mismatch(ValueTag::Text, other)),
    }
}

fn read_integer(value: &Value) -> TableResult<i64> {
    value
        .as_integer()
        .ok_or_else(|| mismatch(ValueTag::Integer, value))
}

fn read_float(value: &Value) -> TableResult<f64> {
    value.as_float().ok_or_else(|| mismatch(ValueTag::Float, value))
}

fn read_reference(value: &Value) -> TableResult<Reference> {
    value
        .as_reference()
        .cloned()
        .ok_or_else(|| mismatch(ValueTag::Reference, value))
}
