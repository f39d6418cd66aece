// Hash table implementation with separate chaining over two key domains

use std::cell::Cell;

use tracing::{debug, trace, warn};

use crate::infrastructure::hash::{integer_bucket, text_bucket};
use crate::types::{TableConfig, TableError, TableResult};

pub mod chain;
pub mod concurrent;
pub mod value;

pub use chain::{ChainStats, Entry};
pub use concurrent::ConcurrentTable;
pub use value::{Outcome, Reference, Value, ValueTag};

use chain::{allocate_buckets, prepare_redistribution, redistribute, Chain};
use value::{BorrowedText, PendingValue};

/// Hash table structure
///
/// Text-keyed and integer-keyed entries live in two separate bucket arrays
/// of the same size, so the two key domains never see each other's entries.
///
/// A table is single-threaded: it can move between threads but cannot be
/// shared by reference. Use [`ConcurrentTable`] for shared access.
pub struct Table {
    /// Chains of text-keyed entries
    text_buckets: Vec<Chain<String>>,
    /// Chains of integer-keyed entries
    int_buckets: Vec<Chain<i64>>,
    /// Number of buckets per key domain
    bucket_count: usize,
    /// Number of buckets at creation
    bucket_count_initial: usize,
    text_len: usize,
    int_len: usize,
    /// Advisory copy of the last successful outcome
    last_outcome: Cell<Option<Outcome>>,
}

impl Table {
    /// Create a new hash table with the specified number of buckets
    pub fn new(bucket_count: usize) -> TableResult<Self> {
        if bucket_count == 0 {
            return Err(TableError::InvalidCapacity(bucket_count));
        }

        let text_buckets = allocate_buckets(bucket_count).inspect_err(|_| {
            warn!(bucket_count = bucket_count, "unable to allocate text bucket array");
        })?;
        let int_buckets = allocate_buckets(bucket_count).inspect_err(|_| {
            warn!(bucket_count = bucket_count, "unable to allocate integer bucket array");
        })?;

        debug!(bucket_count = bucket_count, "created table");
        Ok(Table {
            text_buckets,
            int_buckets,
            bucket_count,
            bucket_count_initial: bucket_count,
            text_len: 0,
            int_len: 0,
            last_outcome: Cell::new(None),
        })
    }

    /// Create a table sized from configuration
    pub fn with_config(config: &TableConfig) -> TableResult<Self> {
        config.validate()?;
        Self::new(config.bucket_count)
    }

    /// Number of buckets per key domain
    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Number of buckets the table was created with
    pub fn bucket_count_initial(&self) -> usize {
        self.bucket_count_initial
    }

    /// Total number of entries in both key domains
    pub fn len(&self) -> usize {
        self.text_len + self.int_len
    }

    pub fn len_text(&self) -> usize {
        self.text_len
    }

    pub fn len_int(&self) -> usize {
        self.int_len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries per bucket
    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.bucket_count as f64
    }

    /// Outcome of the last successful operation
    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome.get()
    }

    fn record(&self, outcome: Outcome) -> Outcome {
        self.last_outcome.set(Some(outcome));
        outcome
    }

    fn record_lookup<T>(&self, found: Option<T>) -> Option<T> {
        self.record(if found.is_some() { Outcome::Found } else { Outcome::NotFound });
        found
    }

    /// Chain occupancy over both key domains
    pub fn stats(&self) -> ChainStats {
        let mut stats = ChainStats::default();
        stats.accumulate(&self.text_buckets);
        stats.accumulate(&self.int_buckets);
        stats
    }

    // ------------------------------------------------------------------
    // Keyed by text

    /// Insert-or-update a value under a text key
    pub fn insert_by_text(&mut self, key: &str, value: Value) -> TableResult<Outcome> {
        self.store_by_text(key, value)
    }

    fn store_by_text<V: PendingValue>(&mut self, key: &str, value: V) -> TableResult<Outcome> {
        let index = text_bucket(key, self.bucket_count);
        trace!(key = %key, bucket = index, tag = %value.tag(), "inserting by text key");

        let outcome = self.text_buckets[index].upsert(key, value).inspect_err(|err| {
            warn!(key = %key, error = %err, "insert by text key failed");
        })?;
        if outcome == Outcome::Added {
            self.text_len += 1;
        }
        trace!(key = %key, outcome = %outcome, "insert by text key done");
        Ok(self.record(outcome))
    }

    pub fn insert_text_by_text(&mut self, key: &str, value: &str) -> TableResult<Outcome> {
        self.store_by_text(key, BorrowedText(value))
    }

    pub fn insert_int_by_text(&mut self, key: &str, value: i64) -> TableResult<Outcome> {
        self.insert_by_text(key, Value::Integer(value))
    }

    pub fn insert_float_by_text(&mut self, key: &str, value: f64) -> TableResult<Outcome> {
        self.insert_by_text(key, Value::Float(value))
    }

    pub fn insert_ref_by_text(&mut self, key: &str, value: Reference) -> TableResult<Outcome> {
        self.insert_by_text(key, Value::Reference(value))
    }

    /// Look up the value stored under a text key
    pub fn get_by_text(&self, key: &str) -> Option<&Value> {
        let index = text_bucket(key, self.bucket_count);
        trace!(key = %key, bucket = index, "fetching by text key");
        let found = self.text_buckets[index].find(key).map(Entry::value);
        self.record_lookup(found)
    }

    pub fn get_text_by_text(&self, key: &str) -> TableResult<Option<&str>> {
        expect_tag(self.get_by_text(key), ValueTag::Text, Value::as_text)
    }

    pub fn get_int_by_text(&self, key: &str) -> TableResult<Option<i64>> {
        expect_tag(self.get_by_text(key), ValueTag::Integer, Value::as_integer)
    }

    pub fn get_float_by_text(&self, key: &str) -> TableResult<Option<f64>> {
        expect_tag(self.get_by_text(key), ValueTag::Float, Value::as_float)
    }

    pub fn get_ref_by_text(&self, key: &str) -> TableResult<Option<Reference>> {
        expect_tag(self.get_by_text(key), ValueTag::Reference, |value| {
            value.as_reference().cloned()
        })
    }

    pub fn contains_text(&self, key: &str) -> bool {
        self.text_buckets[text_bucket(key, self.bucket_count)]
            .find(key)
            .is_some()
    }

    /// Delete the entry stored under a text key
    pub fn delete_by_text(&mut self, key: &str) -> Outcome {
        let index = text_bucket(key, self.bucket_count);
        trace!(key = %key, bucket = index, "deleting by text key");
        let outcome = match self.text_buckets[index].remove(key) {
            Some(_) => {
                self.text_len -= 1;
                Outcome::Deleted
            }
            None => Outcome::NotFound,
        };
        self.record(outcome)
    }

    /// Walk every text-keyed entry, bucket by bucket, each chain head first
    pub fn iter_text(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.text_buckets
            .iter()
            .flat_map(|chain| chain.iter())
            .map(|entry| (entry.key(), entry.value()))
    }

    // ------------------------------------------------------------------
    // Keyed by integer

    /// Insert-or-update a value under an integer key
    pub fn insert_by_int(&mut self, key: i64, value: Value) -> TableResult<Outcome> {
        self.store_by_int(key, value)
    }

    fn store_by_int<V: PendingValue>(&mut self, key: i64, value: V) -> TableResult<Outcome> {
        let index = integer_bucket(key, self.bucket_count);
        trace!(key = %key, bucket = index, tag = %value.tag(), "inserting by integer key");

        let outcome = self.int_buckets[index].upsert(&key, value).inspect_err(|err| {
            warn!(key = %key, error = %err, "insert by integer key failed");
        })?;
        if outcome == Outcome::Added {
            self.int_len += 1;
        }
        trace!(key = %key, outcome = %outcome, "insert by integer key done");
        Ok(self.record(outcome))
    }

    pub fn insert_text_by_int(&mut self, key: i64, value: &str) -> TableResult<Outcome> {
        self.store_by_int(key, BorrowedText(value))
    }

    pub fn insert_int_by_int(&mut self, key: i64, value: i64) -> TableResult<Outcome> {
        self.insert_by_int(key, Value::Integer(value))
    }

    pub fn insert_float_by_int(&mut self, key: i64, value: f64) -> TableResult<Outcome> {
        self.insert_by_int(key, Value::Float(value))
    }

    pub fn insert_ref_by_int(&mut self, key: i64, value: Reference) -> TableResult<Outcome> {
        self.insert_by_int(key, Value::Reference(value))
    }

    /// Look up the value stored under an integer key
    pub fn get_by_int(&self, key: i64) -> Option<&Value> {
        let index = integer_bucket(key, self.bucket_count);
        trace!(key = %key, bucket = index, "fetching by integer key");
        let found = self.int_buckets[index].find(&key).map(Entry::value);
        self.record_lookup(found)
    }

    pub fn get_text_by_int(&self, key: i64) -> TableResult<Option<&str>> {
        expect_tag(self.get_by_int(key), ValueTag::Text, Value::as_text)
    }

    pub fn get_int_by_int(&self, key: i64) -> TableResult<Option<i64>> {
        expect_tag(self.get_by_int(key), ValueTag::Integer, Value::as_integer)
    }

    pub fn get_float_by_int(&self, key: i64) -> TableResult<Option<f64>> {
        expect_tag(self.get_by_int(key), ValueTag::Float, Value::as_float)
    }

    pub fn get_ref_by_int(&self, key: i64) -> TableResult<Option<Reference>> {
        expect_tag(self.get_by_int(key), ValueTag::Reference, |value| {
            value.as_reference().cloned()
        })
    }

    pub fn contains_int(&self, key: i64) -> bool {
        self.int_buckets[integer_bucket(key, self.bucket_count)]
            .find(&key)
            .is_some()
    }

    /// Delete the entry stored under an integer key
    pub fn delete_by_int(&mut self, key: i64) -> Outcome {
        let index = integer_bucket(key, self.bucket_count);
        trace!(key = %key, bucket = index, "deleting by integer key");
        let outcome = match self.int_buckets[index].remove(&key) {
            Some(_) => {
                self.int_len -= 1;
                Outcome::Deleted
            }
            None => Outcome::NotFound,
        };
        self.record(outcome)
    }

    /// Walk every integer-keyed entry, bucket by bucket, each chain head first
    pub fn iter_int(&self) -> impl Iterator<Item = (i64, &Value)> + '_ {
        self.int_buckets
            .iter()
            .flat_map(|chain| chain.iter())
            .map(|entry| (*entry.key(), entry.value()))
    }

    // ------------------------------------------------------------------
    // Whole-table operations

    /// Release every entry in both key domains, keeping the bucket arrays.
    /// Returns the number of entries released.
    pub fn clear(&mut self) -> usize {
        let released = self.text_buckets.iter_mut().map(Chain::clear).sum::<usize>()
            + self.int_buckets.iter_mut().map(Chain::clear).sum::<usize>();
        self.text_len = 0;
        self.int_len = 0;
        debug!(released = released, "cleared table");
        released
    }

    /// Redistribute every entry into `new_bucket_count` buckets
    ///
    /// Never triggered implicitly. Both new bucket arrays are fully reserved
    /// before any entry moves, so on error the table is unchanged.
    pub fn rehash(&mut self, new_bucket_count: usize) -> TableResult<()> {
        if new_bucket_count == 0 {
            return Err(TableError::InvalidCapacity(new_bucket_count));
        }

        let report = |_: &TableError| {
            warn!(new_bucket_count = new_bucket_count, "unable to allocate buckets for rehash");
        };
        let mut text_buckets =
            prepare_redistribution(&self.text_buckets, new_bucket_count).inspect_err(report)?;
        let mut int_buckets =
            prepare_redistribution(&self.int_buckets, new_bucket_count).inspect_err(report)?;

        redistribute(std::mem::take(&mut self.text_buckets), &mut text_buckets);
        redistribute(std::mem::take(&mut self.int_buckets), &mut int_buckets);
        self.text_buckets = text_buckets;
        self.int_buckets = int_buckets;

        debug!(
            from = self.bucket_count,
            to = new_bucket_count,
            entries = self.len(),
            "rehashed table"
        );
        self.bucket_count = new_bucket_count;
        Ok(())
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("bucket_count", &self.bucket_count)
            .field("bucket_count_initial", &self.bucket_count_initial)
            .field("text_len", &self.text_len)
            .field("int_len", &self.int_len)
            .finish()
    }
}

/// Project a found value to the requested tag, reporting a mismatch
fn expect_tag<'a, T>(
    found: Option<&'a Value>,
    expected: ValueTag,
    project: impl FnOnce(&'a Value) -> Option<T>,
) -> TableResult<Option<T>> {
    match found {
        None => Ok(None),
        Some(value) => match project(value) {
            Some(projected) => Ok(Some(projected)),
            None => Err(TableError::TagMismatch {
                expected,
                found: value.tag(),
            }),
        },
    }
}
