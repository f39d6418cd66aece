// Bucket chains: owned entry sequences anchored at one bucket

use std::fmt::Debug;

use super::value::{copy_text, Outcome, PendingValue, Value};
use crate::infrastructure::hash::{integer_bucket, text_bucket};
use crate::types::TableResult;

/// Key type of one key domain
pub trait ChainKey: Sized {
    /// Borrowed form callers pass to lookups
    type Borrowed: ?Sized + PartialEq + Debug;

    /// Bucket index of a key
    fn bucket(key: &Self::Borrowed, bucket_count: usize) -> usize;

    /// Make the owned key stored in a new entry
    fn try_own(key: &Self::Borrowed) -> TableResult<Self>;

    fn borrowed(&self) -> &Self::Borrowed;
}

impl ChainKey for String {
    type Borrowed = str;

    fn bucket(key: &str, bucket_count: usize) -> usize {
        text_bucket(key, bucket_count)
    }

    fn try_own(key: &str) -> TableResult<Self> {
        copy_text(key)
    }

    fn borrowed(&self) -> &str {
        self
    }
}

impl ChainKey for i64 {
    type Borrowed = i64;

    fn bucket(key: &i64, bucket_count: usize) -> usize {
        integer_bucket(*key, bucket_count)
    }

    fn try_own(key: &i64) -> TableResult<Self> {
        Ok(*key)
    }

    fn borrowed(&self) -> &i64 {
        self
    }
}

/// One stored key/value pair
#[derive(Debug, Clone)]
pub struct Entry<K> {
    key: K,
    value: Value,
}

impl<K: ChainKey> Entry<K> {
    pub fn key(&self) -> &K::Borrowed {
        self.key.borrowed()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

/// Collision chain of one bucket
///
/// Entries are kept oldest first in the backing vector; the logical chain
/// head is the last element, so prepending is a push and traversal runs in
/// reverse.
#[derive(Debug)]
pub struct Chain<K> {
    entries: Vec<Entry<K>>,
}

impl<K> Default for Chain<K> {
    fn default() -> Self {
        Chain { entries: Vec::new() }
    }
}

impl<K: ChainKey> Chain<K> {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Walk the chain from head to tail
    pub fn iter(&self) -> impl Iterator<Item = &Entry<K>> + '_ {
        self.entries.iter().rev()
    }

    fn position(&self, key: &K::Borrowed) -> Option<usize> {
        self.entries.iter().rposition(|entry| entry.key.borrowed() == key)
    }

    /// Find the entry stored under `key`
    pub fn find(&self, key: &K::Borrowed) -> Option<&Entry<K>> {
        self.position(key).map(|pos| &self.entries[pos])
    }

    /// Insert-or-update
    ///
    /// The whole chain is scanned before anything is allocated, and an
    /// identical pair allocates nothing. On error the chain is left untouched.
    pub(crate) fn upsert<V: PendingValue>(
        &mut self,
        key: &K::Borrowed,
        value: V,
    ) -> TableResult<Outcome> {
        if let Some(pos) = self.position(key) {
            let entry = &mut self.entries[pos];
            if value.matches(&entry.value) {
                return Ok(Outcome::AlreadyPresent);
            }
            entry.value = value.try_into_value()?;
            return Ok(Outcome::Replaced);
        }

        let key = K::try_own(key)?;
        let value = value.try_into_value()?;
        self.entries.try_reserve(1)?;
        self.entries.push(Entry { key, value });
        Ok(Outcome::Added)
    }

    /// Unlink and return the entry stored under `key`
    pub fn remove(&mut self, key: &K::Borrowed) -> Option<Entry<K>> {
        let pos = self.position(key)?;
        Some(self.entries.remove(pos))
    }

    /// Drop every entry, returning how many there were
    pub fn clear(&mut self) -> usize {
        let released = self.entries.len();
        self.entries.clear();
        released
    }
}

/// Allocate `count` empty chains
pub fn allocate_buckets<K: ChainKey>(count: usize) -> TableResult<Vec<Chain<K>>> {
    let mut buckets = Vec::new();
    buckets.try_reserve_exact(count)?;
    buckets.resize_with(count, Chain::new);
    Ok(buckets)
}

/// Allocate the chains for a redistribution into `new_count` buckets, with
/// every chain already holding the capacity it will need.
pub fn prepare_redistribution<K: ChainKey>(
    buckets: &[Chain<K>],
    new_count: usize,
) -> TableResult<Vec<Chain<K>>> {
    let mut sizes: Vec<usize> = Vec::new();
    sizes.try_reserve_exact(new_count)?;
    sizes.resize(new_count, 0);
    for chain in buckets {
        for entry in &chain.entries {
            sizes[K::bucket(entry.key.borrowed(), new_count)] += 1;
        }
    }

    let mut fresh = allocate_buckets(new_count)?;
    for (chain, size) in fresh.iter_mut().zip(sizes) {
        chain.entries.try_reserve_exact(size)?;
    }
    Ok(fresh)
}

/// Move every entry into chains from [`prepare_redistribution`]. Cannot fail.
///
/// Entries from one old chain keep their relative order.
pub fn redistribute<K: ChainKey>(old: Vec<Chain<K>>, fresh: &mut [Chain<K>]) {
    let new_count = fresh.len();
    for chain in old {
        for entry in chain.entries {
            let index = K::bucket(entry.key.borrowed(), new_count);
            fresh[index].entries.push(entry);
        }
    }
}

/// Chain occupancy summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainStats {
    /// Number of stored entries
    pub entries: usize,
    /// Buckets holding at least one entry
    pub used_buckets: usize,
    /// Length of the longest chain
    pub longest_chain: usize,
}

impl ChainStats {
    /// Fold the chains of one bucket array into the summary
    pub fn accumulate<K: ChainKey>(&mut self, buckets: &[Chain<K>]) {
        for chain in buckets {
            let len = chain.len();
            self.entries += len;
            if len > 0 {
                self.used_buckets += 1;
            }
            self.longest_chain = self.longest_chain.max(len);
        }
    }
}
