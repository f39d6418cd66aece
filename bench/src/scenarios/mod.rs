//! Benchmark scenarios module

use parking_lot::Mutex;
use tagtable::{ConcurrentTable, Outcome, Table, TableResult};

/// Scenario trait - one storage workload driven by sequence numbers
pub trait Scenario: Send + Sync {
    /// Scenario name
    fn name(&self) -> &str;

    /// Store the entry for sequence number `i`
    fn store(&self, i: i64) -> TableResult<Outcome>;

    /// Read the entry for sequence number `i` back: `None` if it is
    /// missing, otherwise whether it holds the stored value
    fn verify(&self, i: i64) -> TableResult<Option<bool>>;

    /// Number of stored entries
    fn len(&self) -> usize;
}

/// Integers keyed by their decimal string, per-bucket locking
pub struct StringKeyedInts {
    table: ConcurrentTable,
}

impl StringKeyedInts {
    pub fn new(buckets: usize) -> TableResult<Self> {
        Ok(Self {
            table: ConcurrentTable::new(buckets)?,
        })
    }
}

impl Scenario for StringKeyedInts {
    fn name(&self) -> &str {
        "string_keyed_ints"
    }

    fn store(&self, i: i64) -> TableResult<Outcome> {
        self.table.insert_int_by_text(&i.to_string(), i)
    }

    fn verify(&self, i: i64) -> TableResult<Option<bool>> {
        let stored = self.table.get_int_by_text(&i.to_string())?;
        Ok(stored.map(|value| value == i))
    }

    fn len(&self) -> usize {
        self.table.len()
    }
}

/// Text values keyed by integer, per-bucket locking
pub struct IntKeyedTexts {
    table: ConcurrentTable,
}

impl IntKeyedTexts {
    pub fn new(buckets: usize) -> TableResult<Self> {
        Ok(Self {
            table: ConcurrentTable::new(buckets)?,
        })
    }
}

impl Scenario for IntKeyedTexts {
    fn name(&self) -> &str {
        "int_keyed_texts"
    }

    fn store(&self, i: i64) -> TableResult<Outcome> {
        self.table.insert_text_by_int(i, &format!("string {}", i))
    }

    fn verify(&self, i: i64) -> TableResult<Option<bool>> {
        let stored = self.table.get_text_by_int(i)?;
        Ok(stored.map(|value| value == format!("string {}", i)))
    }

    fn len(&self) -> usize {
        self.table.len()
    }
}

/// Integers keyed by their decimal string behind one whole-table lock
pub struct TableLocked {
    table: Mutex<Table>,
}

impl TableLocked {
    pub fn new(buckets: usize) -> TableResult<Self> {
        Ok(Self {
            table: Mutex::new(Table::new(buckets)?),
        })
    }
}

impl Scenario for TableLocked {
    fn name(&self) -> &str {
        "table_locked"
    }

    fn store(&self, i: i64) -> TableResult<Outcome> {
        let key = i.to_string();
        self.table.lock().insert_int_by_text(&key, i)
    }

    fn verify(&self, i: i64) -> TableResult<Option<bool>> {
        let key = i.to_string();
        let stored = self.table.lock().get_int_by_text(&key)?;
        Ok(stored.map(|value| value == i))
    }

    fn len(&self) -> usize {
        self.table.lock().len()
    }
}
