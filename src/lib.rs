//! Tagtable: an in-memory hash table with text and integer key domains
//! holding text, integer, float or reference values.

// Global type definitions
pub mod types;

// Hashing and table engine
pub mod infrastructure;

// Re-export table items for easier access
pub use infrastructure::hash_table::{
    ChainStats, ConcurrentTable, Outcome, Reference, Table, Value, ValueTag,
};

// Re-export error and configuration items
pub use types::{LogLevel, TableConfig, TableError, TableResult};
