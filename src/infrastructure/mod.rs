//! Table engine internals: key hashing and the chained hash tables

/// Hash functions for text and integer keys
pub mod hash;

/// Chained hash tables
pub mod hash_table;
