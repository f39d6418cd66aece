// Hash functions for table keys

/// djb2 seed
const DJB2_MAGIC_NUMBER: u64 = 5381;

/// Multiplier used by both avalanche rounds of the integer hash
const AVALANCHE_MULTIPLIER: i64 = 0x45d9f3b;

/// djb2 hash implementation for text keys
/// Returns a 64-bit integer hash value
pub fn hash_text(s: &str) -> u64 {
    let mut hash = DJB2_MAGIC_NUMBER;

    // Process each byte in the string
    for byte in s.as_bytes() {
        hash = hash.wrapping_shl(5).wrapping_add(hash).wrapping_add(*byte as u64); // hash * 33 + c
    }

    hash
}

/// Xor-shift/multiply avalanche hash for integer keys
///
/// Shifts are arithmetic on the signed key; the final value is reinterpreted
/// as unsigned before any bucket reduction.
pub fn hash_integer(key: i64) -> u64 {
    let mut x = key;
    x = ((x >> 16) ^ x).wrapping_mul(AVALANCHE_MULTIPLIER);
    x = ((x >> 16) ^ x).wrapping_mul(AVALANCHE_MULTIPLIER);
    x = (x >> 16) ^ x;
    x as u64
}

/// Reduce a hash to a bucket index
///
/// `bucket_count` must be non-zero; tables reject a zero count at creation.
#[inline]
pub fn bucket_index(hash: u64, bucket_count: usize) -> usize {
    (hash % bucket_count as u64) as usize
}

/// Bucket index of a text key
#[inline]
pub fn text_bucket(key: &str, bucket_count: usize) -> usize {
    bucket_index(hash_text(key), bucket_count)
}

/// Bucket index of an integer key
#[inline]
pub fn integer_bucket(key: i64, bucket_count: usize) -> usize {
    bucket_index(hash_integer(key), bucket_count)
}
