use super::*;

#[test]
fn test_hash_text_golden_values() {
    assert_eq!(hash_text(""), 5381);
    assert_eq!(hash_text("a"), 177670);
    assert_eq!(hash_text("halp"), 6385287658);
    assert_eq!(hash_text("oldest"), 6953864956880);
}

#[test]
fn test_hash_text_non_ascii_bytes_are_unsigned() {
    // "é" is 0xC3 0xA9; both bytes are added as values above 127
    assert_eq!("é".as_bytes(), &[0xC3, 0xA9]);
    assert_eq!(hash_text("é"), (5381 * 33 + 0xC3) * 33 + 0xA9);
    assert_eq!(hash_text("é"), 5866513);
    // Sign-extended bytes would give 5857809
    assert_ne!(hash_text("é"), 5857809);
    assert_eq!(text_bucket("é", 10), 3);
}

#[test]
fn test_hash_integer_golden_values() {
    assert_eq!(hash_integer(42), 225323439557888757);
    assert_eq!(hash_integer(1), 5364745905576871);
    assert_eq!(hash_integer(0), 0);
    // (-1 >> 16) ^ -1 collapses to zero
    assert_eq!(hash_integer(-1), 0);
    assert_eq!(hash_integer(-42), 219952331276651083);
}

#[test]
fn test_hash_text_consistency() {
    // Test that the same string always produces the same hash
    let s = "hello world";
    let hash1 = hash_text(s);
    let hash2 = hash_text(s);
    let hash3 = hash_text(s);

    assert_eq!(hash1, hash2);
    assert_eq!(hash2, hash3);
}

#[test]
fn test_hash_integer_consistency() {
    for key in [i64::MIN, -1_000_000, -7, 0, 7, 1_000_000, i64::MAX] {
        assert_eq!(hash_integer(key), hash_integer(key));
    }
}

#[test]
fn test_hash_different_strings() {
    let s1 = "hello";
    let s2 = "world";
    let s3 = "hello world";

    assert_ne!(hash_text(s1), hash_text(s2));
    assert_ne!(hash_text(s2), hash_text(s3));
    assert_ne!(hash_text(s1), hash_text(s3));
}

#[test]
fn test_hash_long_string_wraps() {
    // Long enough to overflow 64 bits many times over
    let s = "This is a very long string that should test the hash function's ability to handle longer inputs efficiently.";
    assert_eq!(hash_text(s), hash_text(s));
    assert_ne!(hash_text(s), hash_text(&s[1..]));
}

#[test]
fn test_bucket_reduction() {
    assert_eq!(text_bucket("halp", 10), 8);
    assert_eq!(text_bucket("", 10), 1);
    assert_eq!(integer_bucket(42, 10), 7);
    assert_eq!(integer_bucket(42, 1000), 757);
    assert_eq!(integer_bucket(-42, 10), 3);

    // Single bucket: every key collides
    assert_eq!(text_bucket("anything", 1), 0);
    assert_eq!(integer_bucket(i64::MIN, 1), 0);
}

#[test]
fn test_bucket_index_in_range() {
    for key in -500..500i64 {
        assert!(integer_bucket(key, 13) < 13);
        assert!(text_bucket(&key.to_string(), 13) < 13);
    }
}
