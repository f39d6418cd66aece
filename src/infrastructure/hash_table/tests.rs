use super::*;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

#[test]
fn test_hash_table_basic() {
    // Create a new hash table with 10 buckets
    let mut table = Table::new(10).unwrap();

    // Integer keys 0..4 -> "string 1".."string 5"
    for key in 0..5i64 {
        let value = format!("string {}", key + 1);
        assert_eq!(table.insert_text_by_int(key, &value).unwrap(), Outcome::Added);
    }
    assert_eq!(table.len(), 5);
    assert_eq!(table.len_int(), 5);
    assert_eq!(table.len_text(), 0);

    for key in 0..5i64 {
        let expected = format!("string {}", key + 1);
        assert_eq!(table.get_text_by_int(key).unwrap(), Some(expected.as_str()));
    }
    assert_eq!(table.get_text_by_int(5).unwrap(), None);

    for key in 0..5i64 {
        assert_eq!(table.delete_by_int(key), Outcome::Deleted);
    }
    assert!(table.is_empty());
}

#[test]
fn test_hash_table_text_keys() {
    let mut table = Table::new(10).unwrap();

    table.insert_text_by_text("oldest", "Jonathan").unwrap();
    table.insert_text_by_text("2ndoldest", "Zevi").unwrap();
    table.insert_text_by_text("3rdoldest", "Jude").unwrap();
    table.insert_text_by_text("4tholdest", "Voldemort").unwrap();

    assert_eq!(table.get_text_by_text("oldest").unwrap(), Some("Jonathan"));
    assert_eq!(table.get_text_by_text("2ndoldest").unwrap(), Some("Zevi"));
    assert_eq!(table.get_text_by_text("3rdoldest").unwrap(), Some("Jude"));
    assert_eq!(table.get_text_by_text("4tholdest").unwrap(), Some("Voldemort"));
    assert_eq!(table.get_text_by_text("youngest").unwrap(), None);
}

#[test]
fn test_hash_table_empty() {
    let mut table = Table::new(5).unwrap();

    assert!(table.is_empty());
    assert_eq!(table.len(), 0);
    assert_eq!(table.last_outcome(), None);

    // Delete from empty table
    assert_eq!(table.delete_by_int(999), Outcome::NotFound);
    assert_eq!(table.delete_by_text("missing"), Outcome::NotFound);
    assert_eq!(table.last_outcome(), Some(Outcome::NotFound));

    // Get from empty table
    assert_eq!(table.get_by_int(1), None);
    assert_eq!(table.get_by_text("1"), None);
    assert!(table.is_empty());
}

#[test]
fn test_zero_buckets_rejected() {
    assert!(matches!(Table::new(0), Err(TableError::InvalidCapacity(0))));

    let config = TableConfig {
        bucket_count: 0,
        ..TableConfig::default()
    };
    assert!(matches!(
        Table::with_config(&config),
        Err(TableError::InvalidCapacity(0))
    ));
}

#[test]
fn test_unallocatable_bucket_array() {
    assert!(matches!(
        Table::new(usize::MAX),
        Err(TableError::AllocationFailure)
    ));
}

#[test]
fn test_with_config() {
    let config = TableConfig {
        bucket_count: 64,
        ..TableConfig::default()
    };
    let table = Table::with_config(&config).unwrap();
    assert_eq!(table.bucket_count(), 64);
    assert_eq!(table.bucket_count_initial(), 64);
}

#[test]
fn test_insert_same_pair_twice() {
    let mut table = Table::new(10).unwrap();
    assert_eq!(
        table.insert_text_by_text("oldest", "Jonathan").unwrap(),
        Outcome::Added
    );
    assert_eq!(
        table.insert_text_by_text("oldest", "Jonathan").unwrap(),
        Outcome::AlreadyPresent
    );
    assert_eq!(table.last_outcome(), Some(Outcome::AlreadyPresent));
    assert_eq!(table.get_text_by_text("oldest").unwrap(), Some("Jonathan"));
    assert_eq!(table.len(), 1);
}

#[test]
fn test_text_insert_compares_against_stored_value() {
    let mut table = Table::new(10).unwrap();
    assert_eq!(table.insert_text_by_int(5, "five").unwrap(), Outcome::Added);
    assert_eq!(
        table.insert_by_int(5, Value::Text("five".to_string())).unwrap(),
        Outcome::AlreadyPresent
    );
    assert_eq!(table.insert_text_by_int(5, "five").unwrap(), Outcome::AlreadyPresent);

    // Same digits under a different tag are a different value
    table.insert_int_by_text("n", 5).unwrap();
    assert_eq!(table.insert_text_by_text("n", "5").unwrap(), Outcome::Replaced);
    assert_eq!(table.get_text_by_text("n").unwrap(), Some("5"));
    assert_eq!(table.len(), 2);
}

#[test]
fn test_replace_value() {
    let mut table = Table::new(10).unwrap();
    assert_eq!(
        table.insert_text_by_text("oldest", "Jonathan").unwrap(),
        Outcome::Added
    );
    assert_eq!(
        table.insert_text_by_text("oldest", "Zevi").unwrap(),
        Outcome::Replaced
    );
    assert_eq!(table.get_text_by_text("oldest").unwrap(), Some("Zevi"));
    assert_eq!(table.len(), 1);
}

#[test]
fn test_round_trip_every_tag_by_text() {
    let mut table = Table::new(7).unwrap();
    let handle = Reference::new(vec![1u8, 2, 3]);

    assert_eq!(table.insert_text_by_text("text", "value").unwrap(), Outcome::Added);
    assert_eq!(table.insert_int_by_text("int", -12).unwrap(), Outcome::Added);
    assert_eq!(table.insert_float_by_text("float", 2.5).unwrap(), Outcome::Added);
    assert_eq!(
        table.insert_ref_by_text("ref", handle.clone()).unwrap(),
        Outcome::Added
    );

    assert_eq!(table.get_text_by_text("text").unwrap(), Some("value"));
    assert_eq!(table.get_int_by_text("int").unwrap(), Some(-12));
    assert_eq!(table.get_float_by_text("float").unwrap(), Some(2.5));

    let fetched = table.get_ref_by_text("ref").unwrap().unwrap();
    assert!(fetched.ptr_eq(&handle));
    assert_eq!(fetched.downcast_ref::<Vec<u8>>(), Some(&vec![1u8, 2, 3]));
    assert_eq!(table.last_outcome(), Some(Outcome::Found));
}

#[test]
fn test_round_trip_every_tag_by_int() {
    let mut table = Table::new(7).unwrap();
    let handle = Reference::new("payload");

    assert_eq!(table.insert_text_by_int(1, "value").unwrap(), Outcome::Added);
    assert_eq!(table.insert_int_by_int(2, i64::MIN).unwrap(), Outcome::Added);
    assert_eq!(table.insert_float_by_int(3, -0.125).unwrap(), Outcome::Added);
    assert_eq!(table.insert_ref_by_int(-4, handle.clone()).unwrap(), Outcome::Added);

    assert_eq!(table.get_text_by_int(1).unwrap(), Some("value"));
    assert_eq!(table.get_int_by_int(2).unwrap(), Some(i64::MIN));
    assert_eq!(table.get_float_by_int(3).unwrap(), Some(-0.125));
    assert!(table.get_ref_by_int(-4).unwrap().unwrap().ptr_eq(&handle));
    assert_eq!(table.get_by_int(2), Some(&Value::Integer(i64::MIN)));
}

#[test]
fn test_numeric_and_reference_updates() {
    let mut table = Table::new(3).unwrap();

    assert_eq!(table.insert_int_by_int(5, 1).unwrap(), Outcome::Added);
    assert_eq!(table.insert_int_by_int(5, 1).unwrap(), Outcome::AlreadyPresent);
    assert_eq!(table.insert_int_by_int(5, 2).unwrap(), Outcome::Replaced);

    assert_eq!(table.insert_float_by_text("pi", 1.5).unwrap(), Outcome::Added);
    assert_eq!(table.insert_float_by_text("pi", 1.5).unwrap(), Outcome::AlreadyPresent);
    assert_eq!(
        table.insert_float_by_text("pi", std::f64::consts::PI).unwrap(),
        Outcome::Replaced
    );

    // Same payload behind a different handle is a different reference
    let first = Reference::new(10u32);
    let second = Reference::new(10u32);
    assert_eq!(table.insert_ref_by_int(9, first.clone()).unwrap(), Outcome::Added);
    assert_eq!(table.insert_ref_by_int(9, first.clone()).unwrap(), Outcome::AlreadyPresent);
    assert_eq!(table.insert_ref_by_int(9, second.clone()).unwrap(), Outcome::Replaced);
    assert!(table.get_ref_by_int(9).unwrap().unwrap().ptr_eq(&second));
}

#[test]
fn test_nan_is_never_already_present() {
    let mut table = Table::new(3).unwrap();
    assert_eq!(table.insert_float_by_int(1, f64::NAN).unwrap(), Outcome::Added);
    assert_eq!(table.insert_float_by_int(1, f64::NAN).unwrap(), Outcome::Replaced);
    assert!(table.get_float_by_int(1).unwrap().unwrap().is_nan());
}

#[test]
fn test_replaced_value_is_released() {
    let mut table = Table::new(3).unwrap();
    let old = Reference::new(String::from("old"));
    table.insert_ref_by_text("slot", old.clone()).unwrap();
    assert_eq!(old.handle_count(), 2);

    table.insert_text_by_text("slot", "new").unwrap();
    assert_eq!(old.handle_count(), 1);
    assert_eq!(table.get_text_by_text("slot").unwrap(), Some("new"));

    table.insert_ref_by_text("slot", old.clone()).unwrap();
    assert_eq!(table.delete_by_text("slot"), Outcome::Deleted);
    assert_eq!(old.handle_count(), 1);
}

#[test]
fn test_tag_change_replaces() {
    let mut table = Table::new(3).unwrap();
    table.insert_int_by_text("answer", 42).unwrap();
    assert_eq!(
        table.insert_text_by_text("answer", "forty-two").unwrap(),
        Outcome::Replaced
    );
    assert_eq!(table.get_by_text("answer").unwrap().tag(), ValueTag::Text);
    assert_eq!(table.len(), 1);
}

#[test]
fn test_lookup_under_wrong_tag() {
    let mut table = Table::new(3).unwrap();
    table.insert_float_by_text("ratio", 0.75).unwrap();
    table.insert_text_by_int(1, "one").unwrap();

    match table.get_text_by_text("ratio") {
        Err(TableError::TagMismatch { expected, found }) => {
            assert_eq!(expected, ValueTag::Text);
            assert_eq!(found, ValueTag::Float);
        }
        other => panic!("unexpected lookup result: {:?}", other),
    }
    assert!(matches!(
        table.get_int_by_int(1),
        Err(TableError::TagMismatch {
            expected: ValueTag::Integer,
            found: ValueTag::Text
        })
    ));
    assert!(table.get_ref_by_text("ratio").is_err());

    // Missing keys are not mismatches
    assert_eq!(table.get_text_by_text("missing").unwrap(), None);
}

#[test]
fn test_key_domains_are_separate() {
    let mut table = Table::new(1).unwrap();
    table.insert_text_by_text("42", "text domain").unwrap();
    table.insert_text_by_int(42, "integer domain").unwrap();

    assert_eq!(table.get_text_by_text("42").unwrap(), Some("text domain"));
    assert_eq!(table.get_text_by_int(42).unwrap(), Some("integer domain"));

    assert_eq!(table.delete_by_int(42), Outcome::Deleted);
    assert!(table.contains_text("42"));
    assert!(!table.contains_int(42));
}

#[test]
fn test_delete_absent_key_has_no_side_effects() {
    let mut table = Table::new(1).unwrap();
    for key in 0..10i64 {
        table.insert_int_by_int(key, key * 2).unwrap();
    }
    let before: Vec<(i64, Value)> = table.iter_int().map(|(k, v)| (k, v.clone())).collect();

    assert_eq!(table.delete_by_int(999), Outcome::NotFound);

    let after: Vec<(i64, Value)> = table.iter_int().map(|(k, v)| (k, v.clone())).collect();
    assert_eq!(before, after);
    assert_eq!(table.len(), 10);
}

#[test]
fn test_delete_then_lookup() {
    let mut table = Table::new(4).unwrap();
    table.insert_text_by_text("k", "v").unwrap();
    assert_eq!(table.delete_by_text("k"), Outcome::Deleted);
    assert_eq!(table.get_text_by_text("k").unwrap(), None);
    assert_eq!(table.last_outcome(), Some(Outcome::NotFound));
    assert_eq!(table.delete_by_text("k"), Outcome::NotFound);
}

#[test]
fn test_chain_order_newest_first() {
    let mut table = Table::new(1).unwrap();
    for key in ["first", "second", "third"] {
        table.insert_int_by_text(key, 0).unwrap();
    }
    // Updating does not move an entry
    table.insert_int_by_text("first", 1).unwrap();

    let keys: Vec<&str> = table.iter_text().map(|(key, _)| key).collect();
    assert_eq!(keys, vec!["third", "second", "first"]);

    // Deleting from the middle keeps the rest in order
    table.delete_by_text("second");
    let keys: Vec<&str> = table.iter_text().map(|(key, _)| key).collect();
    assert_eq!(keys, vec!["third", "first"]);
}

#[test]
fn test_single_bucket_collisions() {
    const N: i64 = 2_000;
    let mut table = Table::new(1).unwrap();

    for key in 0..N {
        assert_eq!(table.insert_int_by_int(key, key * 3).unwrap(), Outcome::Added);
        assert_eq!(
            table.insert_text_by_text(&format!("key-{}", key), &key.to_string()).unwrap(),
            Outcome::Added
        );
    }

    let stats = table.stats();
    assert_eq!(stats.entries, 2 * N as usize);
    assert_eq!(stats.used_buckets, 2);
    assert_eq!(stats.longest_chain, N as usize);

    for key in 0..N {
        assert_eq!(table.get_int_by_int(key).unwrap(), Some(key * 3));
        let expected = key.to_string();
        assert_eq!(
            table.get_text_by_text(&format!("key-{}", key)).unwrap(),
            Some(expected.as_str())
        );
    }
}

#[test]
fn test_random_operations_match_model() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed);
    let mut table = Table::new(31).unwrap();
    let mut model = std::collections::HashMap::new();

    for _ in 0..20_000 {
        let key: i64 = rng.gen_range(-200..200);
        if rng.gen_bool(0.3) {
            let expected = if model.remove(&key).is_some() {
                Outcome::Deleted
            } else {
                Outcome::NotFound
            };
            assert_eq!(table.delete_by_int(key), expected);
        } else {
            let value: i64 = rng.gen_range(0..4);
            let expected = match model.insert(key, value) {
                None => Outcome::Added,
                Some(old) if old == value => Outcome::AlreadyPresent,
                Some(_) => Outcome::Replaced,
            };
            assert_eq!(table.insert_int_by_int(key, value).unwrap(), expected);
        }
    }

    assert_eq!(table.len(), model.len());
    for (key, value) in &model {
        assert_eq!(table.get_int_by_int(*key).unwrap(), Some(*value));
    }
}

#[test]
fn test_clear_releases_everything() {
    let mut table = Table::new(8).unwrap();
    let handle = Reference::new(0u64);
    for key in 0..50i64 {
        table.insert_ref_by_int(key, handle.clone()).unwrap();
        table.insert_int_by_text(&key.to_string(), key).unwrap();
    }
    assert_eq!(handle.handle_count(), 51);

    assert_eq!(table.clear(), 100);
    assert!(table.is_empty());
    assert_eq!(handle.handle_count(), 1);
    assert_eq!(table.bucket_count(), 8);

    // Still usable
    assert_eq!(table.insert_int_by_int(1, 1).unwrap(), Outcome::Added);
}

#[test]
fn test_drop_releases_entries() {
    let handle = Reference::new([0u8; 16]);
    {
        let mut table = Table::new(4).unwrap();
        for key in 0..10i64 {
            table.insert_ref_by_int(key, handle.clone()).unwrap();
        }
        assert_eq!(handle.handle_count(), 11);
    }
    assert_eq!(handle.handle_count(), 1);
}

#[test]
fn test_rehash_keeps_entries() {
    let mut table = Table::new(2).unwrap();
    let mut keys: Vec<i64> = (0..500).collect();
    keys.shuffle(&mut rand::rngs::StdRng::seed_from_u64(7));
    for key in &keys {
        table.insert_float_by_int(*key, *key as f64 / 2.0).unwrap();
        table.insert_int_by_text(&format!("t{}", key), *key).unwrap();
    }
    assert_eq!(table.load_factor(), 500.0);

    table.rehash(257).unwrap();
    assert_eq!(table.bucket_count(), 257);
    assert_eq!(table.bucket_count_initial(), 2);
    assert_eq!(table.len(), 1000);
    assert!(table.stats().longest_chain < 500);

    for key in &keys {
        assert_eq!(table.get_float_by_int(*key).unwrap(), Some(*key as f64 / 2.0));
        assert_eq!(table.get_int_by_text(&format!("t{}", key)).unwrap(), Some(*key));
    }
}

#[test]
fn test_rehash_failure_leaves_table_unchanged() {
    let mut table = Table::new(4).unwrap();
    table.insert_text_by_text("a", "1").unwrap();
    table.insert_text_by_int(2, "2").unwrap();

    assert!(matches!(table.rehash(0), Err(TableError::InvalidCapacity(0))));
    assert!(matches!(
        table.rehash(usize::MAX),
        Err(TableError::AllocationFailure)
    ));

    assert_eq!(table.bucket_count(), 4);
    assert_eq!(table.get_text_by_text("a").unwrap(), Some("1"));
    assert_eq!(table.get_text_by_int(2).unwrap(), Some("2"));
}

#[test]
fn test_table_is_send() {
    fn assert_send<T: Send>() {}
    assert_send::<Table>();

    // A table can be handed to another thread wholesale
    let mut table = Table::new(4).unwrap();
    table.insert_ref_by_int(1, Reference::new(Arc::new(5i32))).unwrap();
    let table = std::thread::spawn(move || {
        table.get_ref_by_int(1).unwrap().is_some().then_some(table)
    })
    .join()
    .unwrap();
    assert!(table.is_some());
}

#[test]
fn test_string_keyed_integers_round_trip() {
    // Same collision load as the full-size run: 1,000 entries per bucket
    const COUNT: i64 = 50_000;
    const BUCKETS: usize = 50;
    string_keyed_round_trip(COUNT, BUCKETS);
}

#[test]
#[cfg_attr(debug_assertions, ignore = "full-size run; use a release build")]
fn test_string_keyed_integers_round_trip_million() {
    string_keyed_round_trip(1_000_000, 1_000);
}

fn string_keyed_round_trip(count: i64, buckets: usize) {
    let mut table = Table::new(buckets).unwrap();
    for i in 0..count {
        assert_eq!(
            table.insert_int_by_text(&i.to_string(), i).unwrap(),
            Outcome::Added
        );
    }
    assert_eq!(table.len(), count as usize);
    for i in 0..count {
        assert_eq!(table.get_int_by_text(&i.to_string()).unwrap(), Some(i));
    }
}
