// ChainMap facade tests.
//
// The facade forwards to ChainedTable with a BuildHasher strategy; these
// tests cover what it adds on top: borrowed-form lookups, std trait impls,
// and cursor-driven removal through handles.
use chained_hashmap::{ChainMap, OneAtATimeBuildHasher, TableConfig, TableError};
use std::collections::BTreeMap;

// Test: borrowed lookups.
// Verifies: String keys are reachable through &str for every accessor.
#[test]
fn string_keys_queried_by_str() {
    let mut m: ChainMap<String, usize> = ChainMap::new();
    for w in ["alpha", "beta", "gamma"] {
        m.insert(w.to_string(), w.len()).unwrap();
    }
    assert_eq!(m.get("beta"), Some(&4));
    assert!(m.contains_key("gamma"));
    assert!(m.find("delta").is_none());
    assert_eq!(m.remove("alpha"), Some(5));
    assert_eq!(m.len(), 2);
}

// Test: duplicate insert through the facade.
// Verifies: DuplicateKey and the stored value is unchanged.
#[test]
fn duplicate_insert_rejected() {
    let mut m = ChainMap::new();
    m.insert("abc".to_string(), 1).unwrap();
    match m.insert("abc".to_string(), 2) {
        Err(TableError::DuplicateKey) => {}
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(m.get("abc"), Some(&1));
}

// Test: custom configuration and deterministic hashing.
// Verifies: config is honored and growth preserves all pairs.
#[test]
fn custom_config_grows_and_keeps_pairs() {
    let cfg = TableConfig::new()
        .with_starting_size(8)
        .with_max_load_factor(0.75);
    let mut m: ChainMap<u64, u64, OneAtATimeBuildHasher> =
        ChainMap::with_config_and_hasher(cfg, OneAtATimeBuildHasher::default()).unwrap();
    assert_eq!(m.bucket_count(), 8);
    for i in 0..100u64 {
        m.insert(i, i * i).unwrap();
    }
    assert_eq!(m.bucket_count(), 256);
    assert_eq!(m.resize_count(), 5);
    for i in 0..100u64 {
        assert_eq!(m.get(&i), Some(&(i * i)));
    }
    assert!(m.as_table().load_factor() <= 0.75);
}

// Test: std trait integration.
// Verifies: FromIterator, Extend, IntoIterator for &ChainMap and Debug.
#[test]
fn std_traits() {
    let mut m: ChainMap<&str, i32> = [("a", 1), ("b", 2)].into_iter().collect();
    m.extend([("c", 3), ("a", 9)]);
    let as_btree: BTreeMap<&str, i32> = (&m).into_iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(as_btree, BTreeMap::from([("a", 1), ("b", 2), ("c", 3)]));

    let mut single: ChainMap<&str, i32> = ChainMap::new();
    single.insert("x", 7).unwrap();
    assert_eq!(format!("{:?}", single), "{\"x\": 7}");
}

// Test: iter_mut and values.
// Verifies: in-place updates are visible to later lookups.
#[test]
fn iter_mut_updates_values() {
    let mut m: ChainMap<u32, u32> = (0..50).map(|i| (i, i)).collect();
    for (_, v) in m.iter_mut() {
        *v += 1;
    }
    assert_eq!(m.values().sum::<u32>(), (1..=50).sum::<u32>());
    assert_eq!(m.get(&10), Some(&11));
}

// Test: cursor-driven deletion through the facade.
// Assumes: only the handle just yielded is removed.
// Verifies: exactly the selected entries go; the rest remain.
#[test]
fn cursor_removes_selected_entries() {
    let mut m: ChainMap<u32, u32> = (0..500).map(|i| (i, i)).collect();
    let mut cursor = m.cursor();
    let mut visited = 0;
    while let Some(h) = m.advance(&mut cursor) {
        visited += 1;
        if m.value(h).copied().unwrap() % 2 == 1 {
            m.remove_handle(h).unwrap();
        }
    }
    assert_eq!(visited, 500);
    assert_eq!(m.len(), 250);
    assert!(m.keys().all(|k| k % 2 == 0));
}

// Test: drain and clear keep the bucket array.
#[test]
fn drain_and_clear() {
    let mut m: ChainMap<u32, String> = (0..900).map(|i| (i, i.to_string())).collect();
    let buckets = m.bucket_count();
    let drained: Vec<(u32, String)> = m.drain().collect();
    assert_eq!(drained.len(), 900);
    assert!(m.is_empty());
    assert_eq!(m.bucket_count(), buckets);

    m.insert(1, "one".into()).unwrap();
    m.clear();
    assert!(m.is_empty());
    assert_eq!(m.get(&1), None);
}

// Test: retain.
#[test]
fn retain_filters_in_place() {
    let mut m: ChainMap<String, usize> = ["a", "bb", "ccc", "dddd"]
        .iter()
        .map(|s| (s.to_string(), s.len()))
        .collect();
    m.retain(|_, len| *len >= 3);
    let mut left: Vec<&String> = m.keys().collect();
    left.sort();
    assert_eq!(left, vec!["ccc", "dddd"]);
}
