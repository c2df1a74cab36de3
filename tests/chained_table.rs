// ChainedTable integration suite.
//
// Each test documents what behavior is being verified and which
// invariants are assumed or asserted. The core invariants exercised:
// - Round-trip: get(k) == v and contains(k) until k is removed.
// - Uniqueness: a duplicate insert fails and changes nothing.
// - Removal: absent keys leave len unchanged; present keys dispose of the
//   key only and hand the value back.
// - Growth: the threshold is floor(buckets * max_load_factor) and growth
//   preserves every pair.
// - Traversal: every mode visits each live entry exactly once.
use chained_hashmap::{
    data_hash64, BytesStrategy, ChainedTable, CursorState, DropDisposer, FnDisposer, FnStrategy,
    Int32Strategy, Int64Strategy, TableConfig, TableError,
};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

// Test: default sizing scenario.
// Assumes: starting size 1024, load factor 0.7, growth factor 2.
// Verifies: exactly one resize, at the 717th insert; all 1024 keys readable.
#[test]
fn default_table_grows_once_for_1024_sequential_keys() {
    let mut t = ChainedTable::new(Int64Strategy);
    let mut resized_at = None;
    for i in 0..1024u64 {
        let before = t.resize_count();
        t.insert(i, i).expect("insert ok");
        if t.resize_count() != before {
            assert!(resized_at.is_none(), "more than one resize");
            resized_at = Some(i + 1);
        }
    }
    assert_eq!(resized_at, Some(717));
    assert_eq!(t.bucket_count(), 2048);
    assert_eq!(t.len(), 1024);
    for i in 0..1024u64 {
        assert_eq!(t.get(&i), Some(&i));
        assert!(t.contains(&i));
    }
}

// Test: duplicate string key scenario.
// Assumes: byte keys hashed with one-at-a-time.
// Verifies: second insert of "abc" fails and the first value stays.
#[test]
fn duplicate_abc_keeps_original_value() {
    let mut t: ChainedTable<String, i32, _> = ChainedTable::new(BytesStrategy);
    t.insert("abc".to_string(), 1).unwrap();
    assert_eq!(t.insert("abc".to_string(), 2), Err(TableError::DuplicateKey));
    assert_eq!(t.get(&"abc".to_string()), Some(&1));
    assert_eq!(t.len(), 1);
}

// Test: resize count for larger inputs.
// Assumes: max_load_factor 1.0 so capacity equals bucket count.
// Verifies: ceil(log2(N / starting_size)) resizes when N exceeds capacity.
#[test]
fn resize_count_follows_growth_factor() {
    for (n, expected) in [(64u64, 0usize), (65, 1), (128, 1), (129, 2), (1000, 4)] {
        let cfg = TableConfig::new()
            .with_starting_size(64)
            .with_max_load_factor(1.0);
        let mut t = ChainedTable::with_config(cfg, Int64Strategy, DropDisposer).unwrap();
        for i in 0..n {
            t.insert(i, ()).unwrap();
        }
        assert_eq!(t.resize_count(), expected, "n = {n}");
        assert_eq!(t.len(), n as usize);
    }
}

// Test: removal bookkeeping.
// Assumes: disposer receives (key, None) on remove.
// Verifies: absent removal is NotFound with no len change and no disposal.
#[test]
fn removal_disposes_key_and_returns_value() {
    let disposed = Rc::new(RefCell::new(Vec::new()));
    let sink = disposed.clone();
    let mut t = ChainedTable::with_disposer(
        BytesStrategy,
        FnDisposer(move |k: String, v: Option<Vec<u8>>| sink.borrow_mut().push((k, v))),
    );
    t.insert("a".to_string(), vec![1]).unwrap();
    t.insert("b".to_string(), vec![2]).unwrap();

    assert_eq!(t.remove(&"zz".to_string()), Err(TableError::NotFound));
    assert_eq!(t.len(), 2);
    assert!(disposed.borrow().is_empty());

    assert_eq!(t.remove(&"a".to_string()), Ok(vec![1]));
    assert_eq!(t.len(), 1);
    assert!(!t.contains(&"a".to_string()));
    assert_eq!(&*disposed.borrow(), &[("a".to_string(), None)]);

    drop(t);
    assert_eq!(disposed.borrow().len(), 2);
    assert_eq!(disposed.borrow()[1], ("b".to_string(), Some(vec![2])));
}

// Test: compound struct keys hashed as bytes.
// Assumes: FnStrategy with data_hash64 over the packed fields.
// Verifies: distinct points coexist; equal points collide as duplicates.
#[test]
fn struct_keys_through_function_pointers() {
    #[derive(Clone, Copy, Debug, PartialEq)]
    struct MapPoint {
        x: u64,
        y: u64,
    }
    fn hash(p: &MapPoint) -> u64 {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&p.x.to_le_bytes());
        bytes[8..].copy_from_slice(&p.y.to_le_bytes());
        data_hash64(&bytes)
    }
    fn eq(a: &MapPoint, b: &MapPoint) -> bool {
        a == b
    }

    let mut t = ChainedTable::new(FnStrategy::new(hash, eq));
    for x in 0..20 {
        for y in 0..20 {
            t.insert(MapPoint { x, y }, x * 100 + y).unwrap();
        }
    }
    assert_eq!(t.len(), 400);
    assert_eq!(
        t.insert(MapPoint { x: 3, y: 4 }, 0),
        Err(TableError::DuplicateKey)
    );
    assert_eq!(t.get(&MapPoint { x: 3, y: 4 }), Some(&304));
}

// Test: 32-bit integer keys.
// Verifies: round-trip through the cheaper 32-bit finalizer.
#[test]
fn int32_keys_round_trip() {
    let mut t = ChainedTable::new(Int32Strategy);
    for i in -500i32..500 {
        t.insert(i, i * 2).unwrap();
    }
    for i in -500i32..500 {
        assert_eq!(t.get(&i), Some(&(i * 2)));
    }
}

// Test: read-only traversal.
// Verifies: visits == len and every key appears once.
#[test]
fn iter_is_exhaustive() {
    let mut t = ChainedTable::new(Int64Strategy);
    for i in 0..2000u64 {
        t.insert(i * 7, i).unwrap();
    }
    let keys: Vec<u64> = t.keys().copied().collect();
    assert_eq!(keys.len(), t.len());
    let uniq: BTreeSet<u64> = keys.into_iter().collect();
    assert_eq!(uniq.len(), 2000);
}

// Test: removal-safe traversal removing every visited entry.
// Assumes: only the entry last yielded is removed per step.
// Verifies: nothing skipped or repeated; the table ends empty.
#[test]
fn cursor_removing_everything_empties_table() {
    let mut t = ChainedTable::new(Int64Strategy);
    for i in 0..3000u64 {
        t.insert(i, i).unwrap();
    }
    let mut cursor = t.cursor();
    let mut seen = BTreeSet::new();
    while let Some(h) = cursor.next(&t) {
        let k = *h.key(&t).unwrap();
        assert!(seen.insert(k));
        assert_eq!(t.remove(&k), Ok(k));
    }
    assert_eq!(cursor.state(), CursorState::Exhausted);
    assert_eq!(seen.len(), 3000);
    assert_eq!(t.len(), 0);
}

// Test: draining traversal.
// Verifies: drain yields every pair, len resets, bucket array kept.
#[test]
fn drain_empties_but_keeps_buckets() {
    let mut t = ChainedTable::new(Int64Strategy);
    for i in 0..800u64 {
        t.insert(i, i + 1).unwrap();
    }
    let buckets = t.bucket_count();
    let drained: BTreeSet<(u64, u64)> = t.drain().collect();
    assert_eq!(drained.len(), 800);
    assert!(drained.iter().all(|(k, v)| *v == k + 1));
    assert!(t.is_empty());
    assert_eq!(t.bucket_count(), buckets);

    // Reusable afterwards.
    t.insert(1, 1).unwrap();
    assert_eq!(t.get(&1), Some(&1));
}

// Test: drain_with hands each pair to the disposer after the visit.
// Verifies: visits and disposals match one-to-one.
#[test]
fn drain_with_disposes_every_pair() {
    let disposed = Rc::new(RefCell::new(0usize));
    let sink = disposed.clone();
    let mut t = ChainedTable::with_disposer(
        Int64Strategy,
        FnDisposer(move |_k: u64, v: Option<u64>| {
            assert!(v.is_some());
            *sink.borrow_mut() += 1;
        }),
    );
    for i in 0..100u64 {
        t.insert(i, i).unwrap();
    }
    let mut visited = 0;
    t.drain_with(|_, _| visited += 1);
    assert_eq!(visited, 100);
    assert_eq!(*disposed.borrow(), 100);
    assert!(t.is_empty());
}

// Test: invalid configuration is rejected at construction time.
#[test]
fn invalid_config_rejected() {
    let cfg = TableConfig::new().with_starting_size(100);
    let res = ChainedTable::<u64, u64, _>::with_config(cfg, Int64Strategy, DropDisposer);
    assert!(matches!(res, Err(TableError::InvalidConfig(_))));
}
