#![cfg(test)]

// Property tests for ChainedTable kept inside the crate so they can reach
// chain-level internals without feature gates.

use crate::chained_table::{ChainedTable, Handle};
use crate::config::TableConfig;
use crate::dispose::FnDisposer;
use crate::error::TableError;
use crate::strategy::{FnStrategy, KeyStrategy};
use proptest::prelude::*;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

// Pool-indexed operations so shrinking moves towards earlier keys and
// shorter op lists.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    Remove(usize),
    RemoveByHandle(usize),
    Get(usize),
    Mutate(usize, i32),
    Iterate,
    CursorRemoveEvery(u8),
    Drain,
}

type Log = Rc<RefCell<Vec<(u16, Option<i32>)>>>;
type Sut = ChainedTable<u16, i32, FnStrategy<u16>, FnDisposer<Box<dyn FnMut(u16, Option<i32>)>>>;

// Deliberately weak hash so chains get long and removal hits heads,
// middles and tails.
fn weak_hash(k: &u16) -> u64 {
    u64::from(*k % 7)
}

fn new_sut(size: usize, log: &Log) -> Sut {
    let sink = log.clone();
    let disposer: Box<dyn FnMut(u16, Option<i32>)> =
        Box::new(move |k, v| sink.borrow_mut().push((k, v)));
    let cfg = TableConfig::new().with_starting_size(size);
    ChainedTable::with_config(cfg, FnStrategy::new(weak_hash, |a, b| a == b), FnDisposer(disposer))
        .unwrap()
}

fn arb_scenario() -> impl Strategy<Value = (usize, Vec<u16>, Vec<Op>)> {
    let sizes = prop_oneof![Just(2usize), Just(4), Just(16)];
    (sizes, proptest::collection::vec(any::<u16>(), 1..=24)).prop_flat_map(|(size, pool)| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            2 => idx.clone().prop_map(Op::Remove),
            1 => idx.clone().prop_map(Op::RemoveByHandle),
            2 => idx.clone().prop_map(Op::Get),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => Just(Op::Iterate),
            1 => (1u8..4).prop_map(Op::CursorRemoveEvery),
            1 => Just(Op::Drain),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (size, pool.clone(), ops))
    })
}

fn assert_structure(sut: &Sut) -> Result<(), TestCaseError> {
    prop_assert!(sut.bucket_count().is_power_of_two());
    let reachable: usize = (0..sut.bucket_count()).map(|i| sut.chain_len(i)).sum();
    prop_assert_eq!(reachable, sut.len());
    prop_assert!(sut.len() <= sut.grow_threshold());
    // No two equal keys anywhere; the bucket a key hashes to is non-empty.
    let mut keys = BTreeSet::new();
    let mut cursor = sut.cursor();
    while let Some(h) = cursor.next(sut) {
        let k = *h.key(sut).unwrap();
        prop_assert!(keys.insert(k));
        let bucket = (sut.strategy().hash(&k) as usize) & (sut.bucket_count() - 1);
        prop_assert!(sut.chain_len(bucket) > 0);
    }
    prop_assert_eq!(keys.len(), sut.len());
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap.
// - Duplicate inserts fail with no change; successful ones append.
// - remove/remove_handle return the model's value and dispose of the key
//   only; removing an absent key leaves len unchanged.
// - Every traversal mode yields each live entry exactly once.
// - Removing each yielded entry through a SafeCursor skips nothing.
// - Chains stay consistent with len across growth.
proptest! {
    #![proptest_config(ProptestConfig { cases: 96, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((size, pool, ops) in arb_scenario()) {
        let log: Log = Rc::default();
        let mut sut = new_sut(size, &log);
        let mut model: HashMap<u16, i32> = HashMap::new();
        let mut handles: HashMap<u16, Handle> = HashMap::new();

        for op in ops {
            log.borrow_mut().clear();
            match op {
                Op::Insert(i, v) => {
                    let k = pool[i];
                    let before = sut.len();
                    match sut.insert(k, v) {
                        Ok(h) => {
                            prop_assert!(!model.contains_key(&k));
                            model.insert(k, v);
                            handles.insert(k, h);
                            prop_assert_eq!(sut.len(), before + 1);
                        }
                        Err(TableError::DuplicateKey) => {
                            prop_assert!(model.contains_key(&k));
                            prop_assert_eq!(sut.len(), before);
                            prop_assert_eq!(sut.get(&k), model.get(&k));
                        }
                        Err(e) => prop_assert!(false, "unexpected error {:?}", e),
                    }
                    prop_assert!(log.borrow().is_empty());
                }
                Op::Remove(i) => {
                    let k = pool[i];
                    let before = sut.len();
                    match (sut.remove(&k), model.remove(&k)) {
                        (Ok(v), Some(mv)) => {
                            prop_assert_eq!(v, mv);
                            prop_assert_eq!(&*log.borrow(), &[(k, None)]);
                            handles.remove(&k);
                        }
                        (Err(TableError::NotFound), None) => {
                            prop_assert_eq!(sut.len(), before);
                            prop_assert!(log.borrow().is_empty());
                        }
                        (got, want) => prop_assert!(false, "remove mismatch {:?} vs {:?}", got, want),
                    }
                    prop_assert!(!sut.contains(&k));
                }
                Op::RemoveByHandle(i) => {
                    let k = pool[i];
                    if let Some(h) = handles.remove(&k) {
                        let want = model.remove(&k);
                        prop_assert_eq!(sut.remove_handle(h), want);
                        prop_assert_eq!(sut.remove_handle(h), None);
                    }
                }
                Op::Get(i) => {
                    let k = pool[i];
                    prop_assert_eq!(sut.get(&k), model.get(&k));
                    prop_assert_eq!(sut.contains(&k), model.contains_key(&k));
                    prop_assert_eq!(sut.find(&k), handles.get(&k).copied());
                }
                Op::Mutate(i, d) => {
                    let k = pool[i];
                    if let Some(v) = sut.get_mut(&k) {
                        *v = v.wrapping_add(d);
                        let mv = model.get_mut(&k).unwrap();
                        *mv = mv.wrapping_add(d);
                    } else {
                        prop_assert!(!model.contains_key(&k));
                    }
                }
                Op::Iterate => {
                    let seen: HashMap<u16, i32> = sut.iter().map(|(k, v)| (*k, *v)).collect();
                    prop_assert_eq!(sut.iter().count(), sut.len());
                    prop_assert_eq!(&seen, &model);
                }
                Op::CursorRemoveEvery(n) => {
                    // Remove every n-th yielded entry; n == 1 empties the table.
                    let before = sut.len();
                    let mut cursor = sut.cursor();
                    let mut seen = BTreeSet::new();
                    let mut step = 0u32;
                    while let Some(h) = cursor.next(&sut) {
                        let k = *h.key(&sut).unwrap();
                        prop_assert!(seen.insert(k), "key {} yielded twice", k);
                        step += 1;
                        if step % u32::from(n) == 0 {
                            prop_assert_eq!(sut.remove(&k).ok(), model.remove(&k));
                            handles.remove(&k);
                        }
                    }
                    prop_assert_eq!(seen.len(), before);
                    let expected_left = before - before / n as usize;
                    prop_assert_eq!(sut.len(), expected_left);
                    if n == 1 {
                        prop_assert_eq!(sut.len(), 0);
                    }
                }
                Op::Drain => {
                    let bucket_count = sut.bucket_count();
                    let drained: HashMap<u16, i32> = sut.drain().collect();
                    prop_assert_eq!(&drained, &model);
                    prop_assert!(log.borrow().is_empty());
                    prop_assert_eq!(sut.len(), 0);
                    prop_assert_eq!(sut.bucket_count(), bucket_count);
                    model.clear();
                    handles.clear();
                }
            }
            prop_assert_eq!(sut.len(), model.len());
            assert_structure(&sut)?;
        }

        log.borrow_mut().clear();
        let remaining = model.len();
        drop(sut);
        prop_assert_eq!(log.borrow().len(), remaining);
        prop_assert!(log.borrow().iter().all(|(k, v)| model.get(k) == v.as_ref()));
    }
}

// Property: growth is purely a relink. Every handle minted before any
// number of resizes still resolves to its original pair.
proptest! {
    #[test]
    fn prop_handles_stable_across_growth(keys in proptest::collection::btree_set(any::<u16>(), 1..400)) {
        let log: Log = Rc::default();
        let mut sut = new_sut(2, &log);
        let mut minted = Vec::new();
        for (i, k) in keys.iter().enumerate() {
            minted.push((*k, i as i32, sut.insert(*k, i as i32).unwrap()));
        }
        prop_assert!(sut.resize_count() > 0 || keys.len() == 1);
        for (k, v, h) in minted {
            prop_assert_eq!(h.key(&sut), Some(&k));
            prop_assert_eq!(h.value(&sut), Some(&v));
        }
    }
}
