//! ChainedTable: bucket array of chain heads over an entry arena.
//!
//! Entries live in a `SlotMap`; each bucket slot holds the key of its chain
//! head and each entry holds the key of its successor. Growth relinks these
//! keys and never moves an entry, so a `Handle` stays valid across resizes.

use crate::config::TableConfig;
use crate::dispose::{Disposer, DropDisposer};
use crate::error::TableError;
use crate::strategy::KeyStrategy;
use slotmap::{DefaultKey, SlotMap};

#[cfg(any(test, feature = "fault_injection"))]
use crate::rehash::FailPoints;

pub(crate) type EntryKey = DefaultKey;

/// Generational reference to one entry. A handle to a removed entry never
/// resolves, even if its arena slot is reused. Handles are only meaningful
/// for the table that minted them; resolving one against another table is
/// a logic error that may yield an unrelated entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(EntryKey);

impl Handle {
    pub(crate) fn new(k: EntryKey) -> Self {
        Handle(k)
    }
    pub(crate) fn raw_handle(&self) -> EntryKey {
        self.0
    }

    pub fn key<'a, K, V, H, D>(&self, table: &'a ChainedTable<K, V, H, D>) -> Option<&'a K>
    where
        D: Disposer<K, V>,
    {
        table.slots.get(self.0).map(|e| &e.key)
    }

    pub fn value<'a, K, V, H, D>(&self, table: &'a ChainedTable<K, V, H, D>) -> Option<&'a V>
    where
        D: Disposer<K, V>,
    {
        table.slots.get(self.0).map(|e| &e.value)
    }

    pub fn value_mut<'a, K, V, H, D>(
        &self,
        table: &'a mut ChainedTable<K, V, H, D>,
    ) -> Option<&'a mut V>
    where
        D: Disposer<K, V>,
    {
        table.slots.get_mut(self.0).map(|e| &mut e.value)
    }
}

#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    // Computed once on insert; growth never calls back into the strategy.
    pub(crate) hash: u64,
    pub(crate) next: Option<EntryKey>,
}

/// Separate-chaining hash table with pluggable hashing (`H`) and disposal
/// (`D`).
pub struct ChainedTable<K, V, H, D = DropDisposer>
where
    D: Disposer<K, V>,
{
    pub(crate) buckets: Vec<Option<EntryKey>>,
    pub(crate) slots: SlotMap<EntryKey, Entry<K, V>>,
    pub(crate) strategy: H,
    pub(crate) disposer: D,
    pub(crate) config: TableConfig,
    pub(crate) grow_at: usize,
    pub(crate) resizes: usize,
    #[cfg(any(test, feature = "fault_injection"))]
    pub(crate) fail_points: FailPoints,
}

impl<K, V, H> ChainedTable<K, V, H>
where
    H: KeyStrategy<K>,
{
    /// Empty table with the default sizing and a dropping disposer.
    pub fn new(strategy: H) -> Self {
        Self::with_disposer(strategy, DropDisposer)
    }
}

impl<K, V, H, D> ChainedTable<K, V, H, D>
where
    H: KeyStrategy<K>,
    D: Disposer<K, V>,
{
    pub fn with_disposer(strategy: H, disposer: D) -> Self {
        let config = TableConfig::default();
        Self::from_parts(
            vec![None; config.starting_size()],
            config,
            strategy,
            disposer,
        )
    }

    pub fn with_config(config: TableConfig, strategy: H, disposer: D) -> Result<Self, TableError> {
        config.validate()?;
        let buckets = crate::rehash::alloc_bucket_array(config.starting_size())
            .map_err(|_| TableError::OutOfMemory)?;
        Ok(Self::from_parts(buckets, config, strategy, disposer))
    }

    fn from_parts(
        buckets: Vec<Option<EntryKey>>,
        config: TableConfig,
        strategy: H,
        disposer: D,
    ) -> Self {
        Self {
            grow_at: config.grow_threshold(buckets.len()),
            buckets,
            slots: SlotMap::with_key(),
            strategy,
            disposer,
            config,
            resizes: 0,
            #[cfg(any(test, feature = "fault_injection"))]
            fail_points: FailPoints::default(),
        }
    }

    #[inline]
    pub(crate) fn bucket_index(&self, hash: u64) -> usize {
        (hash as usize) & (self.buckets.len() - 1)
    }

    /// Walks the chain for `hash` and returns `(predecessor, entry)` of the
    /// first entry accepted by `is_match`.
    pub(crate) fn locate<F>(&self, hash: u64, mut is_match: F) -> Option<(Option<EntryKey>, EntryKey)>
    where
        F: FnMut(&K) -> bool,
    {
        let mut prev = None;
        let mut cur = self.buckets[self.bucket_index(hash)];
        while let Some(k) = cur {
            let e = self.slots.get(k)?;
            if e.hash == hash && is_match(&e.key) {
                return Some((prev, k));
            }
            prev = cur;
            cur = e.next;
        }
        None
    }

    fn locate_key(&self, key: &K) -> Option<(Option<EntryKey>, EntryKey)> {
        let hash = self.strategy.hash(key);
        self.locate(hash, |k| self.strategy.eq(k, key))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of bucket slots; always a power of two.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Entry count the table holds before the next insert grows it.
    pub fn grow_threshold(&self) -> usize {
        self.grow_at
    }

    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.buckets.len() as f64
    }

    /// How many times the bucket array has been replaced.
    pub fn resize_count(&self) -> usize {
        self.resizes
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn strategy(&self) -> &H {
        &self.strategy
    }

    pub fn disposer(&self) -> &D {
        &self.disposer
    }

    /// Length of the chain in bucket `index`; 0 for an out-of-range index.
    pub fn chain_len(&self, index: usize) -> usize {
        let mut n = 0;
        let mut cur = self.buckets.get(index).copied().flatten();
        while let Some(k) = cur {
            n += 1;
            cur = self.slots.get(k).and_then(|e| e.next);
        }
        n
    }

    pub fn max_chain_len(&self) -> usize {
        (0..self.buckets.len())
            .map(|i| self.chain_len(i))
            .max()
            .unwrap_or(0)
    }

    /// Inserts a new pair at the tail of its chain.
    ///
    /// An equal key already present yields `DuplicateKey` and nothing
    /// changes, not even the bucket array. Otherwise growth is attempted
    /// when the insert would exceed the grow threshold; if it fails the
    /// table is untouched and `RehashFailure` is returned.
    pub fn insert(&mut self, key: K, value: V) -> Result<Handle, TableError> {
        let hash = self.strategy.hash(&key);
        if self.locate(hash, |k| self.strategy.eq(k, &key)).is_some() {
            return Err(TableError::DuplicateKey);
        }
        if self.len() + 1 > self.grow_at {
            self.grow()?;
        }

        let idx = self.bucket_index(hash);
        let mut tail = None;
        let mut cur = self.buckets[idx];
        while let Some(k) = cur {
            tail = cur;
            cur = self.slots[k].next;
        }

        self.reserve_entry()?;
        let k = self.slots.insert(Entry {
            key,
            value,
            hash,
            next: None,
        });
        match tail {
            None => self.buckets[idx] = Some(k),
            Some(t) => self.slots[t].next = Some(k),
        }
        Ok(Handle::new(k))
    }

    fn reserve_entry(&mut self) -> Result<(), TableError> {
        #[cfg(any(test, feature = "fault_injection"))]
        if self.fail_points.entry_alloc {
            return Err(TableError::OutOfMemory);
        }
        Ok(())
    }

    pub fn contains(&self, key: &K) -> bool {
        self.locate_key(key).is_some()
    }

    pub fn find(&self, key: &K) -> Option<Handle> {
        self.locate_key(key).map(|(_, k)| Handle::new(k))
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let (_, k) = self.locate_key(key)?;
        self.slots.get(k).map(|e| &e.value)
    }

    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let (_, k) = self.locate_key(key)?;
        self.slots.get(k).map(|e| (&e.key, &e.value))
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let (_, k) = self.locate_key(key)?;
        self.slots.get_mut(k).map(|e| &mut e.value)
    }

    /// Unlinks the entry equal to `key`, hands its value back and disposes
    /// of the stored key. An absent key leaves the table unchanged.
    pub fn remove(&mut self, key: &K) -> Result<V, TableError> {
        let (prev, k) = self.locate_key(key).ok_or(TableError::NotFound)?;
        Ok(self.unlink_and_dispose_key(prev, k))
    }

    /// Same as `remove`, addressed by handle. Returns `None` for a stale
    /// handle.
    pub fn remove_handle(&mut self, handle: Handle) -> Option<V> {
        let target = handle.raw_handle();
        let hash = self.slots.get(target)?.hash;
        let mut prev = None;
        let mut cur = self.buckets[self.bucket_index(hash)];
        while let Some(k) = cur {
            if k == target {
                return Some(self.unlink_and_dispose_key(prev, k));
            }
            prev = cur;
            cur = self.slots.get(k)?.next;
        }
        None
    }

    /// Removes the first entry whose key satisfies `is_match` among those
    /// with `hash`, returning the owned pair without running the disposer.
    pub(crate) fn take_matching<F>(&mut self, hash: u64, is_match: F) -> Option<(K, V)>
    where
        F: FnMut(&K) -> bool,
    {
        let (prev, k) = self.locate(hash, is_match)?;
        let e = self.unlink(prev, k);
        Some((e.key, e.value))
    }

    fn unlink_and_dispose_key(&mut self, prev: Option<EntryKey>, k: EntryKey) -> V {
        let Entry { key, value, .. } = self.unlink(prev, k);
        self.disposer.dispose(key, None);
        value
    }

    fn unlink(&mut self, prev: Option<EntryKey>, k: EntryKey) -> Entry<K, V> {
        let entry = self
            .slots
            .remove(k)
            .expect("located entry must be live in the arena");
        match prev {
            None => {
                let idx = self.bucket_index(entry.hash);
                self.buckets[idx] = entry.next;
            }
            Some(p) => self.slots[p].next = entry.next,
        }
        entry
    }

    /// Disposes of every entry. The bucket array keeps its size.
    pub fn clear(&mut self) {
        for head in self.buckets.iter_mut() {
            *head = None;
        }
        for (_, e) in self.slots.drain() {
            self.disposer.dispose(e.key, Some(e.value));
        }
    }
}

impl<K, V, H, D> Drop for ChainedTable<K, V, H, D>
where
    D: Disposer<K, V>,
{
    fn drop(&mut self) {
        for (_, e) in self.slots.drain() {
            self.disposer.dispose(e.key, Some(e.value));
        }
    }
}

impl<K, V, H, D> core::fmt::Debug for ChainedTable<K, V, H, D>
where
    K: core::fmt::Debug,
    V: core::fmt::Debug,
    D: Disposer<K, V>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
