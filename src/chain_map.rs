//! ChainMap: typed facade over `ChainedTable` for `K: Hash + Eq`.

use crate::chained_table::{ChainedTable, Handle};
use crate::config::TableConfig;
use crate::dispose::DropDisposer;
use crate::error::TableError;
use crate::iter::{Drain, Iter, IterMut, Keys, SafeCursor, Values};
use crate::strategy::StdStrategy;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// Separate-chaining map hashed through a `BuildHasher`, with borrowed-form
/// lookups (`String` keys queried by `&str`).
pub struct ChainMap<K, V, S = DefaultHashBuilder> {
    table: ChainedTable<K, V, StdStrategy<S>, DropDisposer>,
}

impl<K, V> ChainMap<K, V>
where
    K: Hash + Eq,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    pub fn with_config(config: TableConfig) -> Result<Self, TableError> {
        Self::with_config_and_hasher(config, Default::default())
    }
}

impl<K, V> Default for ChainMap<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ChainMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            table: ChainedTable::with_disposer(StdStrategy::with_hasher(hasher), DropDisposer),
        }
    }

    pub fn with_config_and_hasher(config: TableConfig, hasher: S) -> Result<Self, TableError> {
        Ok(Self {
            table: ChainedTable::with_config(
                config,
                StdStrategy::with_hasher(hasher),
                DropDisposer,
            )?,
        })
    }

    fn hash_of<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.table.strategy().hash_one(q)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    pub fn resize_count(&self) -> usize {
        self.table.resize_count()
    }

    /// Inserts a new key; an existing equal key is left untouched and
    /// `DuplicateKey` is returned.
    pub fn insert(&mut self, key: K, value: V) -> Result<Handle, TableError> {
        self.table.insert(key, value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(q).is_some()
    }

    pub fn find<Q>(&self, q: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_of(q);
        self.table
            .locate(hash, |k| k.borrow() == q)
            .map(|(_, k)| Handle::new(k))
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(q).and_then(|h| h.value(&self.table))
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let h = self.find(q)?;
        h.value_mut(&mut self.table)
    }

    /// Removes the entry and returns its value.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_of(q);
        self.table.take_matching(hash, |k| k.borrow() == q)
    }

    pub fn remove_handle(&mut self, handle: Handle) -> Option<V> {
        self.table.remove_handle(handle)
    }

    pub fn key(&self, handle: Handle) -> Option<&K> {
        handle.key(&self.table)
    }

    pub fn value(&self, handle: Handle) -> Option<&V> {
        handle.value(&self.table)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        self.table.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        self.table.iter_mut()
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        self.table.keys()
    }

    pub fn values(&self) -> Values<'_, K, V> {
        self.table.values()
    }

    pub fn cursor(&self) -> SafeCursor {
        self.table.cursor()
    }

    /// Advances `cursor` over this map; see `SafeCursor`.
    pub fn advance(&self, cursor: &mut SafeCursor) -> Option<Handle> {
        cursor.next(&self.table)
    }

    pub fn drain(&mut self) -> Drain<'_, K, V, StdStrategy<S>, DropDisposer> {
        self.table.drain()
    }

    pub fn clear(&mut self) {
        self.table.clear()
    }

    /// Keeps only the pairs for which `keep` returns true.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        let mut cursor = self.table.cursor();
        while let Some(h) = cursor.next(&self.table) {
            let drop_it = match (h.key(&self.table), h.value(&self.table)) {
                (Some(k), Some(v)) => !keep(k, v),
                _ => false,
            };
            if drop_it {
                self.table.remove_handle(h);
            }
        }
    }

    /// The underlying table, for introspection (chain lengths, load factor).
    pub fn as_table(&self) -> &ChainedTable<K, V, StdStrategy<S>, DropDisposer> {
        &self.table
    }
}

impl<K, V, S> Extend<(K, V)> for ChainMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Inserts every pair; pairs whose key is already present are skipped.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            if let Err(e) = self.insert(k, v) {
                if e != TableError::DuplicateKey {
                    log::warn!("dropping pair during extend: {}", e);
                }
            }
        }
    }
}

impl<K, V> FromIterator<(K, V)> for ChainMap<K, V>
where
    K: Hash + Eq,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut m = Self::new();
        m.extend(iter);
        m
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChainMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> core::fmt::Debug for ChainMap<K, V, S>
where
    K: core::fmt::Debug,
    V: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.table, f)
    }
}
