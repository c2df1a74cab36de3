//! Traversal of a `ChainedTable`.
//!
//! Three protocols:
//! - `Iter` (and `keys`/`values`): read-only, ascending bucket index then
//!   chain order. The shared borrow rules out mutation while it runs.
//! - `SafeCursor`: detached cursor that borrows the table only for the
//!   duration of each step, so the caller may remove the entry it was just
//!   handed before asking for the next one.
//! - `Drain` / `drain_with`: consume entries in traversal order, leaving
//!   the table empty with its bucket array still allocated.

use crate::chained_table::{ChainedTable, Entry, EntryKey, Handle};
use crate::dispose::Disposer;
use core::iter::FusedIterator;
use slotmap::SlotMap;

/// Read-only iterator in bucket/chain order.
pub struct Iter<'a, K, V> {
    buckets: &'a [Option<EntryKey>],
    slots: &'a SlotMap<EntryKey, Entry<K, V>>,
    next_bucket: usize,
    current: Option<EntryKey>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(k) = self.current {
                let e = self.slots.get(k)?;
                self.current = e.next;
                self.remaining -= 1;
                return Some((&e.key, &e.value));
            }
            let head = self.buckets.get(self.next_bucket)?;
            self.next_bucket += 1;
            self.current = *head;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets,
            slots: self.slots,
            next_bucket: self.next_bucket,
            current: self.current,
            remaining: self.remaining,
        }
    }
}

pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Iterator over mutable values. Visits every entry once in arena order,
/// which is unrelated to bucket order.
pub struct IterMut<'a, K, V> {
    it: slotmap::basic::IterMut<'a, EntryKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (&e.key, &mut e.value))
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// Position of a `SafeCursor`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CursorState {
    /// No entry yielded yet.
    Created,
    /// Last yielded entry sits in this bucket.
    Positioned(usize),
    Exhausted,
}

/// Removal-safe cursor.
///
/// Between two calls to `next` the caller may remove the entry last
/// yielded (by key or by handle). The cursor notices the entry is gone and
/// resumes from its recorded chain predecessor, or from the bucket head
/// when the removed entry was the head. Removing any other entry between
/// steps may cause entries to be skipped or repeated, but never reads freed
/// memory. A resize invalidates the cursor, which then reports exhaustion.
///
/// A cursor is bound to the table that created it. Advancing it over any
/// other table is a logic error: arena keys from one table may resolve to
/// unrelated entries of another, and only a differing bucket or resize
/// count is detected.
#[derive(Clone, Debug)]
pub struct SafeCursor {
    state: CursorState,
    current: Option<EntryKey>,
    prev: Option<EntryKey>,
    bucket_count: usize,
    resizes: usize,
}

impl SafeCursor {
    pub(crate) fn new(bucket_count: usize, resizes: usize) -> Self {
        Self {
            state: CursorState::Created,
            current: None,
            prev: None,
            bucket_count,
            resizes,
        }
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == CursorState::Exhausted
    }

    /// Advances and returns a handle to the next live entry of `table`,
    /// which must be the table this cursor was created from.
    pub fn next<K, V, H, D>(&mut self, table: &ChainedTable<K, V, H, D>) -> Option<Handle>
    where
        D: Disposer<K, V>,
    {
        let index = match self.state {
            CursorState::Exhausted => return None,
            CursorState::Created => None,
            CursorState::Positioned(i) => Some(i),
        };
        if table.resizes != self.resizes || table.buckets.len() != self.bucket_count {
            log::warn!("table resized during removal-safe traversal; stopping cursor");
            self.finish();
            return None;
        }

        let mut candidate = None;
        if let (Some(i), Some(cur)) = (index, self.current) {
            match table.slots.get(cur) {
                Some(e) => {
                    self.prev = Some(cur);
                    candidate = e.next;
                }
                // The entry last yielded was removed: recover through its
                // predecessor, which now links to the removed entry's
                // successor, or through the bucket head.
                None => match self.prev.and_then(|p| table.slots.get(p)) {
                    Some(pe) if bucket_of(pe.hash, self.bucket_count) == i => {
                        candidate = pe.next;
                    }
                    _ => {
                        self.prev = None;
                        candidate = table.buckets[i];
                    }
                },
            }
        }

        if candidate.is_none() {
            let start = index.map_or(0, |i| i + 1);
            match (start..self.bucket_count).find(|&b| table.buckets[b].is_some()) {
                Some(b) => {
                    self.state = CursorState::Positioned(b);
                    self.prev = None;
                    candidate = table.buckets[b];
                }
                None => {
                    self.finish();
                    return None;
                }
            }
        }

        self.current = candidate;
        candidate.map(Handle::new)
    }

    fn finish(&mut self) {
        self.state = CursorState::Exhausted;
        self.current = None;
        self.prev = None;
    }
}

#[inline]
fn bucket_of(hash: u64, bucket_count: usize) -> usize {
    (hash as usize) & (bucket_count - 1)
}

/// Draining iterator: yields owned pairs in traversal order, unlinking each
/// as it goes. Ownership of a yielded pair passes to the caller, so the
/// disposer does not see it; pairs left when the `Drain` is dropped are
/// disposed of.
pub struct Drain<'a, K, V, H, D>
where
    D: Disposer<K, V>,
{
    table: &'a mut ChainedTable<K, V, H, D>,
    next_bucket: usize,
}

impl<K, V, H, D> Iterator for Drain<'_, K, V, H, D>
where
    D: Disposer<K, V>,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let head = self.table.buckets.get_mut(self.next_bucket)?;
            if let Some(k) = *head {
                let e = self.table.slots.remove(k)?;
                *head = e.next;
                return Some((e.key, e.value));
            }
            self.next_bucket += 1;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.table.slots.len();
        (n, Some(n))
    }
}

impl<K, V, H, D> ExactSizeIterator for Drain<'_, K, V, H, D> where D: Disposer<K, V> {}

impl<K, V, H, D> Drop for Drain<'_, K, V, H, D>
where
    D: Disposer<K, V>,
{
    fn drop(&mut self) {
        for head in self.table.buckets.iter_mut() {
            *head = None;
        }
        for (_, e) in self.table.slots.drain() {
            self.table.disposer.dispose(e.key, Some(e.value));
        }
    }
}

impl<K, V, H, D> ChainedTable<K, V, H, D>
where
    D: Disposer<K, V>,
{
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: &self.buckets,
            slots: &self.slots,
            next_bucket: 0,
            current: None,
            remaining: self.slots.len(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.slots.iter_mut(),
        }
    }

    /// Cursor for traversal that tolerates removing the entry last yielded.
    pub fn cursor(&self) -> SafeCursor {
        SafeCursor::new(self.buckets.len(), self.resizes)
    }

    pub fn drain(&mut self) -> Drain<'_, K, V, H, D> {
        Drain {
            table: self,
            next_bucket: 0,
        }
    }

    /// Visits every entry in traversal order, then unlinks it and hands the
    /// full pair to the disposer before moving on.
    ///
    /// The entry being visited is still linked as its bucket head, so if
    /// `visit` panics the table keeps it and every entry not yet drained.
    pub fn drain_with<F>(&mut self, mut visit: F)
    where
        F: FnMut(&K, &V),
    {
        for b in 0..self.buckets.len() {
            while let Some(k) = self.buckets[b] {
                let e = &self.slots[k];
                visit(&e.key, &e.value);
                let e = self
                    .slots
                    .remove(k)
                    .expect("bucket head must be live in the arena");
                self.buckets[b] = e.next;
                self.disposer.dispose(e.key, Some(e.value));
            }
        }
    }
}

impl<'a, K, V, H, D> IntoIterator for &'a ChainedTable<K, V, H, D>
where
    D: Disposer<K, V>,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
