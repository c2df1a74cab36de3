//! Growth of the bucket array.
//!
//! A resize allocates every transient array it needs up front, then relinks
//! entries from the old chains into the new array. Relinking cannot fail, so
//! the table either commits the new array in full or returns
//! `RehashFailure` with every chain exactly as it was.

use crate::chained_table::{ChainedTable, EntryKey};
use crate::dispose::Disposer;
use crate::error::TableError;

/// Allocation fail points for exercising the error paths of insert and
/// growth. Every point is off by default.
#[cfg(any(test, feature = "fault_injection"))]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct FailPoints {
    /// Fail the allocation of a new bucket array.
    pub bucket_alloc: bool,
    /// Fail the allocation of a new entry.
    pub entry_alloc: bool,
}

pub(crate) fn alloc_bucket_array(len: usize) -> Result<Vec<Option<EntryKey>>, TableError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| TableError::RehashFailure)?;
    v.resize(len, None);
    Ok(v)
}

impl<K, V, H, D> ChainedTable<K, V, H, D>
where
    D: Disposer<K, V>,
{
    /// Grows by the configured growth factor. Called by `insert` when the
    /// grow threshold would be exceeded.
    pub(crate) fn grow(&mut self) -> Result<(), TableError> {
        let Some(target) = self
            .buckets
            .len()
            .checked_mul(self.config.growth_factor())
        else {
            log::warn!(
                "cannot grow past {} buckets: bucket count overflows",
                self.buckets.len()
            );
            return Err(TableError::RehashFailure);
        };
        self.rehash(target)
    }

    /// Replaces the bucket array with one of `bucket_count` slots.
    ///
    /// `bucket_count` must be a power of two no smaller than the current
    /// count. Entries keep their handles; only chain links change.
    pub fn resize_to(&mut self, bucket_count: usize) -> Result<(), TableError> {
        if !bucket_count.is_power_of_two() || bucket_count < self.buckets.len() {
            return Err(TableError::InvalidConfig(
                "bucket count must be a power of two no smaller than the current one",
            ));
        }
        if bucket_count == self.buckets.len() {
            return Ok(());
        }
        self.rehash(bucket_count)
    }

    fn rehash(&mut self, new_len: usize) -> Result<(), TableError> {
        let (mut heads, mut tails) = match self.alloc_rehash_arrays(new_len) {
            Ok(arrays) => arrays,
            Err(e) => {
                log::warn!(
                    "rehash from {} to {} buckets failed: {}",
                    self.buckets.len(),
                    new_len,
                    e
                );
                return Err(e);
            }
        };

        let mask = new_len - 1;
        for slot in self.buckets.iter_mut() {
            let mut cur = slot.take();
            while let Some(k) = cur {
                // Detach before relinking so the entry being moved is never
                // reached again through its old successor link.
                let (next, hash) = {
                    let e = &mut self.slots[k];
                    (e.next.take(), e.hash)
                };
                cur = next;

                let idx = (hash as usize) & mask;
                match tails[idx] {
                    None => heads[idx] = Some(k),
                    Some(t) => self.slots[t].next = Some(k),
                }
                tails[idx] = Some(k);
            }
        }

        let old_len = self.buckets.len();
        self.buckets = heads;
        self.grow_at = self.config.grow_threshold(new_len);
        self.resizes += 1;
        log::debug!(
            "rehashed {} entries from {} to {} buckets",
            self.slots.len(),
            old_len,
            new_len
        );
        Ok(())
    }

    #[allow(clippy::type_complexity)]
    fn alloc_rehash_arrays(
        &self,
        new_len: usize,
    ) -> Result<(Vec<Option<EntryKey>>, Vec<Option<EntryKey>>), TableError> {
        #[cfg(any(test, feature = "fault_injection"))]
        if self.fail_points.bucket_alloc {
            return Err(TableError::RehashFailure);
        }
        let heads = alloc_bucket_array(new_len)?;
        let tails = alloc_bucket_array(new_len)?;
        Ok((heads, tails))
    }

    #[cfg(any(test, feature = "fault_injection"))]
    pub fn set_fail_points(&mut self, fail_points: FailPoints) {
        self.fail_points = fail_points;
    }

    #[cfg(any(test, feature = "fault_injection"))]
    pub fn fail_points(&self) -> FailPoints {
        self.fail_points
    }
}
