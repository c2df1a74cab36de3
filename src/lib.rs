//! chained-hashmap: a single-threaded, separate-chaining hash table with
//! pluggable hashing, equality and disposal.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a chained hash table whose hashing, key equivalence and release
//!   of evicted pairs are supplied by the caller, with automatic growth and
//!   traversal that tolerates removal of the entry just visited.
//! - Layers:
//!   - ChainedTable<K, V, H, D>: the engine. Bucket array of chain heads
//!     over an entry arena; `H: KeyStrategy<K>` hashes and compares keys,
//!     `D: Disposer<K, V>` releases pairs the table stops owning.
//!   - Rehash engine (`rehash`): grows the bucket array by relinking
//!     entries, all-or-nothing.
//!   - Iteration (`iter`): read-only `Iter`, removal-safe `SafeCursor`,
//!     and draining `Drain`/`drain_with`.
//!   - ChainMap<K, V, S>: typed facade for `K: Hash + Eq` with
//!     borrowed-form lookups.
//!
//! Constraints
//! - Single-threaded: no locks, no atomics.
//! - Bucket count is always a power of two; index = `hash & (buckets - 1)`.
//! - Unique keys: a duplicate insert fails and mutates nothing.
//! - Chains keep insertion order; new entries are appended at the tail.
//! - Growth is attempted at most once per insert and never half-applied.
//!
//! Entry storage
//! - Entries live in a `slotmap::SlotMap`; chain links are generational
//!   arena keys. Growth rewrites links only, so an entry is never moved or
//!   reallocated and a `Handle` stays valid until its entry is removed.
//! - Each entry stores its hash from insert time. Growth relinks by the
//!   stored hash and never calls back into the strategy.
//!
//! Disposal
//! - `remove` hands the value back and disposes of the key only
//!   (`dispose(key, None)`).
//! - `clear`, `drain_with`, a dropped partial `Drain` and dropping the
//!   table dispose of full pairs (`dispose(key, Some(value))`).
//! - Pairs handed out by value (`Drain` items, `ChainMap::remove_entry`)
//!   belong to the caller and are not disposed of.
//!
//! Removal-safe traversal
//! - `SafeCursor` keeps no borrow between steps. It records the last
//!   yielded entry and that entry's chain predecessor; if the former is gone
//!   at the next step it resumes from the predecessor's link or from the
//!   bucket head. Only removal of the entry last yielded is tolerated per
//!   step; other mutation may skip or repeat entries but is memory-safe.
//!
//! Notes and non-goals
//! - No open addressing, no persistence, no ordering beyond bucket/chain
//!   order, no shrinking.
//! - `fault_injection` feature: exposes `FailPoints` so allocation failure
//!   during growth and entry creation can be forced from tests.

pub mod chain_map;
pub mod chained_table;
mod chained_table_proptest;
pub mod config;
pub mod dispose;
pub mod error;
pub mod iter;
mod rehash;
pub mod strategy;

// Public surface
pub use chain_map::ChainMap;
pub use chained_table::{ChainedTable, Handle};
pub use config::TableConfig;
pub use dispose::{Disposer, DropDisposer, FnDisposer};
pub use error::TableError;
pub use iter::{CursorState, Drain, Iter, IterMut, Keys, SafeCursor, Values};
#[cfg(any(test, feature = "fault_injection"))]
pub use rehash::FailPoints;
pub use strategy::{
    data_hash64, integer_hash32, integer_hash64, BytesStrategy, FnStrategy, Int32Strategy,
    Int64Strategy, KeyStrategy, OneAtATimeBuildHasher, OneAtATimeHasher, StdStrategy,
};
