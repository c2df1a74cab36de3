//! Error taxonomy surfaced by every fallible table operation.

use thiserror::Error;

/// Why a table operation did not take effect.
///
/// None of these leave the table in a partially mutated state: when an
/// operation returns an error, `len()`, every chain and the bucket array are
/// exactly as they were before the call.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum TableError {
    /// The key is already present; the existing entry was not touched.
    #[error("key already present in table")]
    DuplicateKey,
    /// An entry could not be allocated.
    #[error("out of memory while allocating an entry")]
    OutOfMemory,
    /// Growing the bucket array failed; the original table is still valid.
    #[error("failed to grow the bucket array; table left unchanged")]
    RehashFailure,
    /// Lookup or removal of an absent key.
    #[error("key not found")]
    NotFound,
    /// A `TableConfig` value is out of range.
    #[error("invalid table configuration: {0}")]
    InvalidConfig(&'static str),
}
