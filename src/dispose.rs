//! Disposal hooks run when the table stops owning a key/value pair.

/// Releases keys and values the table no longer owns.
///
/// `value` is `None` when the value's ownership passed back to the caller
/// (e.g. `remove`), so only the key is the table's to release.
pub trait Disposer<K, V> {
    fn dispose(&mut self, key: K, value: Option<V>);
}

/// Default disposer: lets `Drop` release both halves.
#[derive(Debug, Default, Clone, Copy)]
pub struct DropDisposer;

impl<K, V> Disposer<K, V> for DropDisposer {
    #[inline]
    fn dispose(&mut self, _key: K, _value: Option<V>) {}
}

/// Disposer backed by a closure, e.g. to return buffers to a pool or to
/// count releases.
pub struct FnDisposer<F>(pub F);

impl<K, V, F> Disposer<K, V> for FnDisposer<F>
where
    F: FnMut(K, Option<V>),
{
    #[inline]
    fn dispose(&mut self, key: K, value: Option<V>) {
        (self.0)(key, value)
    }
}

impl<F> core::fmt::Debug for FnDisposer<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("FnDisposer")
    }
}
