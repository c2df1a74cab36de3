//! Hash and equality strategies.
//!
//! The table never calls `Hash`/`Eq` directly; it goes through a
//! `KeyStrategy` so callers can plug in their own digest and equivalence.
//! A strategy must be stable for the lifetime of a stored key, and `eq` must
//! be an equivalence relation consistent with `hash`.

use core::hash::{BuildHasher, BuildHasherDefault, Hash, Hasher};
use core::marker::PhantomData;
use hashbrown::hash_map::DefaultHashBuilder;

/// Caller-supplied hashing and equality for keys of type `K`.
pub trait KeyStrategy<K: ?Sized> {
    fn hash(&self, key: &K) -> u64;
    fn eq(&self, a: &K, b: &K) -> bool;
}

/// Jenkins one-at-a-time hash over a byte span.
///
/// Deterministic and seedless, suitable for compound keys serialized to
/// bytes.
#[inline]
pub fn data_hash64(data: &[u8]) -> u64 {
    let mut hash = OneAtATimeHasher::default();
    hash.write(data);
    hash.finish()
}

/// SplitMix64 finalizer for 64-bit integer keys.
#[inline]
pub fn integer_hash64(x: u64) -> u64 {
    let x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    let x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

/// Cheaper finalizer for 32-bit integer keys (lowbias32).
#[inline]
pub fn integer_hash32(x: u32) -> u32 {
    let x = (x ^ (x >> 16)).wrapping_mul(0x7feb_352d);
    let x = (x ^ (x >> 15)).wrapping_mul(0x846c_a68b);
    x ^ (x >> 16)
}

/// `Hasher` running one-at-a-time mixing over every byte written, so any
/// `K: Hash` can be hashed with `data_hash64` semantics.
#[derive(Debug, Default, Clone, Copy)]
pub struct OneAtATimeHasher(u64);

impl Hasher for OneAtATimeHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        let mut hash = self.0;
        for &b in bytes {
            hash = hash.wrapping_add(u64::from(b));
            hash = hash.wrapping_add(hash << 10);
            hash ^= hash >> 6;
        }
        self.0 = hash;
    }

    #[inline]
    fn finish(&self) -> u64 {
        let mut hash = self.0;
        hash = hash.wrapping_add(hash << 3);
        hash ^= hash >> 11;
        hash.wrapping_add(hash << 15)
    }
}

pub type OneAtATimeBuildHasher = BuildHasherDefault<OneAtATimeHasher>;

/// Byte keys (`String`, `Vec<u8>`, `&str`, ...) hashed with `data_hash64`
/// and compared bytewise.
#[derive(Debug, Default, Clone, Copy)]
pub struct BytesStrategy;

impl<K: AsRef<[u8]> + ?Sized> KeyStrategy<K> for BytesStrategy {
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        data_hash64(key.as_ref())
    }
    #[inline]
    fn eq(&self, a: &K, b: &K) -> bool {
        a.as_ref() == b.as_ref()
    }
}

/// 64-bit integer keys hashed with `integer_hash64`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Int64Strategy;

macro_rules! int64_strategy {
    ($($t:ty),*) => {$(
        impl KeyStrategy<$t> for Int64Strategy {
            #[inline]
            fn hash(&self, key: &$t) -> u64 {
                integer_hash64(*key as u64)
            }
            #[inline]
            fn eq(&self, a: &$t, b: &$t) -> bool {
                a == b
            }
        }
    )*};
}
int64_strategy!(u64, i64, usize, isize);

/// 32-bit integer keys hashed with `integer_hash32`.
///
/// The 32-bit digest is spread into the upper half as well so masks wider
/// than 32 bits still see mixed bits.
#[derive(Debug, Default, Clone, Copy)]
pub struct Int32Strategy;

macro_rules! int32_strategy {
    ($($t:ty),*) => {$(
        impl KeyStrategy<$t> for Int32Strategy {
            #[inline]
            fn hash(&self, key: &$t) -> u64 {
                let h = integer_hash32(*key as u32);
                (u64::from(h) << 32) | u64::from(h)
            }
            #[inline]
            fn eq(&self, a: &$t, b: &$t) -> bool {
                a == b
            }
        }
    )*};
}
int32_strategy!(u32, i32, u16, i16, u8, i8);

/// Any `K: Hash + Eq`, hashed through a `BuildHasher`.
#[derive(Debug, Default, Clone)]
pub struct StdStrategy<S = DefaultHashBuilder> {
    hasher: S,
}

impl<S> StdStrategy<S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self { hasher }
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }
}

impl<S: BuildHasher> StdStrategy<S> {
    /// Hashes a borrowed form of a key; agrees with `hash` whenever
    /// `K: Borrow<Q>`.
    #[inline]
    pub fn hash_one<Q: Hash + ?Sized>(&self, q: &Q) -> u64 {
        self.hasher.hash_one(q)
    }
}

impl<K: Hash + Eq + ?Sized, S: BuildHasher> KeyStrategy<K> for StdStrategy<S> {
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        self.hasher.hash_one(key)
    }
    #[inline]
    fn eq(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Plain function pointers for hash and equality.
pub struct FnStrategy<K: ?Sized> {
    hash: fn(&K) -> u64,
    eq: fn(&K, &K) -> bool,
    _pd: PhantomData<fn(&K)>,
}

impl<K: ?Sized> FnStrategy<K> {
    pub fn new(hash: fn(&K) -> u64, eq: fn(&K, &K) -> bool) -> Self {
        Self {
            hash,
            eq,
            _pd: PhantomData,
        }
    }
}

impl<K: ?Sized> Clone for FnStrategy<K> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<K: ?Sized> Copy for FnStrategy<K> {}

impl<K: ?Sized> core::fmt::Debug for FnStrategy<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FnStrategy").finish_non_exhaustive()
    }
}

impl<K: ?Sized> KeyStrategy<K> for FnStrategy<K> {
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        (self.hash)(key)
    }
    #[inline]
    fn eq(&self, a: &K, b: &K) -> bool {
        (self.eq)(a, b)
    }
}
