//! Hash map used by the sparse tick, bitmap and position registries.
//!
//! Exactly one of `rustc-hash` or `ahash` swaps in a faster hasher; any
//! other combination (including `std-hash`) falls back to the std map.

#[cfg(all(
    feature = "rustc-hash",
    not(any(feature = "ahash", feature = "std-hash"))
))]
pub type FastMap<K, V> = rustc_hash::FxHashMap<K, V>;

#[cfg(all(
    feature = "ahash",
    not(any(feature = "rustc-hash", feature = "std-hash"))
))]
pub type FastMap<K, V> = ahash::AHashMap<K, V>;

#[cfg(not(any(
    all(
        feature = "rustc-hash",
        not(any(feature = "ahash", feature = "std-hash"))
    ),
    all(
        feature = "ahash",
        not(any(feature = "rustc-hash", feature = "std-hash"))
    ),
)))]
pub type FastMap<K, V> = std::collections::HashMap<K, V>;
