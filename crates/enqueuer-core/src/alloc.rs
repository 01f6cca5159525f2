//! Collection types for enqueuer.
//!
//! This module provides:
//! - Re-exports of hash collections using AHash
//! - Insertion-ordered maps and sets over the same hasher
//!
//! Registries keep insertion order because dependency lists, attribute maps and
//! batch registration all treat declaration order as load order.

// Re-export optimized hash collections
pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};

/// Insertion-ordered map using AHash.
///
/// Construct with `IndexMap::default()`; `IndexMap::new()` is only available for
/// the std hasher.
pub type IndexMap<K, V> = indexmap::IndexMap<K, V, RandomState>;

/// Insertion-ordered set using AHash.
pub type IndexSet<T> = indexmap::IndexSet<T, RandomState>;
