//! Per-kind asset storage.

use std::sync::Arc;

use enqueuer_core::alloc::{HashMap, HashSet, IndexMap};
use parking_lot::{Mutex, RwLock};

use crate::handle::Shared;

/// Slot a tag filter reads through, so that a re-constructed asset takes over the
/// filter attached for its predecessor.
pub(crate) type FilterSlot<A> = Arc<RwLock<Shared<A>>>;

/// Storage for one asset kind.
///
/// `registered` holds every constructed asset, `enqueued` every asset that went
/// through an enqueue request. Both keep insertion order.
pub struct Assets<A> {
    registered: RwLock<IndexMap<String, Shared<A>>>,
    enqueued: RwLock<IndexMap<String, Shared<A>>>,
    filters: Mutex<HashMap<String, FilterSlot<A>>>,
    /// Names whose inline and localized payloads reached the host
    payloads: Mutex<HashSet<String>>,
}

impl<A> Default for Assets<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Assets<A> {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self {
            registered: RwLock::new(IndexMap::default()),
            enqueued: RwLock::new(IndexMap::default()),
            filters: Mutex::new(HashMap::new()),
            payloads: Mutex::new(HashSet::new()),
        }
    }

    /// Insert or replace the asset stored under `name`.
    pub fn insert(&self, name: &str, asset: Shared<A>) {
        self.registered.write().insert(name.to_string(), asset);
    }

    pub fn get(&self, name: &str) -> Option<Shared<A>> {
        self.registered.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registered.read().contains_key(name)
    }

    pub fn remove(&self, name: &str) -> Option<Shared<A>> {
        self.registered.write().shift_remove(name)
    }

    pub fn mark_enqueued(&self, name: &str, asset: Shared<A>) {
        self.enqueued.write().insert(name.to_string(), asset);
    }

    pub fn is_enqueued(&self, name: &str) -> bool {
        self.enqueued.read().contains_key(name)
    }

    pub fn unmark_enqueued(&self, name: &str) -> Option<Shared<A>> {
        self.enqueued.write().shift_remove(name)
    }

    /// Registered assets in insertion order, detached from the lock.
    pub fn snapshot(&self) -> Vec<(String, Shared<A>)> {
        self.registered
            .read()
            .iter()
            .map(|(name, asset)| (name.clone(), Arc::clone(asset)))
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.registered.read().keys().cloned().collect()
    }

    pub fn enqueued_names(&self) -> Vec<String> {
        self.enqueued.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.registered.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.read().is_empty()
    }

    /// Point the tag filter of `name` at `asset`.
    ///
    /// Returns the new slot when no filter exists yet for `name`; the caller must
    /// attach one. Returns `None` when an existing slot was repointed.
    pub(crate) fn filter_slot(&self, name: &str, asset: &Shared<A>) -> Option<FilterSlot<A>> {
        let mut filters = self.filters.lock();
        if let Some(slot) = filters.get(name) {
            *slot.write() = Arc::clone(asset);
            return None;
        }

        let slot = Arc::new(RwLock::new(Arc::clone(asset)));
        filters.insert(name.to_string(), Arc::clone(&slot));
        Some(slot)
    }

    /// Claim the payload attachment of `name`.
    ///
    /// Returns `true` only for the first claim until [`Assets::release_payloads`]
    /// or [`Assets::clear`].
    pub(crate) fn claim_payloads(&self, name: &str) -> bool {
        self.payloads.lock().insert(name.to_string())
    }

    pub(crate) fn release_payloads(&self, name: &str) {
        self.payloads.lock().remove(name);
    }

    /// Drop every asset, filter slot and payload claim.
    pub fn clear(&self) {
        self.registered.write().clear();
        self.enqueued.write().clear();
        self.filters.lock().clear();
        self.payloads.lock().clear();
    }
}
