//! In-flight prefetch registry.
//!
//! Membership in the set is the only signal duplicate requesters use to
//! coordinate. Each entry owns a `watch::Sender<()>`; nothing is ever sent on
//! it. Waiters subscribe while the entry exists, and the sender is dropped
//! when the entry is removed, which wakes every waiter with a "closed"
//! notification.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use folio_core::ChunkKey;

/// Set of chunk keys currently being prefetched.
#[derive(Debug, Default)]
pub struct InFlightSet {
    entries: Mutex<HashMap<ChunkKey, watch::Sender<()>>>,
}

impl InFlightSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` as in flight.
    ///
    /// Returns `None` if the key is already in flight. Otherwise returns a
    /// guard; dropping the guard removes the key and wakes waiters.
    pub fn try_begin(&self, key: &ChunkKey) -> Option<InFlightGuard<'_>> {
        let mut entries = self.lock();
        if entries.contains_key(key) {
            return None;
        }
        let (tx, _rx) = watch::channel(());
        entries.insert(key.clone(), tx);
        Some(InFlightGuard {
            set: self,
            key: key.clone(),
        })
    }

    /// Subscribe to the settlement of `key`, if it is in flight.
    pub fn subscribe(&self, key: &ChunkKey) -> Option<watch::Receiver<()>> {
        self.lock().get(key).map(watch::Sender::subscribe)
    }

    /// Whether `key` is in flight.
    pub fn contains(&self, key: &ChunkKey) -> bool {
        self.lock().contains_key(key)
    }

    /// Number of keys in flight.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn finish(&self, key: &ChunkKey) {
        // Dropping the sender closes every subscribed receiver.
        let sender = self.lock().remove(key);
        drop(sender);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ChunkKey, watch::Sender<()>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Keeps a key in the [`InFlightSet`] until dropped.
///
/// Removal happens on every exit path of the fetch that owns the guard:
/// success, error, panic, or the owning future being dropped.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    set: &'a InFlightSet,
    key: ChunkKey,
}

impl InFlightGuard<'_> {
    /// The key this guard holds.
    pub const fn key(&self) -> &ChunkKey {
        &self.key
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.finish(&self.key);
    }
}
