//! Fixed-capacity key/value store with least-recently-used eviction.
//!
//! # Recency
//!
//! Every entry carries a recency stamp drawn from a per-cache counter that
//! increases on each `set` and each `get` hit. Stamps are therefore strictly
//! ordered and two entries never compare equal in practice; should they ever
//! tie, the entry inserted first (enumeration order of the backing
//! [`IndexMap`]) is evicted.
//!
//! # Complexity
//!
//! Eviction scans all entries for the smallest stamp: O(n) per eviction.
//! Capacities in this workspace are tens of entries, where the scan is cheaper
//! than maintaining a second index. If capacities grow, an intrusive recency
//! list gives O(1) eviction behind the same API.

use std::hash::Hash;
use std::num::NonZeroUsize;

use indexmap::IndexMap;

/// A cached value and when it was last touched.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    last_accessed: u64,
}

/// Bounded cache with recency-based eviction.
///
/// `|entries| ≤ capacity` holds after every operation: room is made *before*
/// a new key is inserted, never after.
///
/// This is a sync type with no internal locking; owners that share it across
/// tasks wrap it in a mutex.
#[derive(Debug, Clone)]
pub struct BoundedCache<K, V> {
    capacity: NonZeroUsize,
    entries: IndexMap<K, CacheEntry<V>>,
    clock: u64,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash,
{
    /// Create an empty cache holding at most `capacity` entries.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            entries: IndexMap::with_capacity(capacity.get()),
            clock: 0,
        }
    }

    /// Look up `key`, refreshing its recency on a hit.
    ///
    /// This is a read with a side effect: a hit moves the entry to the
    /// back of the eviction order.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let stamp = self.tick();
        let entry = self.entries.get_mut(key)?;
        entry.last_accessed = stamp;
        Some(&entry.value)
    }

    /// Insert or overwrite `key`.
    ///
    /// Inserting a new key into a full cache first evicts the least recently
    /// used entry. Overwriting an existing key never evicts; it refreshes the
    /// key's recency in place.
    ///
    /// Returns the evicted key, if any.
    pub fn set(&mut self, key: K, value: V) -> Option<K> {
        let stamp = self.tick();

        if let Some(entry) = self.entries.get_mut(&key) {
            entry.value = value;
            entry.last_accessed = stamp;
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity.get() {
            self.evict_oldest()
        } else {
            None
        };

        self.entries.insert(
            key,
            CacheEntry {
                value,
                last_accessed: stamp,
            },
        );
        evicted
    }

    /// Membership test. Does not touch recency.
    pub fn has(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    pub const fn capacity(&self) -> usize {
        self.capacity.get()
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict_oldest(&mut self) -> Option<K> {
        // min_by_key returns the first minimum, so ties go to insertion order.
        let oldest = self
            .entries
            .iter()
            .enumerate()
            .min_by_key(|(_, (_, entry))| entry.last_accessed)
            .map(|(index, _)| index)?;

        // shift_remove keeps the remaining entries in insertion order.
        self.entries
            .shift_remove_index(oldest)
            .map(|(key, _)| key)
    }
}
