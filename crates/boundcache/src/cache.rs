//! BoundedCache: recency list guarded by an injected exclusion domain

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::error::{Error, Result};
use crate::lock::ExclusionDomain;
use crate::lru::{Touch, TtlLru};
use crate::stats::CacheStats;

/// Thread-safe cache combining LRU capacity eviction with per-entry TTL
///
/// Every operation takes `now` from the caller; the cache never reads a
/// clock. Expired entries are dropped lazily, and only from the least
/// recently touched end: an expired entry sitting behind a live one stays
/// until it reaches the head or capacity pressure pushes it out.
pub struct BoundedCache<K, V, L = RwLock<()>> {
    /// Exclusion domain, possibly shared with other caches
    lock: Arc<L>,

    /// Entries; only ever locked while holding a guard from `lock`
    state: Mutex<TtlLru<K, V>>,

    /// Cache statistics
    stats: CacheStats,

    /// Maximum number of entries
    capacity: usize,
}

impl<K, V, L> BoundedCache<K, V, L>
where
    K: Hash + Eq + Clone,
    V: Clone,
    L: ExclusionDomain,
{
    /// Create an empty cache guarded by `lock`
    ///
    /// # Arguments
    /// * `lock` - Exclusion domain; clone the `Arc` to share it between caches
    /// * `capacity` - Maximum number of entries, at least 1
    ///
    /// # Returns
    /// * `Result<BoundedCache>` - `Error::ZeroCapacity` for a zero capacity
    pub fn new(lock: Arc<L>, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }

        Ok(Self {
            lock,
            state: Mutex::new(TtlLru::new(capacity)),
            stats: CacheStats::new(),
            capacity,
        })
    }

    /// Insert `key`, or overwrite its value and TTL, marking it touched at `now`
    ///
    /// The eviction pass runs afterwards, so the new entry may push out
    /// the least recently touched one.
    pub fn insert_or_refresh(&self, now: DateTime<Utc>, key: K, value: V, ttl: Duration) {
        let _guard = self.lock.exclusive();
        let mut lru = self.state.lock();

        match lru.touch(now, key, value, ttl) {
            Touch::Inserted => self.stats.record_insert(),
            Touch::Refreshed => self.stats.record_refresh(),
        }

        self.evict(&mut lru, now);
    }

    /// Look up `key` after running the eviction pass at `now`
    ///
    /// A hit marks the entry touched at `now` and returns a clone; the
    /// cache keeps its own copy.
    pub fn lookup(&self, now: DateTime<Utc>, key: &K) -> Option<V> {
        let _guard = self.lock.exclusive();
        let mut lru = self.state.lock();

        self.evict(&mut lru, now);

        match lru.get(now, key) {
            Some(value) => {
                self.stats.record_hit();
                Some(value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Remove `key` after running the eviction pass at `now`
    ///
    /// Returns `false` when the key was absent, including when the pass
    /// itself just evicted it.
    pub fn remove(&self, now: DateTime<Utc>, key: &K) -> bool {
        let _guard = self.lock.exclusive();
        let mut lru = self.state.lock();

        self.evict(&mut lru, now);

        let removed = lru.remove(key).is_some();
        if removed {
            self.stats.record_removal();
        }
        removed
    }

    /// Raw entry count; does not run the eviction pass, so entries that
    /// have already expired are still counted
    pub fn size(&self) -> usize {
        let _guard = self.lock.shared();
        self.state.lock().len()
    }

    /// Get cache capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    fn evict(&self, lru: &mut TtlLru<K, V>, now: DateTime<Utc>) {
        let evicted = lru.evict(now);
        if evicted.total() == 0 {
            return;
        }

        self.stats.record_evictions(evicted.capacity, evicted.expired);
        debug!(
            capacity = evicted.capacity,
            expired = evicted.expired,
            remaining = lru.len(),
            limit = lru.capacity(),
            "cache eviction pass"
        );
    }
}
