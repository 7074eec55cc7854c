//! Memory Cache Module
//!
//! Capacity-bounded in-process cache combining HashMap storage with LRU
//! tracking and lazy TTL expiration.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheEntry, LruTracker, MemoryStats};
use crate::config::Config;

// == Memory Cache ==
/// Volatile cache with per-entry TTL and least-recently-used eviction.
///
/// Expired entries are not swept in the background; they are dropped the next
/// time `get` or `contains_key` runs into them, or when capacity pressure
/// evicts them. The cache performs no locking: wrap it in a mutex to share it.
#[derive(Debug)]
pub struct MemoryCache<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// LRU access tracker, holds exactly the keys of `entries`
    lru: LruTracker<K>,
    /// TTL applied by `put`
    default_ttl: Duration,
    /// Maximum number of entries, `None` for unbounded
    max_size: Option<usize>,
}

impl<K, V> MemoryCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructors ==
    /// Creates an unbounded cache.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            default_ttl,
            max_size: None,
        }
    }

    /// Creates a cache holding at most `max_size` entries.
    pub fn with_max_size(max_size: usize, default_ttl: Duration) -> Self {
        Self {
            max_size: Some(max_size),
            ..Self::new(default_ttl)
        }
    }

    /// Creates a cache sized by `MEMORY_MAX_ENTRIES` / `MEMORY_DEFAULT_TTL`.
    pub fn from_config(config: &Config) -> Self {
        let ttl = Duration::from_secs(config.memory_default_ttl);
        match config.memory_max_entries {
            Some(max) => Self::with_max_size(max, ttl),
            None => Self::new(ttl),
        }
    }

    // == Get ==
    /// Retrieves a value by key and marks it most recently used.
    ///
    /// An expired entry is removed and reported as absent.
    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let (stored_key, entry) = self.entries.get_key_value(key)?;

        if entry.is_expired() {
            self.remove(key);
            return None;
        }

        let value = entry.value.clone();
        let stored_key = stored_key.clone();
        self.lru.touch(&stored_key);
        Some(value)
    }

    // == Put ==
    /// Stores a value under the default TTL.
    pub fn put(&mut self, key: K, value: V) {
        self.put_with_ttl(key, value, self.default_ttl);
    }

    /// Stores a value with an explicit TTL.
    ///
    /// Overwriting an existing key refreshes it (new value, new TTL, most
    /// recently used) and never evicts. Inserting a new key into a full cache
    /// evicts the least recently used entry first.
    pub fn put_with_ttl(&mut self, key: K, value: V, ttl: Duration) {
        let is_overwrite = self.entries.contains_key(&key);

        if let Some(max_size) = self.max_size {
            if max_size == 0 {
                return;
            }
            if !is_overwrite && self.entries.len() >= max_size {
                if let Some(evicted_key) = self.lru.evict_oldest() {
                    self.entries.remove(&evicted_key);
                }
            }
        }

        self.entries.insert(key.clone(), CacheEntry::new(value, ttl));
        self.lru.touch(&key);
    }

    // == Remove ==
    /// Removes an entry by key. Missing keys are ignored.
    pub fn remove<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        if self.entries.remove(key).is_some() {
            self.lru.remove(key);
        }
    }

    // == Clear ==
    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
    }

    // == Contains Key ==
    /// Checks for a live entry without changing recency.
    ///
    /// Like `get`, an expired entry is removed on discovery.
    pub fn contains_key<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.remove(key);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    // == Stats ==
    /// Returns a snapshot of size and expiry counts. Nothing is purged.
    pub fn stats(&self) -> MemoryStats {
        let now = current_timestamp_ms();
        let expired_count = self
            .entries
            .values()
            .filter(|entry| entry.is_expired_at(now))
            .count();

        MemoryStats {
            size: self.entries.len(),
            max_size: self.max_size,
            expired_count,
            valid_count: self.entries.len() - expired_count,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> Option<usize> {
        self.max_size
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}
