//! Tiered Cache Module
//!
//! Read-through / write-through composition of the memory and disk tiers in
//! front of a caller-supplied origin fetch.

use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;

use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::{MemoryCache, MemoryStats, TierStats};
use crate::disk::{CacheCodec, DiskCache, DiskStats, JsonCodec};

// == Tiered Cache ==
/// Memory tier over disk tier over origin.
///
/// Reads check memory, then disk (promoting hits into memory), then the
/// origin. Writes go to disk first, then memory. Neither tier's lock is held
/// across disk or origin I/O.
pub struct TieredCache<K, V, C = JsonCodec> {
    memory: Mutex<MemoryCache<K, V>>,
    disk: DiskCache<K, V, C>,
    stats: Mutex<TierStats>,
}

impl<K, V, C> TieredCache<K, V, C>
where
    K: Eq + Hash + Clone + Display,
    V: Clone,
    C: CacheCodec<V>,
{
    pub fn new(memory: MemoryCache<K, V>, disk: DiskCache<K, V, C>) -> Self {
        Self {
            memory: Mutex::new(memory),
            disk,
            stats: Mutex::new(TierStats::new()),
        }
    }

    // == Get ==
    /// Looks the key up in memory, then on disk. Never calls the origin.
    pub async fn get(&self, key: &K) -> Option<V> {
        let cached = self.memory.lock().await.get(key);
        if let Some(value) = cached {
            self.stats.lock().await.record_memory_hit();
            return Some(value);
        }

        match self.disk.get(key).await {
            Some(value) => {
                self.memory.lock().await.put(key.clone(), value.clone());
                self.stats.lock().await.record_disk_hit();
                debug!(%key, "Promoted disk hit into memory");
                Some(value)
            }
            None => {
                self.stats.lock().await.record_miss();
                None
            }
        }
    }

    // == Get Or Fetch ==
    /// Returns the cached value, or fetches it from the origin and writes it
    /// through both tiers.
    ///
    /// Origin errors are returned unchanged and nothing is cached for them.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            return Ok(value);
        }

        self.stats.lock().await.record_origin_fetch();
        debug!(%key, "Cache miss, fetching from origin");
        let value = fetch().await?;

        self.put(key, value.clone()).await;
        Ok(value)
    }

    // == Put ==
    /// Writes through to disk, then memory.
    pub async fn put(&self, key: K, value: V) {
        self.disk.put(&key, &value).await;
        self.memory.lock().await.put(key, value);
    }

    // == Invalidate ==
    /// Removes the key from both tiers.
    pub async fn invalidate(&self, key: &K) {
        self.memory.lock().await.remove(key);
        self.disk.remove(key).await;
    }

    // == Clear ==
    /// Empties both tiers. The disk clear covers the whole shared box.
    pub async fn clear(&self) {
        self.memory.lock().await.clear();
        self.disk.clear().await;
    }

    pub async fn stats(&self) -> TierStats {
        self.stats.lock().await.clone()
    }

    pub async fn memory_stats(&self) -> MemoryStats {
        self.memory.lock().await.stats()
    }

    pub async fn disk_stats(&self) -> DiskStats {
        self.disk.stats().await
    }

    pub fn disk(&self) -> &DiskCache<K, V, C> {
        &self.disk
    }
}
