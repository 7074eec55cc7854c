//! Disk Cache Module
//!
//! Typed, TTL-aware cache over a persistent box. Every fault inside this
//! module is logged and folded into a miss or a no-op before it reaches the
//! caller.

use std::fmt::Display;
use std::marker::PhantomData;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use crate::config::Config;
use crate::disk::{CacheBox, CacheCodec, DiskCacheEntry, DiskStats, JsonCodec, KeyValueStore};
use crate::error::{CacheError, Result};

// == Disk Cache ==
/// Slower, durable cache tier with lazy per-entry expiry.
///
/// Instances built from clones of one [`CacheBox`] share the same key space.
/// Keys are stored as their `Display` form, so distinct keys must render
/// distinctly.
pub struct DiskCache<K, V, C = JsonCodec> {
    store: CacheBox,
    codec: C,
    default_ttl: Duration,
    _marker: PhantomData<fn(K) -> V>,
}

impl<K, V> DiskCache<K, V, JsonCodec>
where
    K: Display,
    JsonCodec: CacheCodec<V>,
{
    /// Creates a disk cache storing values through serde.
    pub fn new(store: CacheBox, default_ttl: Duration) -> Self {
        Self::with_codec(store, JsonCodec, default_ttl)
    }

    /// Creates a disk cache using `DISK_DEFAULT_TTL`.
    pub fn from_config(store: CacheBox, config: &Config) -> Self {
        Self::new(store, Duration::from_secs(config.disk_default_ttl))
    }
}

impl<K, V, C> DiskCache<K, V, C>
where
    K: Display,
    C: CacheCodec<V>,
{
    /// Creates a disk cache with a caller-supplied codec.
    pub fn with_codec(store: CacheBox, codec: C, default_ttl: Duration) -> Self {
        Self {
            store,
            codec,
            default_ttl,
            _marker: PhantomData,
        }
    }

    // == Initialize ==
    /// Opens the underlying box. Safe to call repeatedly.
    ///
    /// Until this succeeds every other operation behaves as a miss or no-op.
    pub async fn initialize(&self) {
        if let Err(err) = self.store.open().await {
            warn!(box_name = self.store.name(), error = %err, "Failed to open cache box");
        }
    }

    /// Whether the underlying box is open.
    pub fn is_ready(&self) -> bool {
        self.store.is_open()
    }

    // == Get ==
    /// Returns the cached value, or `None` on miss, expiry, or any fault.
    ///
    /// An expired record is deleted from the box when discovered.
    pub async fn get(&self, key: &K) -> Option<V> {
        let key = key.to_string();
        match self.try_get(&key).await {
            Ok(value) => value,
            Err(err) => {
                self.log_fault("get", &key, &err);
                None
            }
        }
    }

    // == Put ==
    /// Stores a value under the default TTL.
    pub async fn put(&self, key: &K, value: &V) {
        self.put_with_ttl(key, value, self.default_ttl).await;
    }

    /// Stores a value with an explicit TTL. Failures leave the previous
    /// record (or its absence) untouched.
    pub async fn put_with_ttl(&self, key: &K, value: &V, ttl: Duration) {
        let key = key.to_string();
        if let Err(err) = self.try_put(&key, value, ttl).await {
            self.log_fault("put", &key, &err);
        }
    }

    // == Remove ==
    pub async fn remove(&self, key: &K) {
        let key = key.to_string();
        if let Err(err) = self.store.delete(&key).await {
            self.log_fault("remove", &key, &err);
        }
    }

    // == Clear ==
    /// Deletes every record in the box, including those written by other
    /// disk caches sharing it.
    pub async fn clear(&self) {
        if let Err(err) = self.store.clear().await {
            self.log_fault("clear", "*", &err);
        }
    }

    // == Contains Key ==
    /// Same lookup as `get` without decoding the value itself.
    pub async fn contains_key(&self, key: &K) -> bool {
        let key = key.to_string();
        match self.lookup(&key).await {
            Ok(entry) => entry.is_some(),
            Err(err) => {
                self.log_fault("contains_key", &key, &err);
                false
            }
        }
    }

    // == Stats ==
    /// Classifies every record without modifying the box.
    pub async fn stats(&self) -> DiskStats {
        match collect_stats(self.store.as_ref()).await {
            Ok(stats) => stats,
            Err(err) => {
                self.log_fault("stats", "*", &err);
                DiskStats::default()
            }
        }
    }

    // == Purge Expired ==
    /// Deletes every expired or undecodable record, returning how many went.
    pub async fn purge_expired(&self) -> usize {
        match purge_expired_records(self.store.as_ref()).await {
            Ok(removed) => removed,
            Err(err) => {
                self.log_fault("purge_expired", "*", &err);
                0
            }
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn store(&self) -> &CacheBox {
        &self.store
    }

    /// Fetches the live envelope for `key`, deleting it if it has expired.
    async fn lookup(&self, key: &str) -> Result<Option<DiskCacheEntry>> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };

        let entry = DiskCacheEntry::decode(&raw)?;
        if entry.is_expired() {
            debug!(key, "Disk cache entry expired");
            if let Err(err) = self.store.delete(key).await {
                self.log_fault("expire", key, &err);
            }
            return Ok(None);
        }

        Ok(Some(entry))
    }

    async fn try_get(&self, key: &str) -> Result<Option<V>> {
        match self.lookup(key).await? {
            Some(entry) => Ok(Some(self.codec.decode(entry.data)?)),
            None => Ok(None),
        }
    }

    async fn try_put(&self, key: &str, value: &V, ttl: Duration) -> Result<()> {
        let data = self.codec.encode(value)?;
        let raw = DiskCacheEntry::new(data, ttl).encode()?;
        self.store.put(key, raw).await
    }

    fn log_fault(&self, op: &str, key: &str, err: &CacheError) {
        match err {
            CacheError::NotOpen(_) => {
                debug!(op, key, box_name = self.store.name(), "Cache box not open, skipping")
            }
            _ => warn!(op, key, box_name = self.store.name(), error = %err, "Disk cache fault"),
        }
    }
}

/// Counts valid and expired records; undecodable ones count as expired.
async fn collect_stats(store: &dyn KeyValueStore) -> Result<DiskStats> {
    let now = Utc::now();
    let mut stats = DiskStats::default();

    for (_, raw) in store.entries().await? {
        stats.size += 1;
        match DiskCacheEntry::decode(&raw) {
            Ok(entry) if !entry.is_expired_at(now) => stats.valid_count += 1,
            _ => stats.expired_count += 1,
        }
    }

    Ok(stats)
}

/// Deletes every expired or undecodable record in `store`.
pub(crate) async fn purge_expired_records(store: &dyn KeyValueStore) -> Result<usize> {
    let now = Utc::now();
    let mut removed = 0;

    for (key, raw) in store.entries().await? {
        let stale = DiskCacheEntry::decode(&raw)
            .map(|entry| entry.is_expired_at(now))
            .unwrap_or(true);
        if stale {
            store.delete(&key).await?;
            removed += 1;
        }
    }

    Ok(removed)
}
