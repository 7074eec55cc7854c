//! Tiered Cache - A two-tier client-side cache
//!
//! Provides an LRU/TTL memory tier and a persistent, TTL-aware disk tier
//! backed by SQLite, usable on their own or composed as a read-through cache.

pub mod cache;
pub mod config;
pub mod disk;
pub mod error;
pub mod tasks;
pub mod tiered;

pub use cache::MemoryCache;
pub use config::Config;
pub use disk::{CacheBox, CacheCodec, DiskCache, JsonCodec, KeyValueStore, SqliteBox};
pub use tasks::spawn_sweep_task;
pub use tiered::TieredCache;
