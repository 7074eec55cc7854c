//! Cache Module
//!
//! Provides the in-memory tier: TTL expiration with LRU eviction.

mod entry;
mod lru;
mod memory;
mod stats;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use memory::MemoryCache;
pub use stats::{MemoryStats, TierStats};
