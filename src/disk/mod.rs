//! Disk Module
//!
//! Provides the persistent tier: typed values behind a pluggable codec, stored
//! as JSON envelopes in a SQLite-backed box.

mod cache;
mod codec;
mod entry;
mod stats;
mod store;

pub use cache::DiskCache;
pub use codec::{CacheCodec, FnCodec, JsonCodec};
pub use entry::DiskCacheEntry;
pub use stats::DiskStats;
pub use store::{CacheBox, KeyValueStore, SqliteBox};

pub(crate) use cache::purge_expired_records;
