//! Cache Statistics Module
//!
//! Snapshot statistics for the memory tier and hit counters for the tiered
//! read-through path.

use serde::Serialize;

// == Memory Stats ==
/// Point-in-time view of a memory cache, computed without purging anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemoryStats {
    /// Number of entries currently held (expired ones included)
    pub size: usize,
    /// Configured capacity, `None` when unbounded
    pub max_size: Option<usize>,
    /// Entries whose TTL has elapsed but have not been purged yet
    pub expired_count: usize,
    /// Entries still within their TTL
    pub valid_count: usize,
}

// == Tier Stats ==
/// Where reads through a tiered cache were answered from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TierStats {
    /// Reads answered by the memory tier
    pub memory_hits: u64,
    /// Reads answered by the disk tier
    pub disk_hits: u64,
    /// Reads that neither tier could answer
    pub misses: u64,
    /// Misses that went on to call the origin
    pub origin_fetches: u64,
}

impl TierStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Fraction of reads served by either tier.
    ///
    /// Returns 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.memory_hits + self.disk_hits;
        let total = hits + self.misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    pub fn record_memory_hit(&mut self) {
        self.memory_hits += 1;
    }

    pub fn record_disk_hit(&mut self) {
        self.disk_hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_origin_fetch(&mut self) {
        self.origin_fetches += 1;
    }
}
