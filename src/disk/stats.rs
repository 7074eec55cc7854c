//! Disk Statistics Module

use serde::Serialize;

// == Disk Stats ==
/// Point-in-time classification of every record in a box.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiskStats {
    /// Number of stored records
    pub size: usize,
    /// Records that decode and are within their TTL
    pub valid_count: usize,
    /// Records past their TTL, plus records that no longer decode
    pub expired_count: usize,
}
