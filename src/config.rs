//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Default box name shared by every disk cache in the process.
pub const DEFAULT_BOX_NAME: &str = "app_cache";

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum memory-tier entries, `None` for unbounded
    pub memory_max_entries: Option<usize>,
    /// Default memory-tier TTL in seconds
    pub memory_default_ttl: u64,
    /// Default disk-tier TTL in seconds
    pub disk_default_ttl: u64,
    /// Directory holding the box files
    pub disk_cache_dir: PathBuf,
    /// Name of the persistent box
    pub disk_box_name: String,
    /// Interval in seconds between disk sweeps, 0 disables the sweep
    pub disk_sweep_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MEMORY_MAX_ENTRIES` - Memory-tier capacity, 0 = unbounded (default: 500)
    /// - `MEMORY_DEFAULT_TTL` - Memory-tier TTL in seconds (default: 300)
    /// - `DISK_DEFAULT_TTL` - Disk-tier TTL in seconds (default: 86400)
    /// - `DISK_CACHE_DIR` - Directory for box files (default: ./.cache)
    /// - `DISK_BOX_NAME` - Box name (default: app_cache)
    /// - `DISK_SWEEP_INTERVAL` - Sweep frequency in seconds, 0 = off (default: 0)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let memory_max_entries = match parse_var::<usize>("MEMORY_MAX_ENTRIES") {
            Some(0) => None,
            Some(max) => Some(max),
            None => defaults.memory_max_entries,
        };

        Self {
            memory_max_entries,
            memory_default_ttl: parse_var("MEMORY_DEFAULT_TTL")
                .unwrap_or(defaults.memory_default_ttl),
            disk_default_ttl: parse_var("DISK_DEFAULT_TTL").unwrap_or(defaults.disk_default_ttl),
            disk_cache_dir: env::var("DISK_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.disk_cache_dir),
            disk_box_name: env::var("DISK_BOX_NAME")
                .ok()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(defaults.disk_box_name),
            disk_sweep_interval: parse_var("DISK_SWEEP_INTERVAL")
                .unwrap_or(defaults.disk_sweep_interval),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memory_max_entries: Some(500),
            memory_default_ttl: 300,
            disk_default_ttl: 86_400,
            disk_cache_dir: PathBuf::from(".cache"),
            disk_box_name: DEFAULT_BOX_NAME.to_string(),
            disk_sweep_interval: 0,
        }
    }
}
