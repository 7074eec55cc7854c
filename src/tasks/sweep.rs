//! Disk Sweep Task
//!
//! Opt-in background task that periodically deletes expired records from a
//! box. Without it the disk tier only expires entries lazily on access.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::disk::{purge_expired_records, CacheBox, KeyValueStore};
use crate::error::CacheError;

/// Spawns a task that purges expired and undecodable records every
/// `sweep_interval_secs` seconds (minimum one second).
///
/// Sweeps against a box that is not open yet are skipped quietly. Abort the
/// returned handle to stop the task.
///
/// # Example
/// ```ignore
/// let store = SqliteBox::from_config(&config).into_handle();
/// let sweep = spawn_sweep_task(store.clone(), config.disk_sweep_interval);
/// // Later, during shutdown:
/// sweep.abort();
/// ```
pub fn spawn_sweep_task(store: CacheBox, sweep_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            box_name = store.name(),
            "Starting disk sweep task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            match purge_expired_records(store.as_ref()).await {
                Ok(0) => debug!("Disk sweep: no expired entries found"),
                Ok(removed) => info!("Disk sweep: removed {} expired entries", removed),
                Err(CacheError::NotOpen(_)) => debug!("Disk sweep: box not open, skipping"),
                Err(err) => warn!(error = %err, "Disk sweep failed"),
            }
        }
    })
}
