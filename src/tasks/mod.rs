//! Background Tasks Module
//!
//! # Tasks
//! - Disk sweep: removes expired disk-tier records at a configured interval

mod sweep;

pub use sweep::spawn_sweep_task;
