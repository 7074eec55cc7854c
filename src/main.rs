//! Tiered Cache - maintenance tool for persistent cache boxes
//!
//! Inspects and cleans the disk tier of a client cache from the command line.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiered_cache::{Config, DiskCache, KeyValueStore, SqliteBox};

/// Inspect and maintain a persistent cache box.
#[derive(Debug, Parser)]
#[command(name = "tiered_cache", version)]
struct Cli {
    /// Directory holding box files (overrides DISK_CACHE_DIR)
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Box to operate on (overrides DISK_BOX_NAME)
    #[arg(long = "box")]
    box_name: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print size, valid and expired counts
    Stats,
    /// Delete expired and undecodable records
    Purge,
    /// Delete every record in the box
    Clear,
    /// Print the cached data stored under a key
    Get { key: String },
    /// Delete one key
    Remove { key: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tiered_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(dir) = cli.dir {
        config.disk_cache_dir = dir;
    }
    if let Some(name) = cli.box_name {
        config.disk_box_name = name;
    }

    let store = SqliteBox::from_config(&config);
    store
        .open()
        .await
        .with_context(|| format!("failed to open cache box at {:?}", store.path()))?;
    let store = store.into_handle();

    let cache: DiskCache<String, Value> = DiskCache::new(
        store.clone(),
        Duration::from_secs(config.disk_default_ttl),
    );

    let output = match cli.command {
        Command::Stats => serde_json::to_value(cache.stats().await)?,
        Command::Purge => {
            let removed = cache.purge_expired().await;
            info!("Purged {} records", removed);
            json!({ "removed": removed })
        }
        Command::Clear => {
            cache.clear().await;
            json!({ "cleared": true })
        }
        Command::Get { key } => {
            let data = cache.get(&key).await;
            json!({ "key": key, "data": data })
        }
        Command::Remove { key } => {
            cache.remove(&key).await;
            json!({ "removed": key })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    store.close().await?;
    Ok(())
}
