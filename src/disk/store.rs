//! Persistent Box Module
//!
//! The key-value store abstraction behind the disk tier, and its SQLite
//! implementation. One box is one SQLite file holding a single `entries` table.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{CacheError, Result};

const DDL: &str = "CREATE TABLE IF NOT EXISTS entries (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);";

/// Shared handle to an opened (or not yet opened) box.
///
/// Clone it into every disk cache that should share the same store.
pub type CacheBox = Arc<dyn KeyValueStore>;

// == Key Value Store ==
/// String-keyed, string-valued durable store.
///
/// Every operation on a store that has not been opened fails with
/// [`CacheError::NotOpen`]; `open` and `close` are idempotent.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Name of the box, used in logs and errors.
    fn name(&self) -> &str;

    fn is_open(&self) -> bool;

    async fn open(&self) -> Result<()>;

    async fn close(&self) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn put(&self, key: &str, value: String) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    async fn keys(&self) -> Result<Vec<String>>;

    async fn clear(&self) -> Result<()>;

    async fn len(&self) -> Result<usize>;

    /// Every stored `(key, value)` pair.
    async fn entries(&self) -> Result<Vec<(String, String)>> {
        let mut out = Vec::new();
        for key in self.keys().await? {
            if let Some(value) = self.get(&key).await? {
                out.push((key, value));
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Clone)]
enum BoxLocation {
    File(PathBuf),
    Memory,
}

// == SQLite Box ==
/// SQLite-backed [`KeyValueStore`].
///
/// Blocking SQLite calls run on tokio's blocking pool, serialized through a
/// single connection.
#[derive(Debug, Clone)]
pub struct SqliteBox {
    name: String,
    location: BoxLocation,
    conn: Arc<Mutex<Option<Connection>>>,
}

impl SqliteBox {
    /// Creates an unopened box stored at `<dir>/<name>.sqlite3`.
    pub fn new(dir: impl AsRef<Path>, name: impl Into<String>) -> Self {
        let name = name.into();
        let path = dir.as_ref().join(format!("{}.sqlite3", name));
        Self {
            name,
            location: BoxLocation::File(path),
            conn: Arc::new(Mutex::new(None)),
        }
    }

    /// Creates an unopened box that lives only as long as its connection.
    pub fn in_memory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: BoxLocation::Memory,
            conn: Arc::new(Mutex::new(None)),
        }
    }

    /// Creates an unopened box from `DISK_CACHE_DIR` / `DISK_BOX_NAME`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.disk_cache_dir, config.disk_box_name.clone())
    }

    /// Path of the backing file, `None` for in-memory boxes.
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            BoxLocation::File(path) => Some(path),
            BoxLocation::Memory => None,
        }
    }

    /// Wraps the box into a shareable handle.
    pub fn into_handle(self) -> CacheBox {
        Arc::new(self)
    }

    /// Runs `op` against the open connection on the blocking pool.
    async fn with_conn<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let name = self.name.clone();

        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| CacheError::Internal(format!("box '{}' lock poisoned", name)))?;
            match guard.as_ref() {
                Some(conn) => op(conn),
                None => Err(CacheError::NotOpen(name)),
            }
        })
        .await?
    }
}

fn open_connection(location: &BoxLocation) -> Result<Connection> {
    let conn = match location {
        BoxLocation::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            Connection::open(path)?
        }
        BoxLocation::Memory => Connection::open_in_memory()?,
    };
    conn.execute_batch(DDL)?;
    Ok(conn)
}

#[async_trait]
impl KeyValueStore for SqliteBox {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_open(&self) -> bool {
        self.conn.lock().map(|guard| guard.is_some()).unwrap_or(false)
    }

    async fn open(&self) -> Result<()> {
        let conn = Arc::clone(&self.conn);
        let name = self.name.clone();
        let location = self.location.clone();

        let opened = tokio::task::spawn_blocking(move || -> Result<bool> {
            let mut guard = conn
                .lock()
                .map_err(|_| CacheError::Internal(format!("box '{}' lock poisoned", name)))?;
            if guard.is_some() {
                return Ok(false);
            }
            *guard = Some(open_connection(&location)?);
            Ok(true)
        })
        .await??;

        if opened {
            info!(box_name = %self.name, path = ?self.path(), "Cache box opened");
        } else {
            debug!(box_name = %self.name, "Cache box already open");
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| CacheError::Internal(format!("box '{}' lock poisoned", self.name)))?;
        if guard.take().is_some() {
            info!(box_name = %self.name, "Cache box closed");
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM entries WHERE key = ?1",
                    params![key],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            Ok(value)
        })
        .await
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO entries (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM entries WHERE key = ?1", params![key])?;
            Ok(())
        })
        .await
    }

    async fn keys(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT key FROM entries ORDER BY key")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            let mut keys = Vec::new();
            for r in rows {
                keys.push(r?);
            }
            Ok(keys)
        })
        .await
    }

    async fn clear(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM entries", [])?;
            Ok(())
        })
        .await
    }

    async fn len(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }

    async fn entries(&self) -> Result<Vec<(String, String)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT key, value FROM entries ORDER BY key")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            let mut out = Vec::new();
            for r in rows {
                out.push(r?);
            }
            Ok(out)
        })
        .await
    }
}
