//! Cache storage trait and SQLite implementation.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::error::StorageError;

use super::traits::Cacheable;

/// A snapshot read back from the local store.
#[derive(Debug, Clone)]
pub struct StoredSnapshot<T> {
  /// The stored entities in order
  pub entities: Vec<T>,
  /// When the snapshot was written
  pub stored_at: DateTime<Utc>,
}

/// Trait for local snapshot storage backends.
///
/// Errors are reported to the cache layer, which logs and absorbs them.
pub trait CacheStorage: Send + Sync {
  /// Replace the snapshot stored under `key`.
  fn store_snapshot<T: Cacheable>(&self, key: &str, entities: &[T]) -> Result<(), StorageError>;

  /// Read the snapshot stored under `key`, if any.
  fn load_snapshot<T: Cacheable>(&self, key: &str)
    -> Result<Option<StoredSnapshot<T>>, StorageError>;
}

/// Storage implementation that doesn't persist anything.
/// Used when persistence is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn store_snapshot<T: Cacheable>(&self, _key: &str, _entities: &[T]) -> Result<(), StorageError> {
    Ok(()) // Discard
  }

  fn load_snapshot<T: Cacheable>(
    &self,
    _key: &str,
  ) -> Result<Option<StoredSnapshot<T>>, StorageError> {
    Ok(None) // Always miss
  }
}

/// SQLite-backed key-value store. One row per key, value is a JSON array.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Open the store at `path`, or at the default location when `None`.
  pub fn open(path: Option<&Path>) -> Result<Self, StorageError> {
    let path = match path {
      Some(p) => p.to_path_buf(),
      None => Self::default_path()?,
    };

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).map_err(|e| {
        StorageError::Unavailable(format!("Failed to create store directory: {}", e))
      })?;
    }

    let conn = Connection::open(&path).map_err(|e| {
      StorageError::Unavailable(format!("Failed to open store at {}: {}", path.display(), e))
    })?;

    Self::from_connection(conn)
  }

  /// Store that lives only as long as this value. Useful for tests and kiosks.
  pub fn open_in_memory() -> Result<Self, StorageError> {
    Self::from_connection(Connection::open_in_memory()?)
  }

  fn from_connection(conn: Connection) -> Result<Self, StorageError> {
    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.run_migrations()?;
    Ok(storage)
  }

  /// Get the default store path.
  pub fn default_path() -> Result<PathBuf, StorageError> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| StorageError::Unavailable("Could not determine data directory".into()))?;

    Ok(data_dir.join("staffsync").join("store.db"))
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StorageError> {
    self
      .conn
      .lock()
      .map_err(|e| StorageError::Unavailable(format!("Lock poisoned: {}", e)))
  }

  /// Run migrations for the key-value table.
  fn run_migrations(&self) -> Result<(), StorageError> {
    let conn = self.lock()?;
    conn
      .execute_batch(STORE_SCHEMA)
      .map_err(|e| StorageError::Unavailable(format!("Failed to run store migrations: {}", e)))?;
    Ok(())
  }
}

/// Schema for the key-value table.
const STORE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL,
    digest TEXT NOT NULL,
    stored_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

fn digest_of(value: &[u8]) -> String {
  hex::encode(Sha256::digest(value))
}

impl CacheStorage for SqliteStorage {
  fn store_snapshot<T: Cacheable>(&self, key: &str, entities: &[T]) -> Result<(), StorageError> {
    let value = serde_json::to_vec(entities)
      .map_err(|e| StorageError::Unavailable(format!("Failed to serialize snapshot: {}", e)))?;
    let digest = digest_of(&value);

    let conn = self.lock()?;
    conn.execute(
      "INSERT OR REPLACE INTO kv_store (key, value, digest, stored_at)
       VALUES (?, ?, ?, datetime('now'))",
      params![key, value, digest],
    )?;

    Ok(())
  }

  fn load_snapshot<T: Cacheable>(
    &self,
    key: &str,
  ) -> Result<Option<StoredSnapshot<T>>, StorageError> {
    let conn = self.lock()?;

    let row: Option<(Vec<u8>, String, String)> = conn
      .query_row(
        "SELECT value, digest, stored_at FROM kv_store WHERE key = ?",
        params![key],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
      )
      .optional()?;

    let (value, digest, stored_at) = match row {
      Some(row) => row,
      None => return Ok(None),
    };

    if digest_of(&value) != digest {
      return Err(StorageError::Corrupt(format!("digest mismatch for key {}", key)));
    }

    let entities: Vec<T> = serde_json::from_slice(&value)
      .map_err(|e| StorageError::Corrupt(format!("Failed to parse snapshot {}: {}", key, e)))?;

    Ok(Some(StoredSnapshot {
      entities,
      stored_at: parse_datetime(&stored_at)?,
    }))
  }
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StorageError> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| StorageError::Corrupt(format!("Failed to parse datetime '{}': {}", s, e)))
}
