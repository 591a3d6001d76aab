//! Core traits and types for the caching system.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

/// Trait for entities that can be cached.
pub trait Cacheable: Clone + Send + Sync + Serialize + DeserializeOwned {
  /// Unique, immutable identifier for this entity (e.g. employee id)
  fn cache_key(&self) -> String;

  /// Entity type name, used in log fields
  fn entity_type() -> &'static str;
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the underlying snapshot was taken
  pub cached_at: DateTime<Utc>,
}

impl<T> CacheResult<T> {
  fn new(data: T, source: CacheSource, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source,
      cached_at,
    }
  }

  /// Fresh data from the network.
  pub fn from_network(data: T) -> Self {
    Self::new(data, CacheSource::Network, Utc::now())
  }

  /// Snapshot already held in memory.
  pub fn from_memory(data: T, cached_at: DateTime<Utc>) -> Self {
    Self::new(data, CacheSource::Memory, cached_at)
  }

  /// Network unavailable, serving the locally persisted snapshot.
  pub fn offline(data: T, cached_at: DateTime<Utc>) -> Self {
    Self::new(data, CacheSource::Offline, cached_at)
  }

  /// Nothing real available, serving built-in example data.
  pub fn fallback(data: T) -> Self {
    Self::new(data, CacheSource::Fallback, Utc::now())
  }
}

/// Indicates where a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fresh data from network
  Network,
  /// Served from the in-memory snapshot without touching network or disk
  Memory,
  /// Offline mode - network unavailable, serving the local store
  Offline,
  /// Built-in example data
  Fallback,
}
