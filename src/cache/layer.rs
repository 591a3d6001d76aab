//! Cache layer that orchestrates the memory cache, local store and network.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::memory::{upsert_by_key, MemoryCache, MemoryEntry};
use super::storage::{CacheStorage, StoredSnapshot};
use super::traits::{CacheResult, CacheSource, Cacheable};

/// Cache layer that manages caching logic and network fetching.
///
/// This layer sits between the repository and the network client. Reads are
/// resolved memory → network → local store → fallback and never fail.
/// Storage failures are logged and otherwise ignored, so the layer keeps
/// working memory-only when persistence is broken or disabled.
pub struct CacheLayer<T: Cacheable, S: CacheStorage> {
  storage: Arc<S>,
  memory: Arc<MemoryCache<T>>,
  /// Key the snapshot is persisted under
  key: String,
}

impl<T: Cacheable, S: CacheStorage> CacheLayer<T, S> {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: S, key: impl Into<String>) -> Self {
    Self {
      storage: Arc::new(storage),
      memory: Arc::new(MemoryCache::new()),
      key: key.into(),
    }
  }

  pub fn storage(&self) -> &S {
    &self.storage
  }

  /// Whether a snapshot is already held in memory.
  pub fn is_warm(&self) -> bool {
    self.memory.is_populated()
  }

  /// Where the in-memory snapshot originally came from.
  pub fn memory_origin(&self) -> Option<CacheSource> {
    self.memory.origin()
  }

  /// Resolve the current snapshot.
  ///
  /// 1. Memory hit - return immediately, no network or disk
  /// 2. Fetch from network - on success populate memory and the local store
  /// 3. On network failure, load the local store (offline mode)
  /// 4. Nothing stored - serve `fallback()`, kept in memory but never persisted
  pub async fn fetch_snapshot<F, Fut, E, D>(&self, fetcher: F, fallback: D) -> CacheResult<Vec<T>>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
    E: Display,
    D: FnOnce() -> Vec<T>,
  {
    if let Some(entry) = self.memory.get() {
      debug!(entity = T::entity_type(), origin = ?entry.origin, "Memory cache hit");
      return CacheResult::from_memory(entry.entities, entry.cached_at);
    }

    match fetcher().await {
      Ok(data) => {
        info!(entity = T::entity_type(), count = data.len(), "Fetched snapshot from network");
        let result = CacheResult::from_network(data);
        self
          .memory
          .set(result.data.clone(), CacheSource::Network, result.cached_at);
        self.persist(&result.data);
        result
      }
      Err(e) => {
        warn!(entity = T::entity_type(), error = %e, "Network fetch failed, going offline");
        match self.load_persisted() {
          Some(stored) => {
            info!(entity = T::entity_type(), count = stored.entities.len(), "Serving local store");
            self
              .memory
              .set(stored.entities.clone(), CacheSource::Offline, stored.stored_at);
            CacheResult::offline(stored.entities, stored.stored_at)
          }
          None => {
            warn!(entity = T::entity_type(), "No local data, serving fallback dataset");
            let result = CacheResult::fallback(fallback());
            self
              .memory
              .set(result.data.clone(), CacheSource::Fallback, result.cached_at);
            result
          }
        }
      }
    }
  }

  /// Optimistically insert or replace one entity in memory and the local store.
  ///
  /// A fallback snapshot is discarded rather than persisted: the first real
  /// write starts a fresh local snapshot. With memory cold the local store is
  /// the base. Returns the new snapshot.
  pub fn upsert(&self, entity: T) -> Vec<T> {
    self.memory.update(|slot| {
      let (mut entities, origin) = match slot.take() {
        Some(entry) if entry.origin == CacheSource::Fallback => {
          debug!(entity = T::entity_type(), "Replacing fallback snapshot with local data");
          (Vec::new(), CacheSource::Offline)
        }
        Some(entry) if entry.origin == CacheSource::Network => (entry.entities, CacheSource::Network),
        Some(entry) => (entry.entities, CacheSource::Offline),
        None => (
          self
            .load_persisted()
            .map(|stored| stored.entities)
            .unwrap_or_default(),
          CacheSource::Offline,
        ),
      };

      upsert_by_key(&mut entities, entity);
      // Store and memory change under the same guard
      self.persist(&entities);
      *slot = Some(MemoryEntry {
        entities: entities.clone(),
        origin,
        cached_at: Utc::now(),
      });
      entities
    })
  }

  /// Lay a network snapshot under local writes made while memory was cold.
  ///
  /// The network copy wins for keys it knows, except `pending`, which is
  /// re-applied on top. Entities only known locally are kept. When the fetch
  /// fails memory is left untouched. Returns whether the network answered.
  pub async fn refresh_with<F, Fut, E>(&self, fetcher: F, pending: &T) -> bool
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
    E: Display,
  {
    let fetched = match fetcher().await {
      Ok(data) => data,
      Err(e) => {
        warn!(entity = T::entity_type(), error = %e, "Refresh failed, keeping local snapshot");
        return false;
      }
    };

    self.memory.update(|slot| {
      let mut entities = fetched;
      let local = match slot.take() {
        Some(entry) if entry.origin != CacheSource::Fallback => entry.entities,
        _ => Vec::new(),
      };
      for entity in local {
        let key = entity.cache_key();
        if !entities.iter().any(|e| e.cache_key() == key) {
          entities.push(entity);
        }
      }
      upsert_by_key(&mut entities, pending.clone());

      info!(entity = T::entity_type(), count = entities.len(), "Merged network snapshot under local writes");
      self.persist(&entities);
      *slot = Some(MemoryEntry {
        entities,
        origin: CacheSource::Network,
        cached_at: Utc::now(),
      });
    });
    true
  }

  /// Best-effort write to the local store.
  fn persist(&self, entities: &[T]) {
    if let Err(e) = self.storage.store_snapshot(&self.key, entities) {
      warn!(key = %self.key, error = %e, "Failed to persist snapshot, continuing memory-only");
    }
  }

  /// Best-effort read from the local store; any failure reads as absent.
  fn load_persisted(&self) -> Option<StoredSnapshot<T>> {
    match self.storage.load_snapshot(&self.key) {
      Ok(stored) => stored,
      Err(e) => {
        warn!(key = %self.key, error = %e, "Failed to load local store, treating as empty");
        None
      }
    }
  }
}

impl<T: Cacheable, S: CacheStorage> Clone for CacheLayer<T, S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      memory: Arc::clone(&self.memory),
      key: self.key.clone(),
    }
  }
}
