//! Process-lifetime holder of the current snapshot.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};

use super::traits::{CacheSource, Cacheable};

/// The snapshot held in memory and where it originally came from.
#[derive(Debug, Clone)]
pub struct MemoryEntry<T> {
  pub entities: Vec<T>,
  /// `Network`, `Offline` or `Fallback`; never `Memory`
  pub origin: CacheSource,
  pub cached_at: DateTime<Utc>,
}

/// Zero or one current snapshot. No eviction.
#[derive(Debug)]
pub struct MemoryCache<T> {
  slot: RwLock<Option<MemoryEntry<T>>>,
}

impl<T> Default for MemoryCache<T> {
  fn default() -> Self {
    Self {
      slot: RwLock::new(None),
    }
  }
}

impl<T: Cacheable> MemoryCache<T> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self) -> Option<MemoryEntry<T>> {
    self
      .slot
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }

  pub fn is_populated(&self) -> bool {
    self
      .slot
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .is_some()
  }

  pub fn origin(&self) -> Option<CacheSource> {
    self
      .slot
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .as_ref()
      .map(|e| e.origin)
  }

  /// Read-modify-write the slot under one write guard.
  pub fn update<R>(&self, f: impl FnOnce(&mut Option<MemoryEntry<T>>) -> R) -> R {
    let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
    f(&mut slot)
  }

  /// Replace the current snapshot.
  pub fn set(&self, entities: Vec<T>, origin: CacheSource, cached_at: DateTime<Utc>) {
    *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(MemoryEntry {
      entities,
      origin,
      cached_at,
    });
  }
}

/// Replace the entity with the same key in place, or append it.
pub fn upsert_by_key<T: Cacheable>(entities: &mut Vec<T>, entity: T) {
  let key = entity.cache_key();
  match entities.iter_mut().find(|e| e.cache_key() == key) {
    Some(existing) => *existing = entity,
    None => entities.push(entity),
  }
}
