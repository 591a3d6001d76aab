//! Generic tiered cache for entity snapshots.
//!
//! This module is domain-agnostic. It:
//! - Holds the current snapshot in memory for the process lifetime
//! - Persists snapshots to a local key-value store (best effort)
//! - Resolves reads memory → network → local store → fallback
//! - Applies optimistic upserts keyed by `Cacheable::cache_key`

mod layer;
mod memory;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use memory::{MemoryCache, MemoryEntry};
pub use storage::{CacheStorage, NoopStorage, SqliteStorage, StoredSnapshot};
pub use traits::{CacheResult, CacheSource, Cacheable};
