//! Offline-tolerant client for a school's employee records.
//!
//! The crate reconciles an in-memory and on-device cache of employee records
//! against a best-effort remote endpoint. Reads walk a fixed chain of sources
//! (memory, remote, local store, bundled fallback) and never fail; writes land
//! locally first and are then pushed to the remote once.
//!
//! UI code talks to [`RecordRepository`] only.

pub mod cache;
pub mod config;
pub mod error;
pub mod records;
pub mod remote;

pub use records::RecordRepository;
