//! Client for the remote procedure endpoint backing the employee sheet.
//!
//! Every call is a single POST to `<endpoint>?action=<name>` bounded by a
//! fixed timeout. Failures come back as [`RemoteError`](crate::error::RemoteError)
//! and are never retried here.

pub mod backend;
pub mod client;
pub mod types;

pub use backend::RemoteBackend;
pub use client::RemoteClient;
pub use types::{Action, Connectivity, UploadReceipt, UploadRequest};
