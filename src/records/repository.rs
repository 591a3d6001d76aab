//! Record repository: the read/write surface UI code depends on.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use tracing::{info, warn};

use crate::cache::{CacheLayer, CacheResult, CacheStorage, CacheSource};
use crate::error::RemoteError;
use crate::remote::{Connectivity, RemoteBackend, UploadRequest};

use super::cache::SNAPSHOT_KEY;
use super::directory::{build_directory, AdminIdentity, LoginEntry};
use super::documents::{DocumentItem, MAX_UPLOAD_BYTES};
use super::fallback::fallback_records;
use super::stats::DashboardStats;
use super::types::{EmployeeRecord, VerificationStatus};

/// How a save ended. Both variants mean the record is saved locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
  /// The remote accepted the record
  Synced { id: String },
  /// The remote could not be reached or refused; other devices won't see it yet
  LocalOnly { id: String, reason: String },
}

impl SaveOutcome {
  pub fn id(&self) -> &str {
    match self {
      SaveOutcome::Synced { id } | SaveOutcome::LocalOnly { id, .. } => id,
    }
  }

  pub fn is_local_only(&self) -> bool {
    matches!(self, SaveOutcome::LocalOnly { .. })
  }

  /// Message for the transient "saved on this device only" warning.
  pub fn warning(&self) -> Option<String> {
    match self {
      SaveOutcome::Synced { .. } => None,
      SaveOutcome::LocalOnly { reason, .. } => Some(format!(
        "Saved on this device only; the server could not be updated ({})",
        reason
      )),
    }
  }
}

/// Employee records with transparent caching and offline support.
///
/// Construct one per session and clone it into consumers; clones share the
/// same memory cache.
pub struct RecordRepository<B: RemoteBackend, S: CacheStorage> {
  remote: Arc<B>,
  cache: CacheLayer<EmployeeRecord, S>,
  admin: AdminIdentity,
}

impl<B: RemoteBackend, S: CacheStorage> Clone for RecordRepository<B, S> {
  fn clone(&self) -> Self {
    Self {
      remote: Arc::clone(&self.remote),
      cache: self.cache.clone(),
      admin: self.admin.clone(),
    }
  }
}

impl<B: RemoteBackend, S: CacheStorage> RecordRepository<B, S> {
  pub fn new(remote: B, storage: S, admin: AdminIdentity) -> Self {
    Self {
      remote: Arc::new(remote),
      cache: CacheLayer::new(storage, SNAPSHOT_KEY),
      admin,
    }
  }

  pub fn cache(&self) -> &CacheLayer<EmployeeRecord, S> {
    &self.cache
  }

  /// Last observed reachability of the remote, for an offline indicator.
  pub fn connectivity(&self) -> Connectivity {
    self.remote.connectivity()
  }

  /// All records, along with where they were served from. Never fails.
  pub async fn list_all_resolved(&self) -> CacheResult<Vec<EmployeeRecord>> {
    self
      .cache
      .fetch_snapshot(|| self.remote.list_employees(), fallback_records)
      .await
  }

  /// All records. Never fails; may be the fallback dataset.
  pub async fn list_all(&self) -> Vec<EmployeeRecord> {
    self.list_all_resolved().await.data
  }

  pub async fn get_by_id(&self, id: &str) -> Option<EmployeeRecord> {
    self.list_all().await.into_iter().find(|r| r.id == id)
  }

  /// Save a full record, replacing any record with the same id.
  ///
  /// The record lands in memory and the local store before any remote call
  /// starts, so it is visible to the next read whatever the remote does. A
  /// remote failure downgrades the outcome to `LocalOnly`, never an error.
  pub async fn save(&self, mut record: EmployeeRecord) -> SaveOutcome {
    if record.id.trim().is_empty() {
      record.id = record.derive_id(Utc::now());
      info!(id = %record.id, "Assigned id to new record");
    }

    let was_warm = self.cache.is_warm();
    self.cache.upsert(record.clone());

    // A cold save starts from the local store; pull the rest of the snapshot
    // while the record is being pushed
    let pushed = if was_warm {
      self.remote.save_employee(&record).await
    } else {
      let (_, pushed) = tokio::join!(
        self
          .cache
          .refresh_with(|| self.remote.list_employees(), &record),
        self.remote.save_employee(&record),
      );
      pushed
    };

    match pushed {
      Ok(()) => {
        info!(id = %record.id, "Record saved and synced");
        SaveOutcome::Synced { id: record.id }
      }
      Err(e) => {
        warn!(id = %record.id, error = %e, "Record saved locally only");
        SaveOutcome::LocalOnly {
          id: record.id,
          reason: e.to_string(),
        }
      }
    }
  }

  /// Administrator first, then one entry per record.
  pub async fn get_login_directory(&self) -> Vec<LoginEntry> {
    build_directory(&self.admin, &self.list_all().await)
  }

  /// Record an admin verification decision. `None` when the id is unknown.
  pub async fn verify(
    &self,
    id: &str,
    status: VerificationStatus,
    note: &str,
  ) -> Option<SaveOutcome> {
    let mut record = self.get_by_id(id).await?;
    record.set_verification(status, note);
    Some(self.save(record).await)
  }

  pub async fn stats(&self) -> DashboardStats {
    DashboardStats::from_records(&self.list_all().await)
  }

  /// Whether the last read was answered by the bundled example data.
  pub fn is_serving_fallback(&self) -> bool {
    self.cache.memory_origin() == Some(CacheSource::Fallback)
  }

  /// Upload one document file for an employee.
  ///
  /// Uploads have no local fallback: failures are returned to the caller.
  pub async fn upload_document(
    &self,
    employee_id: &str,
    doc_type: &str,
    file_name: &str,
    content: &[u8],
  ) -> Result<DocumentItem, RemoteError> {
    if content.len() > MAX_UPLOAD_BYTES {
      return Err(RemoteError::PayloadTooLarge {
        size: content.len(),
        limit: MAX_UPLOAD_BYTES,
      });
    }

    let request = UploadRequest {
      employee_id: employee_id.to_string(),
      doc_type: doc_type.to_string(),
      file_name: file_name.to_string(),
      mime_type: mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string(),
      base64_data: STANDARD.encode(content),
    };

    let receipt = self.remote.upload_document(&request).await?;
    info!(employee = employee_id, doc_type, url = %receipt.url, "Document uploaded");
    Ok(DocumentItem::uploaded(
      doc_type,
      file_name,
      receipt.url,
      content.len(),
    ))
  }
}
