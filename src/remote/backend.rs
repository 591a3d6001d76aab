//! The seam between the repository and whatever answers remote calls.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::RemoteError;
use crate::records::types::EmployeeRecord;

use super::types::{Action, Connectivity, UploadReceipt, UploadRequest};

/// A remote procedure endpoint.
///
/// Implementors provide `call`; the typed helpers are built on top of it.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
  /// Issue one call. No retries.
  async fn call(&self, action: Action, payload: Value) -> Result<Value, RemoteError>;

  /// Last observed reachability of the endpoint.
  fn connectivity(&self) -> Connectivity {
    Connectivity::Unknown
  }

  /// Fetch every employee record known to the backend.
  ///
  /// A payload that is not an array is read as an empty list.
  async fn list_employees(&self) -> Result<Vec<EmployeeRecord>, RemoteError> {
    let data = self.call(Action::ListEmployees, json!({})).await?;
    decode_records(data)
  }

  /// Push one full record. The acknowledgement body is ignored.
  async fn save_employee(&self, record: &EmployeeRecord) -> Result<(), RemoteError> {
    let payload = serde_json::to_value(record)
      .map_err(|e| RemoteError::InvalidResponse(format!("unserializable record: {}", e)))?;
    self.call(Action::SaveEmployee, payload).await?;
    Ok(())
  }

  async fn upload_document(&self, request: &UploadRequest) -> Result<UploadReceipt, RemoteError> {
    let payload = serde_json::to_value(request)
      .map_err(|e| RemoteError::InvalidResponse(format!("unserializable upload: {}", e)))?;
    let data = self.call(Action::UploadDocument, payload).await?;
    serde_json::from_value(data)
      .map_err(|e| RemoteError::InvalidResponse(format!("upload receipt: {}", e)))
  }
}

fn decode_records(data: Value) -> Result<Vec<EmployeeRecord>, RemoteError> {
  if !data.is_array() {
    return Ok(Vec::new());
  }
  serde_json::from_value(data)
    .map_err(|e| RemoteError::InvalidResponse(format!("employee list: {}", e)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_decode_records_non_array_is_empty() {
    let records = decode_records(json!({ "success": true })).unwrap();
    assert!(records.is_empty());
  }

  #[test]
  fn test_decode_records_tolerates_sheet_cells() {
    let records = decode_records(json!([
      { "id": "E1", "fullName": "Siti", "gender": "" },
      { "id": "E2", "education": { "graduationYear": 1998 } },
      { "id": "E3", "phone": 81234567 }
    ]))
    .unwrap();
    let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["E1", "E2", "E3"]);
    assert_eq!(records[1].education.graduation_year, "1998");
    assert_eq!(records[2].phone, "81234567");
  }

  #[test]
  fn test_decode_records_array() {
    let records = decode_records(json!([
      { "id": "A1", "fullName": "Siti Aminah", "nik": "3201", "status": "PNS" },
      { "id": "A2", "fullName": "Budi", "nik": "3202", "status": "Honorer" }
    ]))
    .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].full_name, "Siti Aminah");
  }

  #[test]
  fn test_decode_records_malformed_entry() {
    let result = decode_records(json!([{ "id": "A1", "fullName": ["Siti", "Aminah"] }]));
    assert!(matches!(result, Err(RemoteError::InvalidResponse(_))));
  }
}
