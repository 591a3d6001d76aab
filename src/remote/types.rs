//! Wire types for the remote procedure endpoint.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RemoteError;

/// Actions understood by the remote endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  ListEmployees,
  SaveEmployee,
  UploadDocument,
}

impl Action {
  pub fn as_str(&self) -> &'static str {
    match self {
      Action::ListEmployees => "listEmployees",
      Action::SaveEmployee => "saveEmployee",
      Action::UploadDocument => "uploadDocument",
    }
  }
}

impl fmt::Display for Action {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Unwrap the `{ success, data?, message? }` envelope.
///
/// Returns `data` when present, otherwise the whole envelope.
pub fn unwrap_envelope(body: Value) -> Result<Value, RemoteError> {
  let success = body
    .get("success")
    .and_then(Value::as_bool)
    .ok_or_else(|| RemoteError::InvalidResponse("missing success flag".to_string()))?;

  if !success {
    let message = body
      .get("message")
      .and_then(Value::as_str)
      .unwrap_or("request failed without a message")
      .to_string();
    return Err(RemoteError::RemoteRejected(message));
  }

  match body.get("data") {
    Some(data) if !data.is_null() => Ok(data.clone()),
    _ => Ok(body),
  }
}

/// Payload for `uploadDocument`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
  pub employee_id: String,
  pub doc_type: String,
  pub file_name: String,
  pub mime_type: String,
  pub base64_data: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadReceipt {
  pub url: String,
}

/// Reachability of the remote endpoint, as last observed.
///
/// This is not "did the last call succeed": a call the endpoint answered with
/// a refusal or garbage still leaves it `Online`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
  /// No call has finished yet
  Unknown,
  /// The last call got an answer from the endpoint
  Online,
  /// The last call never reached the endpoint (timeout, DNS, refused, HTTP error)
  Offline,
}

impl Connectivity {
  fn from_u8(v: u8) -> Self {
    match v {
      1 => Connectivity::Online,
      2 => Connectivity::Offline,
      _ => Connectivity::Unknown,
    }
  }

  fn as_u8(self) -> u8 {
    match self {
      Connectivity::Unknown => 0,
      Connectivity::Online => 1,
      Connectivity::Offline => 2,
    }
  }
}

/// Shared connectivity flag. Clones observe the same state.
#[derive(Debug, Clone)]
pub struct ConnectivityFlag(Arc<AtomicU8>);

impl Default for ConnectivityFlag {
  fn default() -> Self {
    Self(Arc::new(AtomicU8::new(Connectivity::Unknown.as_u8())))
  }
}

impl ConnectivityFlag {
  pub fn get(&self) -> Connectivity {
    Connectivity::from_u8(self.0.load(Ordering::Relaxed))
  }

  pub fn set(&self, state: Connectivity) {
    self.0.store(state.as_u8(), Ordering::Relaxed);
  }

  /// Record the outcome of a finished call.
  ///
  /// Reads the outcome as reachability, not success. `RemoteRejected` and
  /// `InvalidResponse` mean the endpoint answered, so they set `Online` even
  /// though the call failed. Only transport failures and timeouts set
  /// `Offline`. UI code that needs the call's own result should look at the
  /// `Result`, or at `SaveOutcome` for saves.
  pub fn record<T>(&self, result: &Result<T, RemoteError>) {
    let state = match result {
      Ok(_) => Connectivity::Online,
      Err(e) if e.reached_remote() => Connectivity::Online,
      Err(_) => Connectivity::Offline,
    };
    self.set(state);
  }
}
