use std::time::Duration;

use thiserror::Error;

/// Maximum length for response bodies quoted in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Failure of a single remote call.
#[derive(Error, Debug)]
pub enum RemoteError {
  #[error("Request timed out after {}s", .0.as_secs_f32())]
  Timeout(Duration),

  #[error("Transport error: {0}")]
  Transport(String),

  #[error("Remote rejected request: {0}")]
  RemoteRejected(String),

  #[error("Invalid response: {0}")]
  InvalidResponse(String),

  #[error("File is {size} bytes, upload limit is {limit} bytes")]
  PayloadTooLarge { size: usize, limit: usize },
}

impl RemoteError {
  fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
      return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
      end -= 1;
    }
    format!(
      "{}... (truncated, {} total bytes)",
      &body[..end],
      body.len()
    )
  }

  /// Non-2xx HTTP responses are transport failures, whatever the status.
  pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
    RemoteError::Transport(format!("HTTP {}: {}", status, Self::truncate_body(body)))
  }

  /// True when the endpoint answered, even if it refused the request.
  pub fn reached_remote(&self) -> bool {
    matches!(
      self,
      RemoteError::RemoteRejected(_) | RemoteError::InvalidResponse(_)
    )
  }
}

impl From<reqwest::Error> for RemoteError {
  fn from(e: reqwest::Error) -> Self {
    if e.is_timeout() {
      // reqwest does not report the configured duration
      RemoteError::Timeout(Duration::ZERO)
    } else {
      RemoteError::Transport(e.to_string())
    }
  }
}

/// Failure of the on-device snapshot store.
///
/// These never reach callers of the repository; the cache layer logs them
/// and carries on memory-only.
#[derive(Error, Debug)]
pub enum StorageError {
  #[error("Local store unavailable: {0}")]
  Unavailable(String),

  #[error("Stored snapshot is corrupt: {0}")]
  Corrupt(String),
}

impl From<rusqlite::Error> for StorageError {
  fn from(e: rusqlite::Error) -> Self {
    StorageError::Unavailable(e.to_string())
  }
}
