use std::time::Duration;

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::RemoteError;

use super::backend::RemoteBackend;
use super::types::{unwrap_envelope, Action, Connectivity, ConnectivityFlag};

/// HTTP client for the remote endpoint.
/// Clone is cheap; clones share the connection pool and connectivity flag.
#[derive(Clone)]
pub struct RemoteClient {
  client: Client,
  endpoint: Url,
  timeout: Duration,
  connectivity: ConnectivityFlag,
}

impl RemoteClient {
  pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
    let endpoint =
      Url::parse(endpoint).map_err(|e| eyre!("Invalid remote endpoint '{}': {}", endpoint, e))?;

    let client = Client::builder()
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      client,
      endpoint,
      timeout,
      connectivity: ConnectivityFlag::default(),
    })
  }

  pub fn timeout(&self) -> Duration {
    self.timeout
  }

  /// Endpoint URL with the `action` query parameter set.
  fn action_url(&self, action: Action) -> Url {
    let mut url = self.endpoint.clone();
    url.query_pairs_mut().append_pair("action", action.as_str());
    url
  }

  async fn send(&self, action: Action, payload: &Value) -> Result<Value, RemoteError> {
    let response = self
      .client
      .post(self.action_url(action))
      .json(payload)
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(RemoteError::from_status(status, &body));
    }

    let bytes = response.bytes().await?;
    let body: Value = serde_json::from_slice(&bytes)
      .map_err(|e| RemoteError::InvalidResponse(format!("body is not JSON: {}", e)))?;

    unwrap_envelope(body)
  }
}

#[async_trait]
impl RemoteBackend for RemoteClient {
  async fn call(&self, action: Action, payload: Value) -> Result<Value, RemoteError> {
    debug!(action = %action, timeout_ms = self.timeout.as_millis() as u64, "Calling remote endpoint");

    // Dropping the send future on timeout aborts the request
    let result = match tokio::time::timeout(self.timeout, self.send(action, &payload)).await {
      Ok(result) => result,
      Err(_) => Err(RemoteError::Timeout(self.timeout)),
    };

    self.connectivity.record(&result);
    if let Err(ref e) = result {
      warn!(action = %action, error = %e, "Remote call failed");
    }
    result
  }

  fn connectivity(&self) -> Connectivity {
    self.connectivity.get()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use std::net::SocketAddr;
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::{TcpListener, TcpStream};
  use tokio::sync::oneshot;

  /// Read one HTTP request (headers plus Content-Length body) and return its request line.
  async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
      let n = socket.read(&mut chunk).await.unwrap();
      if n == 0 {
        break;
      }
      buf.extend_from_slice(&chunk[..n]);
      let text = String::from_utf8_lossy(&buf).to_string();
      if let Some(header_end) = text.find("\r\n\r\n") {
        let content_length = text[..header_end]
          .lines()
          .find_map(|l| {
            let lower = l.to_ascii_lowercase();
            lower
              .strip_prefix("content-length:")
              .map(|v| v.trim().parse::<usize>().unwrap_or(0))
          })
          .unwrap_or(0);
        if buf.len() >= header_end + 4 + content_length {
          break;
        }
      }
    }
    String::from_utf8_lossy(&buf)
      .lines()
      .next()
      .unwrap_or_default()
      .to_string()
  }

  /// Serve a single canned response and report the request line seen.
  async fn serve_once(status: &'static str, body: String) -> (SocketAddr, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      let request_line = read_request(&mut socket).await;
      let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
      );
      socket.write_all(response.as_bytes()).await.unwrap();
      let _ = socket.shutdown().await;
      let _ = tx.send(request_line);
    });
    (addr, rx)
  }

  fn client_for(addr: SocketAddr, timeout: Duration) -> RemoteClient {
    RemoteClient::new(&format!("http://{}/macros/exec", addr), timeout).unwrap()
  }

  #[test]
  fn test_action_url() {
    let client = RemoteClient::new("https://script.example.test/exec", Duration::from_secs(5)).unwrap();
    assert_eq!(
      client.action_url(Action::SaveEmployee).as_str(),
      "https://script.example.test/exec?action=saveEmployee"
    );
  }

  #[test]
  fn test_invalid_endpoint() {
    assert!(RemoteClient::new("not a url", Duration::from_secs(5)).is_err());
  }

  #[tokio::test]
  async fn test_call_success_returns_data() {
    let body = json!({ "success": true, "data": [{ "id": "A1", "nik": "3201" }] }).to_string();
    let (addr, seen) = serve_once("200 OK", body).await;
    let client = client_for(addr, Duration::from_secs(5));

    let data = client.call(Action::ListEmployees, json!({})).await.unwrap();
    assert_eq!(data[0]["id"], "A1");
    assert_eq!(client.connectivity(), Connectivity::Online);

    let request_line = seen.await.unwrap();
    assert!(request_line.starts_with("POST /macros/exec?action=listEmployees"));
  }

  #[tokio::test]
  async fn test_call_rejected() {
    let body = json!({ "success": false, "message": "Sheet locked" }).to_string();
    let (addr, _seen) = serve_once("200 OK", body).await;
    let client = client_for(addr, Duration::from_secs(5));

    let err = client.call(Action::SaveEmployee, json!({ "id": "A1" })).await.unwrap_err();
    assert!(matches!(err, RemoteError::RemoteRejected(ref m) if m == "Sheet locked"));
    assert_eq!(client.connectivity(), Connectivity::Online);
  }

  #[tokio::test]
  async fn test_call_non_2xx_is_transport_error() {
    let (addr, _seen) = serve_once("500 Internal Server Error", "boom".to_string()).await;
    let client = client_for(addr, Duration::from_secs(5));

    let err = client.call(Action::ListEmployees, json!({})).await.unwrap_err();
    assert!(matches!(err, RemoteError::Transport(_)));
    assert_eq!(client.connectivity(), Connectivity::Offline);
  }

  #[tokio::test]
  async fn test_call_connection_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = client_for(addr, Duration::from_secs(5));

    let err = client.call(Action::ListEmployees, json!({})).await.unwrap_err();
    assert!(matches!(err, RemoteError::Transport(_)));
    assert_eq!(client.connectivity(), Connectivity::Offline);
  }

  #[tokio::test]
  async fn test_call_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      // Accept and never answer, like a cold-starting backend
      let (_socket, _) = listener.accept().await.unwrap();
      tokio::time::sleep(Duration::from_secs(10)).await;
    });
    let client = client_for(addr, Duration::from_millis(200));

    let err = client.call(Action::ListEmployees, json!({})).await.unwrap_err();
    assert!(matches!(err, RemoteError::Timeout(d) if d == Duration::from_millis(200)));
    assert_eq!(client.connectivity(), Connectivity::Offline);
  }

  #[tokio::test]
  async fn test_list_employees_through_client() {
    let body = json!({
      "success": true,
      "data": [{ "id": "A1", "fullName": "Siti Aminah", "nik": "3201", "status": "PPPK" }]
    })
    .to_string();
    let (addr, _seen) = serve_once("200 OK", body).await;
    let client = client_for(addr, Duration::from_secs(5));

    let records = client.list_employees().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "A1");
  }
}
