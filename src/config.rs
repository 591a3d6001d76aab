use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::records::AdminIdentity;

/// Environment variable that overrides `remote.url`.
pub const ENDPOINT_ENV: &str = "STAFFSYNC_REMOTE_URL";

const MIN_TIMEOUT_SECS: u64 = 3;
const MAX_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub remote: RemoteConfig,
  #[serde(default)]
  pub storage: StorageConfig,
  #[serde(default)]
  pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
  /// Remote procedure endpoint (deployed script URL)
  pub url: Option<String>,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for RemoteConfig {
  fn default() -> Self {
    Self {
      url: None,
      timeout_secs: default_timeout_secs(),
    }
  }
}

fn default_timeout_secs() -> u64 {
  10
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
  /// Set to false to run memory-only
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Database file (defaults to the platform data dir)
  pub path: Option<PathBuf>,
}

impl Default for StorageConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      path: None,
    }
  }
}

fn default_true() -> bool {
  true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminConfig {
  pub login_key: Option<String>,
  pub display_name: Option<String>,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./staffsync.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/staffsync/config.yaml
  ///
  /// Without any file the defaults apply.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("staffsync.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("staffsync").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Invalid config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    // An empty file is a valid, all-defaults config
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    let config: Config = serde_yaml::from_str(contents)?;
    config.validate()?;
    Ok(config)
  }

  fn validate(&self) -> Result<()> {
    let secs = self.remote.timeout_secs;
    if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&secs) {
      return Err(eyre!(
        "remote.timeout_secs must be between {} and {}, got {}",
        MIN_TIMEOUT_SECS,
        MAX_TIMEOUT_SECS,
        secs
      ));
    }
    Ok(())
  }

  /// Resolve the remote endpoint.
  ///
  /// Checks the explicit override first, then STAFFSYNC_REMOTE_URL, then `remote.url`.
  pub fn endpoint(&self, override_url: Option<&str>) -> Result<String> {
    let env = std::env::var(ENDPOINT_ENV).ok();
    Self::pick_endpoint(override_url, env.as_deref(), self.remote.url.as_deref())
  }

  fn pick_endpoint(flag: Option<&str>, env: Option<&str>, file: Option<&str>) -> Result<String> {
    [flag, env, file]
      .into_iter()
      .flatten()
      .map(str::trim)
      .find(|s| !s.is_empty())
      .map(str::to_string)
      .ok_or_else(|| {
        eyre!(
          "No remote endpoint configured. Pass --endpoint, set {} or add remote.url to the config file.",
          ENDPOINT_ENV
        )
      })
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.remote.timeout_secs)
  }

  pub fn admin_identity(&self) -> AdminIdentity {
    let defaults = AdminIdentity::default();
    AdminIdentity {
      login_key: self.admin.login_key.clone().unwrap_or(defaults.login_key),
      display_name: self.admin.display_name.clone().unwrap_or(defaults.display_name),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_full_config() {
    let config = Config::parse(
      r#"
remote:
  url: https://script.example.test/macros/s/abc/exec
  timeout_secs: 5
storage:
  enabled: false
  path: /tmp/staffsync.db
admin:
  login_key: kepsek
  display_name: Kepala Sekolah
"#,
    )
    .unwrap();

    assert_eq!(
      config.remote.url.as_deref(),
      Some("https://script.example.test/macros/s/abc/exec")
    );
    assert_eq!(config.timeout(), Duration::from_secs(5));
    assert!(!config.storage.enabled);
    assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/staffsync.db")));
    let admin = config.admin_identity();
    assert_eq!(admin.login_key, "kepsek");
    assert_eq!(admin.display_name, "Kepala Sekolah");
  }

  #[test]
  fn test_defaults() {
    let config = Config::parse("remote:\n  url: https://x.test\n").unwrap();
    assert_eq!(config.timeout(), Duration::from_secs(10));
    assert!(config.storage.enabled);
    assert!(config.storage.path.is_none());
    assert_eq!(config.admin_identity(), AdminIdentity::default());

    let empty = Config::parse("").unwrap();
    assert!(empty.remote.url.is_none());
    assert!(empty.storage.enabled);
  }

  #[test]
  fn test_timeout_out_of_range() {
    assert!(Config::parse("remote:\n  timeout_secs: 2\n").is_err());
    assert!(Config::parse("remote:\n  timeout_secs: 16\n").is_err());
    assert!(Config::parse("remote:\n  timeout_secs: 15\n").is_ok());
  }

  #[test]
  fn test_endpoint_precedence() {
    let pick = Config::pick_endpoint;
    assert_eq!(pick(Some("a"), Some("b"), Some("c")).unwrap(), "a");
    assert_eq!(pick(None, Some("b"), Some("c")).unwrap(), "b");
    assert_eq!(pick(Some("  "), None, Some("c")).unwrap(), "c");
    assert!(pick(None, None, None).is_err());
  }

  #[test]
  fn test_missing_explicit_path_errors() {
    let err = Config::load(Some(Path::new("/nonexistent/staffsync.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }
}
