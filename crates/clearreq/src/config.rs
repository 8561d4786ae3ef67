use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Fixed storage key for the analysis history
pub const HISTORY_FILE_NAME: &str = "analysis_history.json";

/// Configuration for the analysis HTTP client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
  /// Base URL of the analysis service, without a trailing slash
  pub base_url: String,
  /// Request timeout; `None` leaves requests unbounded
  pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self { base_url: DEFAULT_BASE_URL.to_string(), timeout: None }
  }
}

impl ClientConfig {
  pub fn new(base_url: &str) -> Result<Self, ConfigError> {
    let parsed = url::Url::parse(base_url)
      .map_err(|source| ConfigError::InvalidUrl { url: base_url.to_string(), source })?;

    if !matches!(parsed.scheme(), "http" | "https") {
      return Err(ConfigError::UnsupportedScheme { url: base_url.to_string() });
    }

    Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), timeout: None })
  }

  pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn endpoint(&self, path: &str) -> String {
    format!("{}/{}", self.base_url, path.trim_start_matches('/'))
  }
}

/// Everything a command needs to build a controller
#[derive(Debug, Clone)]
pub struct AppConfig {
  pub client: ClientConfig,
  pub data_dir: PathBuf,
  pub dev_mode: bool,
}

impl AppConfig {
  pub fn history_path(&self) -> PathBuf {
    self.data_dir.join(HISTORY_FILE_NAME)
  }
}

/// `~/.clearreq`, or `./.clearreq` when there is no home directory
pub fn default_data_dir() -> PathBuf {
  dirs::home_dir()
    .or_else(|| std::env::current_dir().ok())
    .unwrap_or_else(|| PathBuf::from("."))
    .join(".clearreq")
}
