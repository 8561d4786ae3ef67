//! HTTP client for the analysis service.
//!
//! Wraps the single `POST /api/analyze` call (plus the `/health` probe) and
//! maps every failure to an [`AnalysisError`] whose display string is the
//! message the user sees.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::document::DocumentFile;
use crate::error::AnalysisError;
use crate::model::{AnalysisResult, HealthReport};

pub const ANALYZE_PATH: &str = "/api/analyze";
pub const HEALTH_PATH: &str = "/health";

/// Multipart field the service reads the document from
pub const FILE_FIELD: &str = "file";

/// Seam between the controller and the network. Implementations are
/// stateless and may be called concurrently.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisClient: Send + Sync {
  async fn analyze(&self, file: &DocumentFile) -> Result<AnalysisResult, AnalysisError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
  #[serde(default)]
  detail: Option<serde_json::Value>,
}

pub struct HttpAnalysisClient {
  client: Client,
  config: ClientConfig,
}

impl HttpAnalysisClient {
  pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
    let mut builder = Client::builder();
    if let Some(timeout) = config.timeout {
      builder = builder.timeout(timeout);
    }
    let client = builder.build()?;

    Ok(Self { client, config })
  }

  /// Probe the service's health endpoint
  pub async fn health(&self) -> Result<HealthReport, AnalysisError> {
    let url = self.config.endpoint(HEALTH_PATH);
    debug!(%url, "checking analysis service health");

    let response =
      self.client.get(&url).send().await.map_err(|e| AnalysisError::transport(e.to_string()))?;

    let status = response.status();
    let body = response.text().await.map_err(|e| AnalysisError::transport(e.to_string()))?;

    if !status.is_success() {
      return Err(AnalysisError::rejected(status.as_u16(), Some(format!("Health check returned {status}"))));
    }

    serde_json::from_str(&body).map_err(|e| AnalysisError::invalid_response(e.to_string()))
  }

  async fn build_form(&self, file: &DocumentFile) -> Result<Form, AnalysisError> {
    let bytes = file
      .read_bytes()
      .await
      .map_err(|source| AnalysisError::Unreadable { name: file.name.clone(), source })?;

    let part = Part::bytes(bytes).file_name(file.name.clone());
    let part = match file.mime_type.as_deref().filter(|mime| !mime.is_empty()) {
      Some(mime) => part.mime_str(mime).map_err(|_| AnalysisError::InvalidMime {
        name: file.name.clone(),
        mime: mime.to_string(),
      })?,
      None => part,
    };

    Ok(Form::new().part(FILE_FIELD, part))
  }
}

/// Pull a usable message out of an error response body. Only a non-empty
/// string `detail` counts.
fn error_detail(body: &str) -> Option<String> {
  let parsed: ErrorBody = serde_json::from_str(body).ok()?;
  match parsed.detail? {
    serde_json::Value::String(detail) => Some(detail),
    _ => None,
  }
}

#[async_trait]
impl AnalysisClient for HttpAnalysisClient {
  async fn analyze(&self, file: &DocumentFile) -> Result<AnalysisResult, AnalysisError> {
    let form = self.build_form(file).await?;
    let url = self.config.endpoint(ANALYZE_PATH);
    debug!(%url, file = %file.name, size = file.size, "submitting document for analysis");

    let response = self
      .client
      .post(&url)
      .multipart(form)
      .send()
      .await
      .map_err(|e| AnalysisError::transport(e.to_string()))?;

    let status = response.status();
    let body = response.text().await.map_err(|e| AnalysisError::transport(e.to_string()))?;
    debug!(status = status.as_u16(), bytes = body.len(), "analysis service responded");

    if !status.is_success() {
      return Err(AnalysisError::rejected(status.as_u16(), error_detail(&body)));
    }

    serde_json::from_str(&body).map_err(|e| AnalysisError::invalid_response(e.to_string()))
  }
}
