use std::process::ExitCode;

use anyhow::{Context, Result};

use crate::client::HttpAnalysisClient;
use crate::config::AppConfig;
use crate::error::AnalysisError;
use crate::{output, views};

pub async fn handle(config: &AppConfig) -> Result<ExitCode> {
  let client =
    HttpAnalysisClient::new(config.client.clone()).context("Failed to create HTTP client")?;

  match client.health().await {
    Ok(report) => {
      println!("{}", views::render_health(&report));
      Ok(ExitCode::SUCCESS)
    }
    Err(AnalysisError::Transport { reason }) => {
      output::error(&format!("Analysis service at {} is unreachable", config.client.base_url));
      tracing::debug!(%reason, "health probe failed");
      Ok(ExitCode::FAILURE)
    }
    Err(err) => {
      output::error(&err.to_string());
      Ok(ExitCode::FAILURE)
    }
  }
}
