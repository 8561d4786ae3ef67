use std::sync::Arc;

use anyhow::{Context, Result};

use crate::client::HttpAnalysisClient;
use crate::config::AppConfig;
use crate::controller::Controller;
use crate::history::HistoryStore;
use crate::output;

pub mod analyze;
pub mod health;
pub mod history;
pub mod shell;

/// Build a controller over the configured service and history file,
/// telling the user if an unreadable history had to be set aside
pub fn open_controller(config: &AppConfig) -> Result<Controller> {
  let client =
    HttpAnalysisClient::new(config.client.clone()).context("Failed to create HTTP client")?;
  let history = HistoryStore::open(config.history_path())?;

  if let Some(backup) = history.quarantined() {
    output::warn(&format!(
      "History file was unreadable; moved it to {} and started a new history",
      backup.display()
    ));
  }

  Ok(Controller::new(Arc::new(client), history))
}
