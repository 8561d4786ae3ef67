use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;

use crate::clipboard;
use crate::commands::open_controller;
use crate::config::AppConfig;
use crate::controller::{Controller, Page};
use crate::error::ControllerError;
use crate::export;
use crate::model::{HistoryEntry, ResultsQuery};
use crate::{output, views};

pub fn list(config: &AppConfig) -> Result<ExitCode> {
  let mut controller = open_controller(config)?;
  controller.navigate(Page::History)?;
  println!("{}", views::render(&controller.screen()));
  Ok(ExitCode::SUCCESS)
}

pub fn show(config: &AppConfig, id: i64, query: ResultsQuery) -> Result<ExitCode> {
  let mut controller = open_controller(config)?;
  if !load_entry(&mut controller, id)? {
    return Ok(ExitCode::FAILURE);
  }

  controller.set_search_query(query.search);
  controller.set_sort(query.sort);
  controller.set_type_filter(query.filter);
  println!("{}", views::render(&controller.screen()));
  Ok(ExitCode::SUCCESS)
}

pub fn copy(config: &AppConfig, id: i64, print: bool) -> Result<ExitCode> {
  let mut controller = open_controller(config)?;
  if !load_entry(&mut controller, id)? {
    return Ok(ExitCode::FAILURE);
  }
  let text = controller.copy_text().unwrap_or_default();

  if print {
    println!("{text}");
    return Ok(ExitCode::SUCCESS);
  }

  match clipboard::copy(&text) {
    Ok(()) => {
      output::success("Copied results to clipboard");
      Ok(ExitCode::SUCCESS)
    }
    Err(err) => {
      output::error(&format!("Could not copy to clipboard: {err}"));
      Ok(ExitCode::FAILURE)
    }
  }
}

pub fn export(config: &AppConfig, id: i64, destination: Option<PathBuf>) -> Result<ExitCode> {
  let controller = open_controller(config)?;
  let Some(entry) = find_entry(&controller, id) else {
    return Ok(ExitCode::FAILURE);
  };

  let path = destination.unwrap_or_else(|| PathBuf::from(export::entry_file_name(entry)));
  export::export_result(&entry.result, &path)?;
  output::success(&format!("Exported {} to {}", entry.file_name, path.display()));
  Ok(ExitCode::SUCCESS)
}

pub fn clear(config: &AppConfig) -> Result<ExitCode> {
  let mut controller = open_controller(config)?;
  let removed = controller.history().len();
  controller.clear_history()?;
  output::success(&format!("Cleared {removed} history entries"));
  Ok(ExitCode::SUCCESS)
}

fn find_entry(controller: &Controller, id: i64) -> Option<&HistoryEntry> {
  let entry = controller.history().get(id);
  if entry.is_none() {
    output::error(&format!("No history entry with id {id}. Use 'clearreq history list' to see entries."));
  }
  entry
}

/// Load entry `id` into the results page; false (after telling the user)
/// when there is no such entry
fn load_entry(controller: &mut Controller, id: i64) -> Result<bool> {
  match controller.view_history_entry(id) {
    Ok(()) => Ok(true),
    Err(ControllerError::UnknownEntry(id)) => {
      output::error(&format!("No history entry with id {id}. Use 'clearreq history list' to see entries."));
      Ok(false)
    }
    Err(err) => Err(err.into()),
  }
}
