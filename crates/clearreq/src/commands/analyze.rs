use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;

use crate::commands::open_controller;
use crate::config::AppConfig;
use crate::controller::Completion;
use crate::document::DocumentFile;
use crate::model::ResultsQuery;
use crate::{output, views};

pub struct AnalyzeOptions {
  pub path: PathBuf,
  pub mime: Option<String>,
  pub query: ResultsQuery,
}

pub async fn handle(config: &AppConfig, options: AnalyzeOptions) -> Result<ExitCode> {
  let mut controller = open_controller(config)?;

  let file = match DocumentFile::from_path(&options.path, options.mime) {
    Ok(file) => file,
    Err(err) => {
      output::error(&format!("Could not open {}: {err}", options.path.display()));
      return Ok(ExitCode::FAILURE);
    }
  };

  if controller.select_file(file).is_err() {
    println!("{}", views::render(&controller.screen()));
    return Ok(ExitCode::FAILURE);
  }

  if let Some(file) = &controller.state().selected_file {
    output::info(&format!("{} {}", views::ANALYZING_LABEL, file.name));
  }

  let completion = controller.analyze().await?;
  let has_result = matches!(
    completion,
    Completion::Applied { .. } | Completion::Recorded { .. } | Completion::Unrecorded { .. }
  );
  if has_result {
    controller.set_search_query(options.query.search);
    controller.set_sort(options.query.sort);
    controller.set_type_filter(options.query.filter);
    println!("{}", views::render(&controller.screen()));
  }

  match completion {
    Completion::Applied { entry_id } | Completion::Recorded { entry_id } => {
      output::success(&format!("Saved to history as #{entry_id}"));
      Ok(ExitCode::SUCCESS)
    }
    Completion::Unrecorded { reason, .. } => {
      output::warn(&format!("Not saved to history: {reason}"));
      Ok(ExitCode::SUCCESS)
    }
    Completion::Failed { message } => {
      output::error(&message);
      Ok(ExitCode::FAILURE)
    }
    Completion::Discarded => Ok(ExitCode::FAILURE),
  }
}
