//! View-state controller.
//!
//! Owns the current page, the selected document, the last error, the loading
//! flag, the current analysis result and the results query, and is the only
//! writer of the history store. Views read from [`Controller::screen`], which
//! cannot produce a results screen without a result.
//!
//! An analysis is split into [`Controller::begin_analysis`] and
//! [`Controller::complete_analysis`] so the request can run while the
//! controller keeps handling events. Each request carries the generation it
//! was started in; navigating advances the generation, and a completion from
//! an older generation is recorded in history but leaves the view alone.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::client::AnalysisClient;
use crate::document::DocumentFile;
use crate::error::{AnalysisError, ControllerError, ValidationError};
use crate::history::HistoryStore;
use crate::model::{AnalysisResult, HistoryEntry, Requirement, ResultsQuery, SortKey, TypeFilter};
use crate::validator;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Page {
  #[default]
  Home,
  Results,
  History,
}

impl Page {
  pub fn title(&self) -> &'static str {
    match self {
      Page::Home => "Home",
      Page::Results => "Results",
      Page::History => "History",
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
  pub page: Page,
  pub selected_file: Option<DocumentFile>,
  pub error: Option<String>,
  pub loading: bool,
  pub analysis_result: Option<AnalysisResult>,
  pub query: ResultsQuery,
}

/// What a view should render right now
#[derive(Debug)]
pub enum Screen<'a> {
  Home { selected: Option<&'a DocumentFile>, error: Option<&'a str>, loading: bool },
  Results { result: &'a AnalysisResult, query: &'a ResultsQuery },
  History { entries: &'a [HistoryEntry] },
}

/// An in-flight analysis request
#[derive(Debug, Clone)]
pub struct AnalysisTicket {
  generation: u64,
  file: DocumentFile,
}

impl AnalysisTicket {
  pub fn file(&self) -> &DocumentFile {
    &self.file
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
  /// Result stored, recorded in history and shown
  Applied { entry_id: i64 },
  /// The user navigated away meanwhile; recorded in history only
  Recorded { entry_id: i64 },
  /// Request failed; message stored as the page error
  Failed { message: String },
  /// Request failed after the user navigated away; nothing changed
  Discarded,
  /// Request succeeded but history could not be written; the result is
  /// still shown when `shown` is set
  Unrecorded { shown: bool, reason: String },
}

pub struct Controller {
  client: Arc<dyn AnalysisClient>,
  history: HistoryStore,
  state: ViewState,
  generation: u64,
}

impl Controller {
  pub fn new(client: Arc<dyn AnalysisClient>, history: HistoryStore) -> Self {
    Self { client, history, state: ViewState::default(), generation: 0 }
  }

  pub fn state(&self) -> &ViewState {
    &self.state
  }

  pub fn history(&self) -> &HistoryStore {
    &self.history
  }

  pub fn client(&self) -> Arc<dyn AnalysisClient> {
    Arc::clone(&self.client)
  }

  pub fn screen(&self) -> Screen<'_> {
    match (self.state.page, self.state.analysis_result.as_ref()) {
      (Page::Results, Some(result)) => Screen::Results { result, query: &self.state.query },
      (Page::History, _) => Screen::History { entries: self.history.entries() },
      (Page::Home, _) | (Page::Results, None) => Screen::Home {
        selected: self.state.selected_file.as_ref(),
        error: self.state.error.as_deref(),
        loading: self.state.loading,
      },
    }
  }

  /// File chosen through the picker
  pub fn select_file(&mut self, file: DocumentFile) -> Result<(), ValidationError> {
    self.accept_file(file)
  }

  /// File dropped onto the upload target; same path as the picker
  pub fn drop_file(&mut self, file: DocumentFile) -> Result<(), ValidationError> {
    self.accept_file(file)
  }

  fn accept_file(&mut self, file: DocumentFile) -> Result<(), ValidationError> {
    match validator::validate(&file) {
      Ok(()) => {
        debug!(file = %file.name, size = file.size, "file accepted");
        self.state.selected_file = Some(file);
        self.state.error = None;
        Ok(())
      }
      Err(err) => {
        debug!(file = %file.name, error = %err, "file rejected");
        self.state.selected_file = None;
        self.state.error = Some(err.to_string());
        Err(err)
      }
    }
  }

  /// Whether the submit action is enabled
  pub fn can_analyze(&self) -> bool {
    self.state.selected_file.is_some() && !self.state.loading
  }

  /// Start an analysis of the selected file
  pub fn begin_analysis(&mut self) -> Result<AnalysisTicket, ControllerError> {
    if self.state.loading {
      return Err(ControllerError::AlreadyLoading);
    }
    let file = self.state.selected_file.clone().ok_or(ControllerError::NoFileSelected)?;

    self.state.loading = true;
    self.state.error = None;
    self.state.analysis_result = None;
    if self.state.page == Page::Results {
      self.state.page = Page::Home;
    }
    self.generation += 1;

    debug!(file = %file.name, generation = self.generation, "analysis started");
    Ok(AnalysisTicket { generation: self.generation, file })
  }

  /// Apply the outcome of a request started with [`Controller::begin_analysis`]
  pub fn complete_analysis(
    &mut self,
    ticket: AnalysisTicket,
    outcome: Result<AnalysisResult, AnalysisError>,
  ) -> Completion {
    self.state.loading = false;
    let current = ticket.generation == self.generation;

    match outcome {
      Ok(result) => {
        let recorded = self.history.record(&ticket.file.name, result.clone());
        if current {
          self.state.analysis_result = Some(result);
          self.state.page = Page::Results;
        } else {
          warn!(file = %ticket.file.name, "analysis finished after navigation; recorded without display");
        }

        match recorded {
          Ok(entry_id) if current => Completion::Applied { entry_id },
          Ok(entry_id) => Completion::Recorded { entry_id },
          Err(err) => {
            warn!(file = %ticket.file.name, error = %err, "analysis result not saved to history");
            Completion::Unrecorded { shown: current, reason: err.to_string() }
          }
        }
      }
      Err(err) => {
        debug!(error = %err.diagnostic(), current, "analysis failed");
        if current {
          let message = err.to_string();
          self.state.error = Some(message.clone());
          Completion::Failed { message }
        } else {
          Completion::Discarded
        }
      }
    }
  }

  /// Run a whole analysis in place
  pub async fn analyze(&mut self) -> Result<Completion, ControllerError> {
    let ticket = self.begin_analysis()?;
    let outcome = self.client.analyze(ticket.file()).await;
    Ok(self.complete_analysis(ticket, outcome))
  }

  pub fn clear_history(&mut self) -> Result<(), ControllerError> {
    self.history.clear()?;
    Ok(())
  }

  /// Load a past result into the results page
  pub fn view_history_entry(&mut self, id: i64) -> Result<(), ControllerError> {
    let entry = self.history.get(id).ok_or(ControllerError::UnknownEntry(id))?;
    self.state.analysis_result = Some(entry.result.clone());
    self.set_page(Page::Results);
    Ok(())
  }

  pub fn navigate(&mut self, page: Page) -> Result<(), ControllerError> {
    if page == Page::Results && self.state.analysis_result.is_none() {
      return Err(ControllerError::NoResult);
    }
    self.set_page(page);
    Ok(())
  }

  fn set_page(&mut self, page: Page) {
    if self.state.page != page {
      self.generation += 1;
      debug!(from = self.state.page.title(), to = page.title(), "navigated");
    }
    self.state.page = page;
  }

  pub fn set_search_query(&mut self, query: impl Into<String>) {
    self.state.query.search = query.into();
  }

  pub fn set_sort(&mut self, sort: Option<SortKey>) {
    self.state.query.sort = sort;
  }

  pub fn set_type_filter(&mut self, filter: TypeFilter) {
    self.state.query.filter = filter;
  }

  /// Requirements the results table currently shows
  pub fn visible_requirements(&self) -> Vec<&Requirement> {
    self
      .state
      .analysis_result
      .as_ref()
      .map(|result| result.select(&self.state.query))
      .unwrap_or_default()
  }

  /// Text for the copy action, if there is a result
  pub fn copy_text(&self) -> Option<String> {
    self.state.analysis_result.as_ref().map(AnalysisResult::copy_text)
  }
}
