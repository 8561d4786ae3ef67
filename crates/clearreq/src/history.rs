use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use tracing::{debug, warn};

use crate::error::HistoryError;
use crate::model::{AnalysisResult, HistoryEntry};

/// Append-only log of past analyses, newest first, persisted as one JSON
/// array. Every mutation rewrites the whole file.
#[derive(Debug)]
pub struct HistoryStore {
  path: PathBuf,
  entries: Vec<HistoryEntry>,
  quarantined: Option<PathBuf>,
}

impl HistoryStore {
  /// Open the store at `path`, loading whatever is persisted there.
  ///
  /// A file that cannot be parsed is moved aside to
  /// `<name>.corrupt-<unix-ms>` and the store starts empty; see
  /// [`HistoryStore::quarantined`].
  pub fn open(path: impl Into<PathBuf>) -> Result<Self, HistoryError> {
    let path = path.into();
    let mut store = Self { path, entries: Vec::new(), quarantined: None };

    match store.load() {
      Ok(entries) => store.entries = entries,
      Err(HistoryError::Corrupt { source, .. }) => {
        let backup = store.quarantine()?;
        warn!(
          history = %store.path.display(),
          backup = %backup.display(),
          error = %source,
          "history file was unreadable; moved aside and starting empty"
        );
        store.quarantined = Some(backup);
      }
      Err(err) => return Err(err),
    }

    debug!(entries = store.entries.len(), "history loaded");
    Ok(store)
  }

  /// Read the persisted sequence from disk. A missing or blank file is an
  /// empty history.
  pub fn load(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
    if !self.path.exists() {
      return Ok(Vec::new());
    }

    let json = fs::read_to_string(&self.path).map_err(|e| HistoryError::io(&self.path, e))?;
    if json.trim().is_empty() {
      return Ok(Vec::new());
    }

    serde_json::from_str(&json)
      .map_err(|source| HistoryError::Corrupt { path: self.path.clone(), source })
  }

  /// Persist the in-memory sequence
  pub fn save(&self) -> Result<(), HistoryError> {
    self.write(&self.entries)
  }

  /// Prepend `entry` and persist. The in-memory sequence only changes once
  /// the file has been written.
  pub fn append(&mut self, entry: HistoryEntry) -> Result<(), HistoryError> {
    let mut next = Vec::with_capacity(self.entries.len() + 1);
    next.push(entry);
    next.extend(self.entries.iter().cloned());
    self.write(&next)?;
    self.entries = next;
    Ok(())
  }

  /// Create an entry for a successful analysis of `file_name`, prepend it
  /// and persist. Returns the new entry's id.
  pub fn record(&mut self, file_name: &str, result: AnalysisResult) -> Result<i64, HistoryError> {
    let now = Utc::now();
    let id = self.next_id(now.timestamp_millis());
    let entry = HistoryEntry {
      id,
      file_name: file_name.to_string(),
      timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
      result,
    };
    self.append(entry)?;
    Ok(id)
  }

  /// Empty the store and persist
  pub fn clear(&mut self) -> Result<(), HistoryError> {
    self.write(&[])?;
    self.entries.clear();
    Ok(())
  }

  pub fn entries(&self) -> &[HistoryEntry] {
    &self.entries
  }

  pub fn get(&self, id: i64) -> Option<&HistoryEntry> {
    self.entries.iter().find(|entry| entry.id == id)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Where an unreadable history file was moved when the store was opened
  pub fn quarantined(&self) -> Option<&Path> {
    self.quarantined.as_deref()
  }

  /// Ids are creation times in milliseconds, bumped past the newest entry
  /// when the clock has not moved on.
  fn next_id(&self, now_millis: i64) -> i64 {
    match self.entries.iter().map(|entry| entry.id).max() {
      Some(newest) if newest >= now_millis => newest + 1,
      _ => now_millis,
    }
  }

  fn write(&self, entries: &[HistoryEntry]) -> Result<(), HistoryError> {
    if let Some(parent) = self.path.parent() {
      fs::create_dir_all(parent).map_err(|e| HistoryError::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(entries)?;
    fs::write(&self.path, json).map_err(|e| HistoryError::io(&self.path, e))?;
    debug!(entries = entries.len(), path = %self.path.display(), "history saved");
    Ok(())
  }

  fn quarantine(&self) -> Result<PathBuf, HistoryError> {
    let file_name = self
      .path
      .file_name()
      .map(|name| name.to_string_lossy().to_string())
      .unwrap_or_else(|| "history".to_string());
    let backup =
      self.path.with_file_name(format!("{file_name}.corrupt-{}", Utc::now().timestamp_millis()));
    fs::rename(&self.path, &backup).map_err(|e| HistoryError::io(&self.path, e))?;
    Ok(backup)
  }
}
