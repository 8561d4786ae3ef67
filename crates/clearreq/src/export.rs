use std::fs;
use std::path::Path;

use crate::error::HistoryError;
use crate::model::{AnalysisResult, HistoryEntry};

const FALLBACK_STEM: &str = "analysis-results";

/// Write `result` as pretty JSON to `path`
pub fn export_result(result: &AnalysisResult, path: &Path) -> Result<(), HistoryError> {
  if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
    fs::create_dir_all(parent).map_err(|e| HistoryError::io(parent, e))?;
  }
  let json = serde_json::to_string_pretty(result)?;
  fs::write(path, json).map_err(|e| HistoryError::io(path, e))
}

/// `<document stem>-<id>.json`
pub fn entry_file_name(entry: &HistoryEntry) -> String {
  format!("{}-{}.json", stem(Some(&entry.file_name)), entry.id)
}

/// File name for the result currently on screen
pub fn result_file_name(result: &AnalysisResult) -> String {
  match result.filename.as_deref() {
    Some(name) => format!("{}-results.json", stem(Some(name))),
    None => format!("{FALLBACK_STEM}.json"),
  }
}

fn stem(file_name: Option<&str>) -> String {
  file_name
    .and_then(|name| Path::new(name).file_stem())
    .map(|stem| stem.to_string_lossy().to_string())
    .filter(|stem| !stem.is_empty())
    .unwrap_or_else(|| FALLBACK_STEM.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn entry(file_name: &str) -> HistoryEntry {
    HistoryEntry {
      id: 1_700_000_000_123,
      file_name: file_name.to_string(),
      timestamp: "2023-11-14T22:13:20.123Z".to_string(),
      result: AnalysisResult::default(),
    }
  }

  #[test]
  fn test_entry_file_name() {
    assert_eq!(entry_file_name(&entry("srs v2.pdf")), "srs v2-1700000000123.json");
    assert_eq!(entry_file_name(&entry("")), "analysis-results-1700000000123.json");
  }

  #[test]
  fn test_result_file_name() {
    let mut result = AnalysisResult::default();
    assert_eq!(result_file_name(&result), "analysis-results.json");
    result.filename = Some("login.txt".to_string());
    assert_eq!(result_file_name(&result), "login-results.json");
  }

  #[test]
  fn test_export_writes_result_json() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("out.json");
    let mut result = AnalysisResult::default();
    result.summary.total = Some(4);

    export_result(&result, &path).unwrap();

    let written: AnalysisResult = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written, result);
  }
}
