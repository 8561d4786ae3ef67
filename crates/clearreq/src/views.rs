//! Renderers for the upload, results, history and health pages.
//!
//! Every renderer is a pure function of controller state returning the text
//! to print.

use chrono::{DateTime, Local};
use colored::*;

use crate::controller::Screen;
use crate::document::{format_size, DocumentFile};
use crate::model::{
  AmbiguityLevel, AnalysisResult, HealthReport, HistoryEntry, Requirement, RequirementKind,
  ResultsQuery, SortKey, TypeFilter,
};
use crate::output;

const PAGE_WIDTH: usize = 72;

pub const ANALYZE_LABEL: &str = "Analyze Document";
pub const ANALYZING_LABEL: &str = "Analyzing...";
pub const EMPTY_RESULTS: &str = "No requirements found.";
pub const EMPTY_HISTORY: &str = "No analysis history yet";
pub const EMPTY_HISTORY_HINT: &str = "Upload a document to start analyzing requirements";

pub fn render(screen: &Screen<'_>) -> String {
  match screen {
    Screen::Home { selected, error, loading } => render_upload(*selected, *error, *loading),
    Screen::Results { result, query } => render_results(result, query),
    Screen::History { entries } => render_history(entries),
  }
}

/// Convert an ISO-8601 timestamp to the local timezone for display.
/// Unparseable input is shown as stored.
pub fn format_timestamp(iso: &str) -> String {
  match DateTime::parse_from_rfc3339(iso) {
    Ok(parsed) => {
      let local: DateTime<Local> = parsed.with_timezone(&Local);
      local.format("%b %d, %Y, %I:%M:%S %p").to_string()
    }
    Err(_) => iso.to_string(),
  }
}

pub fn render_upload(selected: Option<&DocumentFile>, error: Option<&str>, loading: bool) -> String {
  let mut out = vec![output::banner("📄 Upload Your Document", PAGE_WIDTH, '=')];

  out.push(format!("Drop your {} or {} file here", ".txt".bold(), ".pdf".bold()));
  out.push("or select a file (max 10MB)".dimmed().to_string());

  if let Some(file) = selected {
    out.push(format!("{} ({})", file.name.green(), format_size(file.size)));
  }

  if let Some(error) = error.filter(|e| !e.is_empty()) {
    out.push(error.red().to_string());
  }

  let label = if loading { ANALYZING_LABEL } else { ANALYZE_LABEL };
  let button = format!("[ {label} ]");
  if loading || selected.is_none() {
    out.push(button.dimmed().to_string());
  } else {
    out.push(button.blue().bold().to_string());
  }

  out.join("\n")
}

pub fn render_results(result: &AnalysisResult, query: &ResultsQuery) -> String {
  let mut out = vec![output::banner("Home > Results", PAGE_WIDTH, '=')];

  out.push(String::new());
  out.push("Analysis Summary".bold().to_string());
  out.push(format!(
    "  {:<22}{}",
    "Total Requirements",
    result.summary.total().to_string().blue().bold()
  ));
  out.push(format!("  {:<22}{}", "Functional", result.summary.functional().to_string().green().bold()));
  out.push(format!(
    "  {:<22}{}",
    "Non-Functional",
    result.summary.non_functional().to_string().yellow().bold()
  ));
  out.push(format!("  {:<22}{}", "Ambiguities", result.summary.ambiguities().to_string().red().bold()));

  if !query.is_default() {
    out.push(String::new());
    out.push(describe_query(query).dimmed().to_string());
  }

  out.push(String::new());
  out.push("Requirements Analysis Results".bold().to_string());
  out.push(output::rule(PAGE_WIDTH, '-'));

  let visible = result.select(query);
  if visible.is_empty() {
    out.push(EMPTY_RESULTS.dimmed().to_string());
  } else {
    for requirement in visible {
      out.push(render_requirement(requirement));
    }
  }

  out.push(String::new());
  out.push("Ambiguity Highlights".bold().to_string());
  out.push(output::rule(PAGE_WIDTH, '-'));
  if result.ambiguities.is_empty() {
    out.push("None flagged.".dimmed().to_string());
  }
  for note in &result.ambiguities {
    let severity = note.severity.as_deref().map(|s| format!(" [{s}]")).unwrap_or_default();
    out.push(format!("{}{} {}", format!("{}:", note.id).yellow().bold(), severity, note.text));
  }

  out.join("\n")
}

fn render_requirement(requirement: &Requirement) -> String {
  let badge = format!("[{}]", requirement.kind);
  let badge = match requirement.kind() {
    RequirementKind::Functional => badge.green(),
    RequirementKind::NonFunctional => badge.yellow(),
    RequirementKind::Other => badge.dimmed(),
  };

  let ambiguity = format!("ambiguity: {}", requirement.ambiguity);
  let ambiguity = match requirement.ambiguity_level() {
    AmbiguityLevel::Low => ambiguity.green(),
    AmbiguityLevel::Medium => ambiguity.yellow(),
    AmbiguityLevel::High => ambiguity.red(),
  };

  let mut lines = vec![
    format!(
      "{} {} {}% {}",
      format!("{:<6}", requirement.id).blue().bold(),
      badge,
      requirement.confidence,
      ambiguity
    ),
    format!("       {}", requirement.text),
  ];
  if !requirement.suggestion.is_empty() {
    lines.push(format!("       → {}", requirement.suggestion.dimmed()));
  }
  lines.join("\n")
}

fn describe_query(query: &ResultsQuery) -> String {
  let mut parts = Vec::new();
  if !query.search.is_empty() {
    parts.push(format!("search \"{}\"", query.search));
  }
  match query.filter {
    TypeFilter::All => {}
    TypeFilter::Functional => parts.push("type Functional".to_string()),
    TypeFilter::NonFunctional => parts.push("type Non-Functional".to_string()),
  }
  if let Some(sort) = query.sort {
    let key = match sort {
      SortKey::Id => "id",
      SortKey::Type => "type",
      SortKey::Confidence => "confidence",
    };
    parts.push(format!("sorted by {key}"));
  }
  format!("Showing: {}", parts.join(", "))
}

pub fn render_history(entries: &[HistoryEntry]) -> String {
  let mut out = vec![output::banner("Analysis History", PAGE_WIDTH, '=')];

  if entries.is_empty() {
    out.push(format!("🕒 {}", EMPTY_HISTORY.dimmed()));
    out.push(EMPTY_HISTORY_HINT.dimmed().to_string());
    return out.join("\n");
  }

  for entry in entries {
    out.push(format!(
      "{}  {}  {}",
      format!("#{}", entry.id).blue(),
      entry.file_name.bold(),
      format_timestamp(&entry.timestamp).dimmed()
    ));
  }

  out.join("\n")
}

pub fn render_health(report: &HealthReport) -> String {
  let mut out = vec![output::banner("Analysis Service", PAGE_WIDTH, '=')];

  let status = if report.status.eq_ignore_ascii_case("healthy") {
    report.status.green().bold()
  } else {
    report.status.yellow().bold()
  };
  out.push(format!("Status: {status}"));

  if let Some(version) = &report.version {
    out.push(format!("Version: {version}"));
  }
  if let Some(timestamp) = &report.timestamp {
    out.push(format!("Checked: {}", format_timestamp(timestamp)));
  }
  for (name, state) in &report.services {
    out.push(format!("  - {name}: {state}"));
  }

  out.join("\n")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::{AmbiguityNote, Summary};

  fn plain() {
    colored::control::set_override(false);
  }

  fn requirement(id: &str, text: &str, kind: &str) -> Requirement {
    Requirement {
      id: id.to_string(),
      text: text.to_string(),
      kind: kind.to_string(),
      confidence: 87.0,
      ambiguity: "Medium".to_string(),
      suggestion: "Quantify the target".to_string(),
    }
  }

  fn result() -> AnalysisResult {
    AnalysisResult {
      summary: Summary { total: Some(2), functional: Some(1), ..Default::default() },
      requirements: vec![
        requirement("R1", "Users can export reports", "Functional"),
        requirement("R2", "The system should be fast", "Non-Functional"),
      ],
      ambiguities: vec![AmbiguityNote {
        id: "R2".to_string(),
        text: "'fast' is not measurable".to_string(),
        severity: Some("High".to_string()),
      }],
      ..Default::default()
    }
  }

  #[test]
  fn test_upload_view_states() {
    plain();
    let idle = render_upload(None, None, false);
    assert!(idle.contains("Upload Your Document"));
    assert!(idle.contains("[ Analyze Document ]"));

    let file = DocumentFile::in_memory("reqs.txt", Some("text/plain"), vec![0; 2048]);
    let loading = render_upload(Some(&file), None, true);
    assert!(loading.contains("reqs.txt (2.0 KB)"));
    assert!(loading.contains("[ Analyzing... ]"));

    let rejected = render_upload(None, Some("Only .txt and .pdf files are allowed."), false);
    assert!(rejected.contains("Only .txt and .pdf files are allowed."));
  }

  #[test]
  fn test_results_view_summary_and_rows() {
    plain();
    let rendered = render_results(&result(), &ResultsQuery::default());

    assert!(rendered.contains("Total Requirements    2"));
    assert!(rendered.contains("Non-Functional        0"));
    assert!(rendered.contains("Users can export reports"));
    assert!(rendered.contains("[Non-Functional] 87%"));
    assert!(rendered.contains("→ Quantify the target"));
    assert!(rendered.contains("R2: [High] 'fast' is not measurable"));
    assert!(!rendered.contains("Showing:"));
  }

  #[test]
  fn test_results_view_empty_after_search() {
    plain();
    let query = ResultsQuery { search: "nothing matches".to_string(), ..Default::default() };
    let rendered = render_results(&result(), &query);
    assert!(rendered.contains(EMPTY_RESULTS));
    assert!(rendered.contains("Showing: search \"nothing matches\""));
  }

  #[test]
  fn test_results_view_describes_filters() {
    plain();
    let query = ResultsQuery {
      search: String::new(),
      sort: Some(SortKey::Confidence),
      filter: TypeFilter::NonFunctional,
    };
    let rendered = render_results(&result(), &query);
    assert!(rendered.contains("Showing: type Non-Functional, sorted by confidence"));
    assert!(!rendered.contains("Users can export reports"));
  }

  #[test]
  fn test_history_view() {
    plain();
    let empty = render_history(&[]);
    assert!(empty.contains(EMPTY_HISTORY));
    assert!(empty.contains(EMPTY_HISTORY_HINT));

    let entries = vec![HistoryEntry {
      id: 1_717_000_000_000,
      file_name: "srs.pdf".to_string(),
      timestamp: "2024-05-29T16:26:40.000Z".to_string(),
      result: AnalysisResult::default(),
    }];
    let rendered = render_history(&entries);
    assert!(rendered.contains("#1717000000000"));
    assert!(rendered.contains("srs.pdf"));
    assert!(rendered.contains("2024"));
  }

  #[test]
  fn test_format_timestamp_falls_back_to_raw() {
    assert_eq!(format_timestamp("yesterday"), "yesterday");
    assert!(format_timestamp("2023-06-15T14:30:00.000Z").contains("2023"));
  }

  #[test]
  fn test_health_view() {
    plain();
    let mut report = HealthReport {
      status: "healthy".to_string(),
      version: Some("1.0.0".to_string()),
      ..Default::default()
    };
    report.services.insert("ml_pipeline".to_string(), "ready".to_string());

    let rendered = render_health(&report);
    assert!(rendered.contains("Status: healthy"));
    assert!(rendered.contains("Version: 1.0.0"));
    assert!(rendered.contains("  - ml_pipeline: ready"));
  }
}
