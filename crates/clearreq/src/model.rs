use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};

/// `null` is read as the type's default, like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de> + Default,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Any JSON number is a count; fractional counts are rounded and negative
/// ones treated as missing
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
  D: Deserializer<'de>,
{
  let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
    return Ok(None);
  };
  Ok(number.as_u64().or_else(|| {
    number.as_f64().filter(|count| count.is_finite() && *count >= 0.0).map(|count| count.round() as u64)
  }))
}

/// Counts reported by the analysis service. Any count the service omits
/// is treated as zero when displayed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
  #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
  pub total: Option<u64>,
  #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
  pub functional: Option<u64>,
  #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
  pub non_functional: Option<u64>,
  #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
  pub ambiguities: Option<u64>,
}

impl Summary {
  pub fn total(&self) -> u64 {
    self.total.unwrap_or(0)
  }

  pub fn functional(&self) -> u64 {
    self.functional.unwrap_or(0)
  }

  pub fn non_functional(&self) -> u64 {
    self.non_functional.unwrap_or(0)
  }

  pub fn ambiguities(&self) -> u64 {
    self.ambiguities.unwrap_or(0)
  }
}

/// One classified statement extracted from the uploaded document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
  #[serde(default, deserialize_with = "null_as_default")]
  pub id: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub text: String,
  #[serde(rename = "type", default, deserialize_with = "null_as_default")]
  pub kind: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub confidence: f64,
  #[serde(default, deserialize_with = "null_as_default")]
  pub ambiguity: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementKind {
  Functional,
  NonFunctional,
  Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbiguityLevel {
  Low,
  Medium,
  High,
}

impl Requirement {
  pub fn kind(&self) -> RequirementKind {
    match self.kind.as_str() {
      "Functional" => RequirementKind::Functional,
      "Non-Functional" => RequirementKind::NonFunctional,
      _ => RequirementKind::Other,
    }
  }

  /// Anything the service labels other than Low or Medium is shown as High
  pub fn ambiguity_level(&self) -> AmbiguityLevel {
    match self.ambiguity.as_str() {
      "Low" => AmbiguityLevel::Low,
      "Medium" => AmbiguityLevel::Medium,
      _ => AmbiguityLevel::High,
    }
  }

  /// Case-insensitive substring match over id and text
  pub fn matches(&self, needle_lowercase: &str) -> bool {
    needle_lowercase.is_empty()
      || self.text.to_lowercase().contains(needle_lowercase)
      || self.id.to_lowercase().contains(needle_lowercase)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbiguityNote {
  #[serde(default, deserialize_with = "null_as_default")]
  pub id: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub text: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub severity: Option<String>,
}

/// Result returned by the analysis service, kept as received. Missing or
/// `null` parts read as empty rather than failing the whole analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
  #[serde(default, deserialize_with = "null_as_default")]
  pub summary: Summary,
  #[serde(default, deserialize_with = "null_as_default")]
  pub requirements: Vec<Requirement>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub ambiguities: Vec<AmbiguityNote>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub filename: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub timestamp: Option<String>,
}

impl AnalysisResult {
  /// Plain-text form used by the copy action: one `"{id}: {text} ({type})"`
  /// line per requirement.
  pub fn copy_text(&self) -> String {
    self
      .requirements
      .iter()
      .map(|req| format!("{}: {} ({})", req.id, req.text, req.kind))
      .collect::<Vec<_>>()
      .join("\n")
  }

  /// Requirements visible under `query`, in display order
  pub fn select<'a>(&'a self, query: &ResultsQuery) -> Vec<&'a Requirement> {
    let needle = query.search.to_lowercase();

    let mut visible: Vec<&Requirement> = self
      .requirements
      .iter()
      .filter(|req| req.matches(&needle))
      .filter(|req| query.filter.admits(req))
      .collect();

    match query.sort {
      None => {}
      Some(SortKey::Id) => visible.sort_by(|a, b| a.id.cmp(&b.id)),
      Some(SortKey::Type) => visible.sort_by(|a, b| a.kind.cmp(&b.kind)),
      Some(SortKey::Confidence) => visible.sort_by(|a, b| b.confidence.total_cmp(&a.confidence)),
    }

    visible
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
  Id,
  Type,
  Confidence,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TypeFilter {
  #[default]
  All,
  Functional,
  NonFunctional,
}

impl TypeFilter {
  pub fn admits(&self, requirement: &Requirement) -> bool {
    match self {
      TypeFilter::All => true,
      TypeFilter::Functional => requirement.kind() == RequirementKind::Functional,
      TypeFilter::NonFunctional => requirement.kind() == RequirementKind::NonFunctional,
    }
  }
}

/// Search, type filter and sort applied to the results table. Never
/// changes the underlying result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsQuery {
  pub search: String,
  pub sort: Option<SortKey>,
  pub filter: TypeFilter,
}

impl ResultsQuery {
  pub fn is_default(&self) -> bool {
    self == &ResultsQuery::default()
  }
}

/// One persisted past analysis, keyed by its creation time in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
  pub id: i64,
  pub file_name: String,
  pub timestamp: String,
  pub result: AnalysisResult,
}

/// Response of the service's `/health` endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
  pub status: String,
  #[serde(default)]
  pub timestamp: Option<String>,
  #[serde(default)]
  pub version: Option<String>,
  #[serde(default)]
  pub services: std::collections::BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn requirement(id: &str, text: &str, kind: &str, confidence: f64) -> Requirement {
    Requirement {
      id: id.to_string(),
      text: text.to_string(),
      kind: kind.to_string(),
      confidence,
      ambiguity: "Low".to_string(),
      suggestion: String::new(),
    }
  }

  fn sample() -> AnalysisResult {
    AnalysisResult {
      requirements: vec![
        requirement("R2", "Pages load within 2 seconds", "Non-Functional", 81.0),
        requirement("R1", "Users can log in", "Functional", 95.0),
        requirement("R3", "The UI should be nice", "Ambiguous", 40.0),
      ],
      ..Default::default()
    }
  }

  fn ids(requirements: &[&Requirement]) -> Vec<String> {
    requirements.iter().map(|r| r.id.clone()).collect()
  }

  #[test]
  fn test_copy_text_single_requirement() {
    let result = AnalysisResult {
      requirements: vec![requirement("R1", "Login", "Functional", 90.0)],
      ..Default::default()
    };
    assert_eq!(result.copy_text(), "R1: Login (Functional)");
  }

  #[test]
  fn test_copy_text_joins_with_newlines() {
    assert_eq!(
      sample().copy_text(),
      "R2: Pages load within 2 seconds (Non-Functional)\nR1: Users can log in (Functional)\nR3: The UI should be nice (Ambiguous)"
    );
  }

  #[test]
  fn test_copy_text_empty_result() {
    assert_eq!(AnalysisResult::default().copy_text(), "");
  }

  #[test]
  fn test_default_query_keeps_service_order() {
    let result = sample();
    assert_eq!(ids(&result.select(&ResultsQuery::default())), vec!["R2", "R1", "R3"]);
  }

  #[test]
  fn test_search_is_case_insensitive_over_text_and_id() {
    let result = sample();
    let by_text = ResultsQuery { search: "LOG IN".to_string(), ..Default::default() };
    assert_eq!(ids(&result.select(&by_text)), vec!["R1"]);

    let by_id = ResultsQuery { search: "r3".to_string(), ..Default::default() };
    assert_eq!(ids(&result.select(&by_id)), vec!["R3"]);
  }

  #[test]
  fn test_search_keeps_surrounding_whitespace() {
    let result = AnalysisResult {
      requirements: vec![
        requirement("R1", "Admins can relogin users", "Functional", 80.0),
        requirement("R2", "Show the user login page", "Functional", 80.0),
      ],
      ..Default::default()
    };
    let query = ResultsQuery { search: " login".to_string(), ..Default::default() };
    assert_eq!(ids(&result.select(&query)), vec!["R2"]);
  }

  #[test]
  fn test_null_parts_read_as_empty() {
    let result: AnalysisResult =
      serde_json::from_str(r#"{"summary": null, "requirements": null, "ambiguities": null}"#).unwrap();
    assert_eq!(result, AnalysisResult::default());
    assert_eq!(result.summary.total(), 0);
  }

  #[test]
  fn test_counts_accept_any_number() {
    let summary: Summary = serde_json::from_str(
      r#"{"total": 2.0, "functional": 1.6, "nonFunctional": null, "ambiguities": -1}"#,
    )
    .unwrap();
    assert_eq!(summary.total(), 2);
    assert_eq!(summary.functional(), 2);
    assert_eq!(summary.non_functional(), 0);
    assert_eq!(summary.ambiguities(), 0);
  }

  #[test]
  fn test_requirement_without_type_or_confidence() {
    let requirement: Requirement =
      serde_json::from_str(r#"{"id": "R9", "text": "Export to CSV", "confidence": null}"#).unwrap();
    assert_eq!(requirement.kind, "");
    assert_eq!(requirement.kind(), RequirementKind::Other);
    assert_eq!(requirement.confidence, 0.0);
  }

  #[test]
  fn test_type_filter_and_sort() {
    let result = sample();
    let functional = ResultsQuery { filter: TypeFilter::Functional, ..Default::default() };
    assert_eq!(ids(&result.select(&functional)), vec!["R1"]);

    let non_functional = ResultsQuery { filter: TypeFilter::NonFunctional, ..Default::default() };
    assert_eq!(ids(&result.select(&non_functional)), vec!["R2"]);

    let by_confidence = ResultsQuery { sort: Some(SortKey::Confidence), ..Default::default() };
    assert_eq!(ids(&result.select(&by_confidence)), vec!["R1", "R2", "R3"]);

    let by_id = ResultsQuery { sort: Some(SortKey::Id), ..Default::default() };
    assert_eq!(ids(&result.select(&by_id)), vec!["R1", "R2", "R3"]);

    let by_type = ResultsQuery { sort: Some(SortKey::Type), ..Default::default() };
    assert_eq!(ids(&result.select(&by_type)), vec!["R3", "R1", "R2"]);
  }

  #[test]
  fn test_select_does_not_mutate_result() {
    let result = sample();
    let before = result.clone();
    let query = ResultsQuery {
      search: "pages".to_string(),
      sort: Some(SortKey::Confidence),
      filter: TypeFilter::NonFunctional,
    };
    let _ = result.select(&query);
    assert_eq!(result, before);
  }

  #[test]
  fn test_missing_summary_fields_default_to_zero() {
    let result: AnalysisResult =
      serde_json::from_str(r#"{"summary": {"total": 3}, "requirements": [], "ambiguities": []}"#)
        .unwrap();
    assert_eq!(result.summary.total(), 3);
    assert_eq!(result.summary.functional(), 0);
    assert_eq!(result.summary.non_functional(), 0);
    assert_eq!(result.summary.ambiguities(), 0);
  }

  #[test]
  fn test_wire_field_names() {
    let json = r#"{
      "summary": {"total": 1, "functional": 1, "nonFunctional": 0, "ambiguities": 0},
      "requirements": [{"id": "R1", "text": "Login", "type": "Functional", "confidence": 92,
                        "ambiguity": "Low", "suggestion": "None"}],
      "ambiguities": [{"id": "R1", "text": "vague", "severity": "Low"}],
      "filename": "reqs.txt",
      "timestamp": "2024-05-01T10:00:00"
    }"#;
    let result: AnalysisResult = serde_json::from_str(json).unwrap();
    assert_eq!(result.summary.non_functional(), 0);
    assert_eq!(result.requirements[0].kind(), RequirementKind::Functional);
    assert_eq!(result.requirements[0].confidence, 92.0);
    assert_eq!(result.ambiguities[0].severity.as_deref(), Some("Low"));

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["summary"]["nonFunctional"], 0);
    assert_eq!(value["requirements"][0]["type"], "Functional");
  }

  #[test]
  fn test_history_entry_uses_camel_case() {
    let entry = HistoryEntry {
      id: 1_700_000_000_000,
      file_name: "srs.pdf".to_string(),
      timestamp: "2023-11-14T22:13:20.000Z".to_string(),
      result: AnalysisResult::default(),
    };
    let value = serde_json::to_value(&entry).unwrap();
    assert_eq!(value["fileName"], "srs.pdf");
    assert_eq!(value["id"], 1_700_000_000_000i64);
  }

  #[test]
  fn test_ambiguity_levels() {
    let mut req = requirement("R1", "x", "Functional", 1.0);
    assert_eq!(req.ambiguity_level(), AmbiguityLevel::Low);
    req.ambiguity = "Medium".to_string();
    assert_eq!(req.ambiguity_level(), AmbiguityLevel::Medium);
    req.ambiguity = "Severe".to_string();
    assert_eq!(req.ambiguity_level(), AmbiguityLevel::High);
  }
}
