use std::path::PathBuf;
use thiserror::Error;

/// Fallback shown when the service rejects a document without a usable `detail`
pub const REJECTED_FALLBACK: &str = "Failed to analyze document";

/// Fallback shown when no usable response came back at all
pub const RETRY_MESSAGE: &str = "Failed to analyze document. Please try again.";

/// Reasons a file is refused before any network activity.
///
/// The display strings are the messages shown next to the upload control.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
  #[error("Only .txt and .pdf files are allowed.")]
  UnsupportedType,

  #[error("File size must be less than 10MB.")]
  TooLarge,
}

#[derive(Error, Debug)]
pub enum AnalysisError {
  /// The service answered with a non-success status
  #[error("{message}")]
  Rejected { status: u16, message: String },

  /// No response arrived (connection refused, DNS, timeout, broken body)
  #[error("Failed to analyze document. Please try again.")]
  Transport { reason: String },

  /// A success status whose body is not an analysis result
  #[error("Failed to analyze document. Please try again.")]
  InvalidResponse { reason: String },

  #[error("Could not read {name}: {source}")]
  Unreadable {
    name: String,
    #[source]
    source: std::io::Error,
  },

  #[error("Unsupported content type '{mime}' for {name}")]
  InvalidMime { name: String, mime: String },
}

impl AnalysisError {
  pub fn rejected(status: u16, detail: Option<String>) -> Self {
    let message = detail
      .filter(|detail| !detail.trim().is_empty())
      .unwrap_or_else(|| REJECTED_FALLBACK.to_string());
    Self::Rejected { status, message }
  }

  pub fn transport(reason: impl Into<String>) -> Self {
    Self::Transport { reason: reason.into() }
  }

  pub fn invalid_response(reason: impl Into<String>) -> Self {
    Self::InvalidResponse { reason: reason.into() }
  }

  /// Underlying cause for diagnostics; the display string stays user-facing
  pub fn diagnostic(&self) -> String {
    match self {
      Self::Rejected { status, message } => format!("HTTP {status}: {message}"),
      Self::Transport { reason } => format!("transport: {reason}"),
      Self::InvalidResponse { reason } => format!("invalid response: {reason}"),
      other => other.to_string(),
    }
  }
}

#[derive(Error, Debug)]
pub enum HistoryError {
  #[error("Failed to access history at {}: {source}", .path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to encode history: {0}")]
  Serialize(#[from] serde_json::Error),

  #[error("History at {} is unreadable: {source}", .path.display())]
  Corrupt {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("No history entry with id {id}")]
  NotFound { id: i64 },
}

impl HistoryError {
  pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io { path: path.into(), source }
  }
}

#[derive(Error, Debug)]
pub enum ControllerError {
  #[error("Select a .txt or .pdf file before analyzing.")]
  NoFileSelected,

  #[error("An analysis is already in progress.")]
  AlreadyLoading,

  #[error("There is no analysis result to show yet.")]
  NoResult,

  #[error("No history entry with id {0}")]
  UnknownEntry(i64),

  #[error(transparent)]
  History(#[from] HistoryError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Invalid API URL '{url}': {source}")]
  InvalidUrl {
    url: String,
    #[source]
    source: url::ParseError,
  },

  #[error("API URL '{url}' must use http or https")]
  UnsupportedScheme { url: String },
}
