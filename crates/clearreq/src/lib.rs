pub mod boundary;
pub mod client;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod controller;
pub mod document;
pub mod error;
pub mod export;
pub mod history;
pub mod model;
pub mod output;
pub mod validator;
pub mod views;

// Re-export commonly used types for easier testing
pub use client::{AnalysisClient, HttpAnalysisClient};
pub use config::{AppConfig, ClientConfig};
pub use controller::{Completion, Controller, Page, Screen};
pub use document::DocumentFile;
pub use error::{AnalysisError, ControllerError, HistoryError, ValidationError};
pub use history::HistoryStore;
pub use model::{AnalysisResult, HistoryEntry, Requirement, ResultsQuery, SortKey, TypeFilter};
