//! User-facing status lines and banners.
//!
//! Status lines carry a colored level tag and go to stderr so rendered pages
//! on stdout stay pipeable. `format` returns the line instead of
//! printing it, for callers that own their writer.

use colored::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
  Info,
  Warn,
  Error,
  Success,
}

impl Level {
  fn tag(&self) -> ColoredString {
    match self {
      Level::Info => "info".blue().bold(),
      Level::Warn => "warn".yellow().bold(),
      Level::Error => "error".red().bold(),
      Level::Success => "sccs".green().bold(),
    }
  }
}

/// `[tag]` padded to a fixed column, one prefixed line per message line
pub fn format(level: Level, message: &str) -> String {
  let prefix = format!("[{}]{:<width$}", level.tag(), "", width = 6 - tag_len(level));
  message.lines().map(|line| format!("{prefix} {line}")).collect::<Vec<_>>().join("\n")
}

fn tag_len(level: Level) -> usize {
  match level {
    Level::Error => 5,
    _ => 4,
  }
}

fn emit(level: Level, message: &str) {
  let formatted = format(level, message);
  if !formatted.is_empty() {
    eprintln!("{formatted}");
  }
}

pub fn info(message: &str) {
  emit(Level::Info, message);
}

pub fn warn(message: &str) {
  emit(Level::Warn, message);
}

pub fn error(message: &str) {
  emit(Level::Error, message);
}

pub fn success(message: &str) {
  emit(Level::Success, message);
}

pub fn rule(width: usize, fill: char) -> String {
  fill.to_string().repeat(width)
}

/// Title framed by two rules, as a page header
pub fn banner(title: &str, width: usize, fill: char) -> String {
  let line = rule(width, fill);
  format!("{}\n{}\n{}", line, title.bold(), line)
}
