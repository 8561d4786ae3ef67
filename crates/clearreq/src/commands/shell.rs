//! Interactive shell: one controller, driven by typed commands.
//!
//! Analyses run on a spawned task and report back over a channel, so the
//! shell keeps reading commands while a request is in flight.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::Result;
use clap::ValueEnum;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::clipboard;
use crate::commands::open_controller;
use crate::config::AppConfig;
use crate::controller::{AnalysisTicket, Completion, Controller, Page};
use crate::document::DocumentFile;
use crate::error::{AnalysisError, ControllerError};
use crate::export;
use crate::model::{AnalysisResult, SortKey, TypeFilter};
use crate::output::{self, Level};
use crate::views;

const PROMPT: &str = "clearreq> ";

const HELP: &str = "\
Commands:
  select <path>         choose a .txt or .pdf document
  drop <path>           same as select
  analyze               send the selected document for analysis
  home | results | history
                        switch page
  view <id>             open a history entry on the results page
  search [text]         filter requirements by text (empty clears)
  sort <id|type|confidence|none>
  filter <all|functional|non-functional>
  copy                  copy the results to the clipboard
  download [path]       save the results on screen as JSON
  export <id> [path]    save a history entry as JSON
  clear-history         delete all history entries
  help                  show this list
  quit                  leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
  Select(PathBuf),
  Drop(PathBuf),
  Analyze,
  Navigate(Page),
  View(i64),
  Search(String),
  Sort(Option<SortKey>),
  Filter(TypeFilter),
  Copy,
  Download { path: Option<PathBuf> },
  Export { id: i64, path: Option<PathBuf> },
  ClearHistory,
  Help,
  Quit,
}

impl FromStr for ShellCommand {
  type Err = String;

  fn from_str(line: &str) -> Result<Self, Self::Err> {
    let line = line.trim();
    let (name, rest) = match line.split_once(char::is_whitespace) {
      Some((name, rest)) => (name, rest.trim()),
      None => (line, ""),
    };

    let command = match name.to_lowercase().as_str() {
      "select" | "open" => ShellCommand::Select(required_path(name, rest)?),
      "drop" => ShellCommand::Drop(required_path(name, rest)?),
      "analyze" => ShellCommand::Analyze,
      "home" => ShellCommand::Navigate(Page::Home),
      "results" => ShellCommand::Navigate(Page::Results),
      "history" => ShellCommand::Navigate(Page::History),
      "view" => ShellCommand::View(parse_id(rest)?),
      "search" => ShellCommand::Search(rest.to_string()),
      "sort" => match rest {
        "" => return Err("Usage: sort <id|type|confidence|none>".to_string()),
        "none" => ShellCommand::Sort(None),
        key => ShellCommand::Sort(Some(SortKey::from_str(key, true)?)),
      },
      "filter" => ShellCommand::Filter(TypeFilter::from_str(rest, true)?),
      "copy" => ShellCommand::Copy,
      "download" => ShellCommand::Download { path: optional_path(rest) },
      "export" => {
        let (id, path) = match rest.split_once(char::is_whitespace) {
          Some((id, path)) => (id, path.trim()),
          None => (rest, ""),
        };
        ShellCommand::Export { id: parse_id(id)?, path: optional_path(path) }
      }
      "clear-history" => ShellCommand::ClearHistory,
      "help" | "?" => ShellCommand::Help,
      "quit" | "exit" => ShellCommand::Quit,
      other => return Err(format!("Unknown command '{other}'. Type 'help' for a list.")),
    };
    Ok(command)
  }
}

fn required_path(command: &str, rest: &str) -> Result<PathBuf, String> {
  optional_path(rest).ok_or_else(|| format!("Usage: {command} <path>"))
}

fn optional_path(rest: &str) -> Option<PathBuf> {
  (!rest.is_empty()).then(|| PathBuf::from(rest))
}

fn parse_id(raw: &str) -> Result<i64, String> {
  raw.trim_start_matches('#').parse().map_err(|_| format!("'{raw}' is not a history id"))
}

enum Flow {
  Continue,
  Started,
  Quit,
}

type Outcome = (AnalysisTicket, Result<AnalysisResult, AnalysisError>);
type CopyFn = Box<dyn Fn(&str) -> Result<()>>;

pub struct Shell<W: Write> {
  controller: Controller,
  out: W,
  clipboard: CopyFn,
}

pub async fn handle(config: &AppConfig) -> Result<ExitCode> {
  let controller = open_controller(config)?;
  let mut shell = Shell::new(controller, std::io::stdout());
  shell.run(BufReader::new(tokio::io::stdin())).await?;
  Ok(ExitCode::SUCCESS)
}

impl<W: Write> Shell<W> {
  pub fn new(controller: Controller, out: W) -> Self {
    Self { controller, out, clipboard: Box::new(clipboard::copy) }
  }

  /// Replace the clipboard used by `copy`
  pub fn with_clipboard(mut self, copy: impl Fn(&str) -> Result<()> + 'static) -> Self {
    self.clipboard = Box::new(copy);
    self
  }

  pub fn controller(&self) -> &Controller {
    &self.controller
  }

  pub fn into_output(self) -> W {
    self.out
  }

  /// Read commands until `quit` or end of input. At end of input, an
  /// analysis still in flight is waited for so its result is not lost.
  pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Outcome>();
    let mut lines = input.lines();
    let mut input_open = true;
    let mut in_flight = 0usize;

    self.render()?;
    self.prompt()?;

    loop {
      if !input_open && in_flight == 0 {
        break;
      }

      tokio::select! {
        line = lines.next_line(), if input_open => {
          match line? {
            Some(line) => {
              match self.dispatch(&line, &tx)? {
                Flow::Quit => break,
                Flow::Started => in_flight += 1,
                Flow::Continue => {}
              }
              self.prompt()?;
            }
            None => input_open = false,
          }
        }
        Some((ticket, outcome)) = rx.recv(), if in_flight > 0 => {
          in_flight -= 1;
          self.finish(ticket, outcome)?;
          if input_open {
            self.prompt()?;
          }
        }
        else => break,
      }
    }

    Ok(())
  }

  fn dispatch(&mut self, line: &str, tx: &mpsc::UnboundedSender<Outcome>) -> Result<Flow> {
    if line.trim().is_empty() {
      return Ok(Flow::Continue);
    }

    let command = match line.parse::<ShellCommand>() {
      Ok(command) => command,
      Err(message) => {
        self.notice(Level::Error, &message)?;
        return Ok(Flow::Continue);
      }
    };
    tracing::debug!(?command, "shell command");

    match command {
      ShellCommand::Select(path) => self.choose(path, false)?,
      ShellCommand::Drop(path) => self.choose(path, true)?,
      ShellCommand::Analyze => return self.analyze(tx),
      ShellCommand::Navigate(page) => match self.controller.navigate(page) {
        Ok(()) => self.render()?,
        Err(ControllerError::NoResult) => {
          self.notice(Level::Warn, "No analysis result yet. Analyze a document or open one from history.")?
        }
        Err(err) => self.notice(Level::Error, &err.to_string())?,
      },
      ShellCommand::View(id) => match self.controller.view_history_entry(id) {
        Ok(()) => self.render()?,
        Err(err) => self.notice(Level::Error, &err.to_string())?,
      },
      ShellCommand::Search(text) => {
        self.controller.set_search_query(text);
        self.render_results()?;
      }
      ShellCommand::Sort(key) => {
        self.controller.set_sort(key);
        self.render_results()?;
      }
      ShellCommand::Filter(filter) => {
        self.controller.set_type_filter(filter);
        self.render_results()?;
      }
      ShellCommand::Copy => self.copy()?,
      ShellCommand::Download { path } => self.download(path)?,
      ShellCommand::Export { id, path } => self.export(id, path)?,
      ShellCommand::ClearHistory => {
        let removed = self.controller.history().len();
        match self.controller.clear_history() {
          Ok(()) => {
            self.notice(Level::Success, &format!("Cleared {removed} history entries"))?;
            if self.controller.state().page == Page::History {
              self.render()?;
            }
          }
          Err(err) => self.notice(Level::Error, &err.to_string())?,
        }
      }
      ShellCommand::Help => writeln!(self.out, "{HELP}")?,
      ShellCommand::Quit => return Ok(Flow::Quit),
    }

    Ok(Flow::Continue)
  }

  fn choose(&mut self, path: PathBuf, dropped: bool) -> Result<()> {
    let file = match DocumentFile::from_path(&path, None) {
      Ok(file) => file,
      Err(err) => return self.notice(Level::Error, &format!("Could not open {}: {err}", path.display())),
    };

    // rejection is shown by the upload view through the state error
    let _ = if dropped { self.controller.drop_file(file) } else { self.controller.select_file(file) };
    if self.controller.state().page != Page::Home {
      self.controller.navigate(Page::Home)?;
    }
    self.render()
  }

  fn analyze(&mut self, tx: &mpsc::UnboundedSender<Outcome>) -> Result<Flow> {
    let ticket = match self.controller.begin_analysis() {
      Ok(ticket) => ticket,
      Err(ControllerError::AlreadyLoading) => {
        self.notice(Level::Warn, "An analysis is already running")?;
        return Ok(Flow::Continue);
      }
      Err(ControllerError::NoFileSelected) => {
        self.notice(Level::Warn, "Select a .txt or .pdf file first")?;
        return Ok(Flow::Continue);
      }
      Err(err) => return Err(err.into()),
    };

    let client = self.controller.client();
    let file = ticket.file().clone();
    let request = tokio::spawn(async move { client.analyze(&file).await });

    // every started analysis reports back, even when the request task dies
    let tx = tx.clone();
    tokio::spawn(async move {
      let outcome = request.await.unwrap_or_else(|err| {
        tracing::error!(error = %err, "analysis task ended without a result");
        Err(AnalysisError::transport(err.to_string()))
      });
      let _ = tx.send((ticket, outcome));
    });

    self.render()?;
    Ok(Flow::Started)
  }

  fn finish(&mut self, ticket: AnalysisTicket, outcome: Result<AnalysisResult, AnalysisError>) -> Result<()> {
    let name = ticket.file().name.clone();
    writeln!(self.out)?;

    match self.controller.complete_analysis(ticket, outcome) {
      Completion::Applied { entry_id } => {
        self.render()?;
        self.notice(Level::Success, &format!("Saved to history as #{entry_id}"))
      }
      Completion::Recorded { entry_id } => self.notice(
        Level::Info,
        &format!("Analysis of {name} finished; saved to history as #{entry_id}"),
      ),
      Completion::Unrecorded { shown, reason } => {
        if shown {
          self.render()?;
        }
        self.notice(Level::Warn, &format!("Analysis of {name} was not saved to history: {reason}"))
      }
      Completion::Failed { .. } => self.render(),
      Completion::Discarded => Ok(()),
    }
  }

  fn copy(&mut self) -> Result<()> {
    let Some(text) = self.controller.copy_text() else {
      return self.notice(Level::Warn, "Nothing to copy yet");
    };
    match (self.clipboard)(&text) {
      Ok(()) => self.notice(Level::Success, "Copied results to clipboard"),
      Err(err) => self.notice(Level::Error, &format!("Could not copy to clipboard: {err}")),
    }
  }

  fn download(&mut self, path: Option<PathBuf>) -> Result<()> {
    let Some(result) = self.controller.state().analysis_result.as_ref() else {
      return self.notice(Level::Warn, "No analysis result to download");
    };
    let path = path.unwrap_or_else(|| PathBuf::from(export::result_file_name(result)));
    match export::export_result(result, &path) {
      Ok(()) => self.notice(Level::Success, &format!("Saved results to {}", path.display())),
      Err(err) => self.notice(Level::Error, &err.to_string()),
    }
  }

  fn export(&mut self, id: i64, path: Option<PathBuf>) -> Result<()> {
    let Some(entry) = self.controller.history().get(id) else {
      return self.notice(Level::Error, &ControllerError::UnknownEntry(id).to_string());
    };
    let path = path.unwrap_or_else(|| PathBuf::from(export::entry_file_name(entry)));
    match export::export_result(&entry.result, &path) {
      Ok(()) => {
        let message = format!("Exported {} to {}", entry.file_name, path.display());
        self.notice(Level::Success, &message)
      }
      Err(err) => self.notice(Level::Error, &err.to_string()),
    }
  }

  fn render_results(&mut self) -> Result<()> {
    if self.controller.state().page == Page::Results {
      self.render()?;
    }
    Ok(())
  }

  fn render(&mut self) -> Result<()> {
    let page = views::render(&self.controller.screen());
    writeln!(self.out, "{page}")?;
    Ok(())
  }

  fn notice(&mut self, level: Level, message: &str) -> Result<()> {
    writeln!(self.out, "{}", output::format(level, message))?;
    Ok(())
  }

  fn prompt(&mut self) -> Result<()> {
    write!(self.out, "{PROMPT}")?;
    self.out.flush()?;
    Ok(())
  }
}
