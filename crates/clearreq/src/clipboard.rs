use std::io::Write;

use anyhow::{bail, Result};
use base64::Engine;

/// OSC 52 escape that asks the terminal to place `text` on the clipboard
pub fn osc52_sequence(text: &str) -> String {
  let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
  format!("\x1b]52;c;{encoded}\x07")
}

/// Copy `text` to the system clipboard through the attached terminal.
/// Most modern terminals (kitty, iTerm2, WezTerm, Ghostty, tmux with
/// `set-clipboard on`) honour OSC 52.
pub fn copy(text: &str) -> Result<()> {
  if !console::Term::stdout().is_term() {
    bail!("stdout is not a terminal; use --print to write the text instead");
  }

  let mut stdout = std::io::stdout();
  stdout.write_all(osc52_sequence(text).as_bytes())?;
  stdout.flush()?;
  Ok(())
}
