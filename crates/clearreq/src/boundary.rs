//! Top-level failure boundary.
//!
//! Anything that escapes a command handler, or panics while rendering, is
//! shown as a generic failure panel instead of a raw error. Development mode
//! adds the error chain (or panic message, location and stack) for diagnosis.

use std::backtrace::Backtrace;

use colored::*;

use crate::output;

pub const FAILURE_TITLE: &str = "Something went wrong.";
pub const FAILURE_BODY: &str =
  "An unexpected error occurred. Please try again or contact support if the problem persists.";

/// Exit status used when the boundary triggers
pub const FAILURE_EXIT_CODE: u8 = 2;

pub fn failure_panel(details: Option<&str>) -> String {
  let mut out = vec![
    output::rule(60, '*').red().to_string(),
    FAILURE_TITLE.red().bold().to_string(),
    FAILURE_BODY.to_string(),
  ];

  if let Some(details) = details {
    out.push(String::new());
    out.push("Details:".dimmed().to_string());
    for line in details.lines() {
      out.push(format!("  {line}"));
    }
  }

  out.push(output::rule(60, '*').red().to_string());
  out.join("\n")
}

/// Panel for an error that escaped a command
pub fn report(err: &anyhow::Error, dev_mode: bool) -> String {
  tracing::error!(error = ?err, "command failed");
  if dev_mode {
    let chain = err.chain().map(|cause| cause.to_string()).collect::<Vec<_>>().join("\ncaused by: ");
    failure_panel(Some(&chain))
  } else {
    failure_panel(None)
  }
}

/// Replace the default panic output with the failure panel
pub fn install_panic_hook(dev_mode: bool) {
  std::panic::set_hook(Box::new(move |info| {
    let details = dev_mode.then(|| {
      let message = info
        .payload()
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| info.payload().downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic".to_string());
      let location = info.location().map(|location| format!("{}:{}", location.file(), location.line()));
      describe_panic(&message, location.as_deref(), &Backtrace::force_capture())
    });
    eprintln!("{}", failure_panel(details.as_deref()));
  }));
}

/// Development-mode details for a panic
pub fn describe_panic(message: &str, location: Option<&str>, backtrace: &Backtrace) -> String {
  let mut details = message.to_string();
  if let Some(location) = location {
    details.push_str(&format!("\nat {location}"));
  }
  details.push_str(&format!("\nstack backtrace:\n{backtrace}"));
  details
}
