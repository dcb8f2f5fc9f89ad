//! Console logging and the server request journal
//!
//! Console output goes to stderr with a short coloured level prefix so it
//! never mixes with the CLI's rendered results on stdout. The macros exist so
//! call sites stay one-liners and can be excluded from coverage.

pub mod journal;

use colored::*;

/// Core logging function that handles the actual output
pub fn log(message: &str) {
  for line in message.lines() {
    eprintln!("{line}");
  }
}

/// Format a coloured prefix for log messages
fn format_prefix(color: Color, prefix: &str) -> String {
  format!("[{}]{:<width$}", prefix.color(color).bold(), "", width = 7 - prefix.len() - 2)
}

fn log_prefixed(color: Color, prefix: &str, message: &str) {
  let prefix = format_prefix(color, prefix);
  for line in message.lines() {
    log(&format!("{prefix} {line}"));
  }
}

pub fn verbose(message: &str) {
  log_prefixed(Color::Cyan, "verb", message);
}

/// General information
pub fn info(message: &str) {
  log_prefixed(Color::Blue, "info", message);
}

/// Something needs attention
pub fn warn(message: &str) {
  log_prefixed(Color::Yellow, "warn", message);
}

/// Something went wrong
pub fn error(message: &str) {
  log_prefixed(Color::Red, "error", message);
}

/// Something completed successfully
pub fn success(message: &str) {
  log_prefixed(Color::Green, "sccs", message);
}

#[macro_export]
macro_rules! info {
  ($msg:expr) => {
    $crate::logging::info($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! warn {
  ($msg:expr) => {
    $crate::logging::warn($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! error {
  ($msg:expr) => {
    $crate::logging::error($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! verbose {
  ($msg:expr) => {
    $crate::logging::verbose($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! success {
  ($msg:expr) => {
    $crate::logging::success($msg); // LCOV_EXCL_LINE
  };
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_prefix_is_padded_to_fixed_width() {
    colored::control::set_override(false);
    assert_eq!(format_prefix(Color::Blue, "info"), "[info] ");
    assert_eq!(format_prefix(Color::Red, "error"), "[error]");
    colored::control::unset_override();
  }

  #[test]
  fn test_multiline_messages_do_not_panic() {
    info("first line\nsecond line");
    warn("first line\nsecond line");
    error("");
    success("done");
    verbose("details");
  }
}
