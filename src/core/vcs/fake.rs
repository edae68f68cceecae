//! Scripted command runner for unit tests

use super::{CommandOutput, CommandRunner};
use crate::core::error::ReleaseResult;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Answers by git subcommand (`log`, `show`, `cherry-pick`, ...)
///
/// Unscripted subcommands succeed with empty output. Every invocation is
/// recorded as `"<args joined by spaces>"`.
#[derive(Default)]
pub struct FakeRunner {
  responses: Mutex<HashMap<String, CommandOutput>>,
  calls: Mutex<Vec<String>>,
}

impl FakeRunner {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn respond(&self, subcommand: &str, stdout: &str) {
    self.responses.lock().unwrap().insert(
      subcommand.to_string(),
      CommandOutput {
        stdout: stdout.to_string(),
        stderr: String::new(),
        success: true,
      },
    );
  }

  pub fn fail(&self, subcommand: &str, stderr: &str) {
    self.responses.lock().unwrap().insert(
      subcommand.to_string(),
      CommandOutput {
        stdout: String::new(),
        stderr: stderr.to_string(),
        success: false,
      },
    );
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }
}

impl CommandRunner for FakeRunner {
  fn run(&self, args: &[&str], _dir: &Path) -> ReleaseResult<CommandOutput> {
    self.calls.lock().unwrap().push(args.join(" "));
    let subcommand = args.first().copied().unwrap_or_default();
    let scripted = self.responses.lock().unwrap().get(subcommand).cloned();
    Ok(scripted.unwrap_or(CommandOutput {
      success: true,
      ..CommandOutput::default()
    }))
  }
}
