//! System git backend
//!
//! Runs the `git` binary with an isolated environment so user configuration
//! (pagers, aliases, colour) cannot change the output we parse.

use super::{CommandOutput, CommandRunner};
use crate::core::error::{EnvironmentError, ReleaseError, ReleaseResult};
use std::io;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Git backend using system git (zero crate dependencies)
#[derive(Debug, Clone, Default)]
pub struct SystemGit;

impl SystemGit {
  pub fn new() -> Self {
    Self
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to `dir`
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds safe configuration overrides
  fn git_cmd(&self, dir: &Path) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(dir);

    // Isolated environment (don't trust global config)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    // Force safe behavior (override user config)
    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII
    cmd.arg("-c").arg("color.ui=false");

    cmd
  }
}

impl CommandRunner for SystemGit {
  fn run(&self, args: &[&str], dir: &Path) -> ReleaseResult<CommandOutput> {
    if !dir.is_dir() {
      return Err(EnvironmentError::RepoNotFound { path: dir.to_path_buf() }.into());
    }

    debug!(dir = %dir.display(), "git {}", args.join(" "));

    let output = self.git_cmd(dir).args(args).output().map_err(|e| match e.kind() {
      io::ErrorKind::NotFound => ReleaseError::Environment(EnvironmentError::ToolMissing {
        tool: "git".to_string(),
      }),
      _ => ReleaseError::Io(e),
    })?;

    Ok(CommandOutput {
      stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
      stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
      success: output.status.success(),
    })
  }
}
