//! Version-control collaborator
//!
//! The rest of the crate only sees [`CommandRunner`]: a black box that runs a
//! git command in a directory and hands back its output. [`SystemGit`] is the
//! real implementation; tests substitute scripted runners.

mod repo_ops;
pub mod system_git;

#[cfg(test)]
pub mod fake;

pub use repo_ops::{AuthorLine, LocalRepo};
pub use system_git::SystemGit;

use crate::core::error::ReleaseResult;
use std::path::Path;

/// Captured output of one command
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
  pub stdout: String,
  pub stderr: String,
  pub success: bool,
}

/// Runs version-control commands
///
/// Implementations return `Ok` for any command that ran, whatever its exit
/// status; only failure to launch the tool is an `Err`.
pub trait CommandRunner: Send + Sync {
  fn run(&self, args: &[&str], dir: &Path) -> ReleaseResult<CommandOutput>;
}
