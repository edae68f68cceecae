//! Integration tests for the command-line surface and configuration errors

use crate::helpers::{TestWorkspace, run_opp_release, run_opp_release_ok, stderr, stdout};
use anyhow::Result;

#[test]
fn test_help_lists_commands() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let output = run_opp_release_ok(&ws.path, &["--help"])?;
  let text = stdout(&output);

  for command in [
    "release-notes",
    "pick",
    "milestone-close",
    "milestone-list-commits",
    "unmerged-docs",
    "credits",
  ] {
    assert!(text.contains(command), "help should mention {}", command);
  }
  Ok(())
}

#[test]
fn test_invalid_docs_pattern_is_rejected() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_config("docs_pr_pattern = \"docs-without-group\"")?;

  let output = run_opp_release(&ws.path, &["unmerged-docs", "0.118.0"])?;

  assert_eq!(output.status.code(), Some(1));
  let err = stderr(&output);
  assert!(err.contains("capture group"), "stderr: {}", err);
  assert!(err.contains("Help:"), "stderr: {}", err);
  Ok(())
}

#[test]
fn test_explicit_config_path_is_used() -> Result<()> {
  let ws = TestWorkspace::new()?;
  std::fs::write(ws.path.join("broken.toml"), "organization = [")?;

  let output = run_opp_release(&ws.path, &["--config", "broken.toml", "milestone-close"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("broken.toml"));
  Ok(())
}

#[test]
fn test_unknown_repository_key_is_usage_error() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let output = run_opp_release(&ws.path, &["pick", "backend"])?;

  assert!(!output.status.success());
  assert!(stderr(&output).contains("backend"));
  Ok(())
}
