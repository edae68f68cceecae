//! Integration tests for `opp-release release-notes` and `unmerged-docs`

use crate::helpers::{TestWorkspace, git, run_opp_release, run_opp_release_ok, stderr, stdout};
use anyhow::Result;

#[test]
fn test_missing_checkout_reports_environment_error() -> Result<()> {
  let ws = TestWorkspace::new()?;
  std::fs::remove_dir_all(ws.core())?;

  let output = run_opp_release(&ws.path, &["release-notes"])?;

  assert_eq!(output.status.code(), Some(1));
  let err = stderr(&output);
  assert!(err.contains("Git repository not found"), "stderr: {}", err);
  assert!(err.contains("Help:"), "stderr: {}", err);
  Ok(())
}

#[test]
fn test_missing_branch_reports_environment_error() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_opp_release(&ws.path, &["release-notes", "--branch", "rc"])?;

  assert_eq!(output.status.code(), Some(1));
  let err = stderr(&output);
  assert!(err.contains("Branch 'rc' not found"), "stderr: {}", err);
  assert!(err.contains("git fetch"), "stderr: {}", err);
  Ok(())
}

#[test]
fn test_existing_notes_are_kept() -> Result<()> {
  let ws = TestWorkspace::new()?;
  std::fs::create_dir_all(ws.path.join("notes"))?;
  std::fs::write(ws.path.join("notes/0.118.0.md"), "web")?;
  std::fs::write(ws.path.join("notes/0.118.0-github.md"), "github")?;

  let output = run_opp_release_ok(&ws.path, &["release-notes", "--release", "0.118.0"])?;

  let out = stdout(&output);
  assert!(out.contains("Found existing files"), "stdout: {}", out);
  assert!(out.contains("compare/master...rc?expand=1&title=0.118.0"), "stdout: {}", out);
  assert_eq!(ws.read_file("notes/0.118.0.md")?, "web");
  Ok(())
}

#[test]
fn test_version_is_detected_from_branch() -> Result<()> {
  let ws = TestWorkspace::new()?;
  git(&ws.core(), &["branch", "rc"])?;
  std::fs::create_dir_all(ws.path.join("notes"))?;
  std::fs::write(ws.path.join("notes/0.118.0b1.md"), "web")?;
  std::fs::write(ws.path.join("notes/0.118.0b1-github.md"), "github")?;

  let output = run_opp_release_ok(&ws.path, &["release-notes"])?;

  assert!(stdout(&output).contains("Auto detected version 0.118.0b1"));
  Ok(())
}

#[test]
fn test_unreachable_tracker_is_system_error() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_opp_release(&ws.path, &["release-notes", "--release", "0.118.0", "--force-update"])?;

  assert_eq!(output.status.code(), Some(2));
  assert!(!ws.file_exists("notes/0.118.0.md"));
  Ok(())
}
