//! Integration tests for `opp-release pick`

use crate::helpers::{TestWorkspace, run_opp_release, stderr};
use anyhow::Result;

#[test]
fn test_dirty_checkout_is_refused() -> Result<()> {
  let ws = TestWorkspace::new()?;
  std::fs::write(
    ws.core().join("openpeerpower/const.py"),
    "MAJOR_VERSION = 0\nMINOR_VERSION = 119\nPATCH_VERSION = \"0\"\n",
  )?;

  let output = run_opp_release(&ws.path, &["pick", "--milestone", "0.118"])?;

  assert_eq!(output.status.code(), Some(1));
  let err = stderr(&output);
  assert!(err.contains("uncommitted changes"), "stderr: {}", err);
  assert!(err.contains("Commit or stash"), "stderr: {}", err);
  Ok(())
}

#[test]
fn test_missing_frontend_checkout() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_opp_release(&ws.path, &["pick", "f"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("frontend"));
  Ok(())
}

#[test]
fn test_clean_checkout_reaches_tracker() -> Result<()> {
  let ws = TestWorkspace::new()?;

  // Nothing listens on the configured API, so the first remote call fails
  let output = run_opp_release(&ws.path, &["pick", "--milestone", "0.118"])?;

  assert_eq!(output.status.code(), Some(2));
  assert!(stderr(&output).contains("127.0.0.1"));
  Ok(())
}
