//! Integration tests for `opp-release credits`

use crate::helpers::{TestWorkspace, run_opp_release_ok, stderr};
use anyhow::Result;

#[test]
fn test_failed_name_lookups_do_not_abort() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.commit_as("a.txt", "a", "Octo Cat", "1+octocat@users.noreply.github.com")?;
  ws.commit_as("b.txt", "b", "Octo Cat", "octocat@users.noreply.github.com")?;

  let output = run_opp_release_ok(&ws.path, &["credits", "-q", "-r", "2"])?;

  // Noreply addresses give the login without a lookup; the name lookup fails
  let page = ws.read_file("site/credits.markdown")?;
  assert!(page.starts_with("---\n"));
  assert!(page.contains("- [octocat](https://github.com/octocat) (2 commits)"), "page: {}", page);
  assert!(stderr(&output).contains("Could not resolve octocat"));

  // The initial commit author has an ordinary address: its lookup fails too
  assert!(page.contains("- Test User (1 commit)"), "page: {}", page);

  assert!(ws.file_exists("cache/login_by_email.json"));
  assert!(ws.file_exists("cache/name_by_login.json"));
  Ok(())
}

#[test]
fn test_no_cache_ignores_corrupt_cache() -> Result<()> {
  let ws = TestWorkspace::new()?;
  std::fs::create_dir_all(ws.path.join("cache"))?;
  std::fs::write(ws.path.join("cache/name_by_login.json"), "{ broken")?;

  run_opp_release_ok(&ws.path, &["credits", "--no-cache", "--quiet"])?;

  let cache = ws.read_file("cache/name_by_login.json")?;
  assert!(cache.trim_start().starts_with('{'));
  assert!(!cache.contains("broken"));
  Ok(())
}
