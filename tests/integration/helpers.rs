//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Tracker URL nothing listens on; any remote call fails fast
pub const UNREACHABLE_API: &str = "http://127.0.0.1:1";

/// A scratch directory holding `opp-release.toml` and a `core` checkout
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  /// Create a workspace whose core checkout has one commit on `main`
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();
    let core = path.join("core");
    std::fs::create_dir_all(&core)?;

    git(&core, &["init", "--initial-branch=main"])?;
    git(&core, &["config", "user.name", "Test User"])?;
    git(&core, &["config", "user.email", "test@example.com"])?;

    std::fs::create_dir_all(core.join("openpeerpower"))?;
    std::fs::write(
      core.join("openpeerpower/const.py"),
      "MAJOR_VERSION = 0\nMINOR_VERSION = 118\nPATCH_VERSION = \"0b1\"\n",
    )?;
    git(&core, &["add", "."])?;
    git(&core, &["commit", "-m", "Initial commit"])?;

    let workspace = Self { _root: root, path };
    workspace.write_config("")?;
    Ok(workspace)
  }

  /// Write `opp-release.toml`; `extra` is appended to the top-level keys
  pub fn write_config(&self, extra: &str) -> Result<()> {
    let config = format!(
      r#"api_url = "{api}"
token_env = "OPP_RELEASE_TEST_TOKEN_UNSET"
data_dir = "notes"
cache_dir = "cache"
credits_output = "site/credits.markdown"
credits_repositories = ["core"]
{extra}

[repositories.core]
remote = "core"
path = "core"

[repositories.frontend]
remote = "frontend"
path = "frontend"

[repositories.docs]
remote = "open-peer-power.io"
path = "docs"
"#,
      api = UNREACHABLE_API,
      extra = extra,
    );
    std::fs::write(self.path.join("opp-release.toml"), config)?;
    Ok(())
  }

  pub fn core(&self) -> PathBuf {
    self.path.join("core")
  }

  /// Commit a file in the core checkout as the given author
  pub fn commit_as(&self, file: &str, content: &str, name: &str, email: &str) -> Result<()> {
    let core = self.core();
    std::fs::write(core.join(file), content)?;
    git(&core, &["add", "."])?;
    let author = format!("{} <{}>", name, email);
    git(&core, &["commit", "-m", &format!("Update {}", file), "--author", &author])?;
    Ok(())
  }

  /// Check if a file exists
  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  /// Read a file
  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the opp-release binary; the exit status is left to the caller
pub fn run_opp_release(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_opp-release");

  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .env_remove("RUST_LOG")
    .output()
    .context("Failed to run opp-release")
}

/// Run the opp-release binary and require success
pub fn run_opp_release_ok(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_opp_release(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "opp-release command failed: opp-release {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).to_string()
}
