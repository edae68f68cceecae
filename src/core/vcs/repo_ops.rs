//! Operations on one local checkout (log, fetch, cherry-pick, dirty check)

use super::CommandRunner;
use crate::core::error::{EnvironmentError, GitError, ReleaseResult};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Log format consumed by the changelog: summary line followed by author email
const CHANGELOG_FORMAT: &str = "--pretty=format:- %s (%ae)";

/// Source file holding the version constants on a release branch
const VERSION_FILE: &str = "openpeerpower/const.py";

static VERSION_LITERAL_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(?m)^__version__\s*=\s*["']([^"']+)["']"#).expect("Invalid regex pattern for __version__")
});

static VERSION_PART_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(?m)^(MAJOR|MINOR|PATCH)_VERSION\s*=\s*["']?([0-9A-Za-z.]+)["']?"#)
    .expect("Invalid regex pattern for version parts")
});

/// One commit's author, as recorded in history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorLine {
  pub email: String,
  pub name: String,
}

/// A local checkout driven through a [`CommandRunner`]
pub struct LocalRepo<'a> {
  runner: &'a dyn CommandRunner,
  path: PathBuf,
}

impl<'a> LocalRepo<'a> {
  pub fn new(runner: &'a dyn CommandRunner, path: impl Into<PathBuf>) -> Self {
    Self {
      runner,
      path: path.into(),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Run git and require a zero exit status
  fn git(&self, args: &[&str]) -> ReleaseResult<String> {
    let output = self.runner.run(args, &self.path)?;

    if !output.success {
      return Err(
        GitError::CommandFailed {
          command: format!("git {}", args.join(" ")),
          dir: self.path.clone(),
          stderr: output.stderr,
        }
        .into(),
      );
    }

    Ok(output.stdout)
  }

  /// Raw changelog log text for `base...branch`, oldest first
  pub fn log(&self, base: &str, branch: &str) -> ReleaseResult<String> {
    let range = format!("{}...{}", base, branch);
    let output = self.runner.run(&["log", &range, CHANGELOG_FORMAT, "--reverse"], &self.path)?;

    if !output.success {
      return Err(
        EnvironmentError::BranchNotFound {
          branch: branch.to_string(),
          path: self.path.clone(),
        }
        .into(),
      );
    }

    Ok(output.stdout)
  }

  /// Fetch all remotes
  pub fn fetch(&self) -> ReleaseResult<()> {
    self.git(&["fetch"])?;
    Ok(())
  }

  /// Apply one commit onto the current branch
  pub fn cherry_pick(&self, sha: &str) -> ReleaseResult<()> {
    self.git(&["cherry-pick", sha])?;
    Ok(())
  }

  /// True when the working tree has unstaged changes
  pub fn is_dirty(&self) -> ReleaseResult<bool> {
    let stat = self.git(&["diff", "--stat"])?;
    Ok(!stat.trim().is_empty())
  }

  /// Fail with a corrective suggestion if the working tree is dirty
  pub fn ensure_clean(&self) -> ReleaseResult<()> {
    if self.is_dirty()? {
      return Err(EnvironmentError::DirtyWorkingTree { path: self.path.clone() }.into());
    }
    Ok(())
  }

  /// Contents of `file` as of `branch`
  pub fn show_file(&self, branch: &str, file: &str) -> ReleaseResult<String> {
    let spec = format!("{}:{}", branch, file);
    let output = self.runner.run(&["show", &spec], &self.path)?;

    if !output.success {
      return Err(
        EnvironmentError::BranchNotFound {
          branch: branch.to_string(),
          path: self.path.clone(),
        }
        .into(),
      );
    }

    Ok(output.stdout)
  }

  /// Version declared on `branch`
  pub fn version_of_branch(&self, branch: &str) -> ReleaseResult<String> {
    let source = self.show_file(branch, VERSION_FILE)?;
    parse_version_const(&source).ok_or_else(|| {
      EnvironmentError::BranchNotFound {
        branch: branch.to_string(),
        path: self.path.join(VERSION_FILE),
      }
      .into()
    })
  }

  /// Every commit author in history (one entry per commit)
  pub fn authors(&self) -> ReleaseResult<Vec<AuthorLine>> {
    let stdout = self.git(&["log", "--format=%ae%x09%an"])?;
    Ok(parse_author_lines(&stdout))
  }
}

/// Extract the version from the constants module
///
/// Prefers a literal `__version__ = "x"`; otherwise assembles
/// `MAJOR.MINOR.PATCH` from the individual constants.
pub fn parse_version_const(source: &str) -> Option<String> {
  if let Some(caps) = VERSION_LITERAL_RE.captures(source) {
    return Some(caps[1].to_string());
  }

  let mut major = None;
  let mut minor = None;
  let mut patch = None;
  for caps in VERSION_PART_RE.captures_iter(source) {
    let value = caps[2].to_string();
    match &caps[1] {
      "MAJOR" => major = Some(value),
      "MINOR" => minor = Some(value),
      _ => patch = Some(value),
    }
  }

  Some(format!("{}.{}.{}", major?, minor?, patch?))
}

fn parse_author_lines(stdout: &str) -> Vec<AuthorLine> {
  stdout
    .lines()
    .filter_map(|line| {
      let (email, name) = line.split_once('\t')?;
      let email = email.trim();
      if email.is_empty() {
        return None;
      }
      Some(AuthorLine {
        email: email.to_string(),
        name: name.trim().to_string(),
      })
    })
    .collect()
}
