//! Release log lines
//!
//! A [`Release`] asks the local checkout for `origin/master...<branch>` and
//! turns the text into [`LogLine`]s. Nothing is memoized here: calling
//! [`Release::log_lines`] again re-runs git.

use crate::core::error::ReleaseResult;
use crate::core::vcs::LocalRepo;
use regex::Regex;
use std::sync::LazyLock;

/// Ref the release branch is compared against
pub const DEFAULT_BASE: &str = "origin/master";

/// Squash-merge titles end with `(#1234)`
static PR_REFERENCE_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\(#(\d+)\)").expect("Invalid regex pattern for PR reference"));

/// A version cut from a branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
  pub identifier: String,
  pub branch: String,
  pub base: String,
}

impl Release {
  pub fn new(identifier: impl Into<String>, branch: impl Into<String>) -> Self {
    Self {
      identifier: identifier.into(),
      branch: branch.into(),
      base: DEFAULT_BASE.to_string(),
    }
  }

  /// Log lines for this release, oldest first
  pub fn log_lines(&self, repo: &LocalRepo<'_>) -> ReleaseResult<Vec<LogLine>> {
    let text = repo.log(&self.base, &self.branch)?;
    Ok(parse_log(&text))
  }
}

/// One entry of release history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
  line: String,
  pr: Option<u64>,
}

impl LogLine {
  pub fn new(line: impl Into<String>) -> Self {
    let line = line.into();
    let pr = extract_pr_number(&line);
    Self { line, pr }
  }

  pub fn line(&self) -> &str {
    &self.line
  }

  /// Pull request referenced by the summary, if any
  pub fn pr(&self) -> Option<u64> {
    self.pr
  }
}

/// Split log text into lines, dropping a line equal to its predecessor
///
/// git occasionally repeats an entry back to back; repeats further apart are
/// genuine and kept.
pub fn parse_log(text: &str) -> Vec<LogLine> {
  let mut lines = Vec::new();
  let mut last: Option<&str> = None;

  for line in text.split('\n') {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if last == Some(line) {
      continue;
    }
    last = Some(line);
    if line.trim().is_empty() {
      continue;
    }
    lines.push(LogLine::new(line));
  }

  lines
}

/// The last `(#N)` in a line wins; earlier ones are part of the title
fn extract_pr_number(line: &str) -> Option<u64> {
  PR_REFERENCE_RE
    .captures_iter(line)
    .last()
    .and_then(|caps| caps[1].parse().ok())
}
