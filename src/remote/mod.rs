//! Remote issue tracker collaborator
//!
//! Commands talk to the tracker only through [`RemoteTracker`]. The handle is
//! created once per command invocation (see `core::context`) and passed into
//! every component that needs it.
//!
//! - **github**: REST implementation over a blocking HTTP client
//! - **milestone**: milestone lookup by title and latest version milestone

pub mod github;
pub mod milestone;

#[cfg(test)]
pub mod fake;

pub use github::GitHubTracker;

use crate::core::error::ReleaseResult;
use std::fmt;

/// Repository address on the tracker
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
  pub owner: String,
  pub name: String,
}

impl RepoRef {
  pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      owner: owner.into(),
      name: name.into(),
    }
  }

  /// Web URL of a pull request in this repository
  pub fn pull_url(&self, number: u64) -> String {
    format!("https://github.com/{}/{}/pull/{}", self.owner, self.name, number)
  }
}

impl fmt::Display for RepoRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.owner, self.name)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Milestone {
  pub number: u64,
  pub title: String,
  pub state: String,
}

impl Milestone {
  pub fn is_open(&self) -> bool {
    self.state == MilestoneState::Open.as_str()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneState {
  Open,
  Closed,
}

impl MilestoneState {
  pub fn as_str(self) -> &'static str {
    match self {
      MilestoneState::Open => "open",
      MilestoneState::Closed => "closed",
    }
  }
}

/// An issue; pull requests are issues with `is_pull_request` set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
  pub number: u64,
  pub title: String,
  pub labels: Vec<String>,
  pub is_pull_request: bool,
  pub state: String,
  pub author: String,
}

impl Issue {
  pub fn has_label(&self, name: &str) -> bool {
    self.labels.iter().any(|label| label == name)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
  pub number: u64,
  pub title: String,
  pub body: String,
  pub author: String,
  pub merge_commit_sha: Option<String>,
  pub merged: bool,
  pub labels: Vec<String>,
  pub state: String,
  pub html_url: String,
}

impl PullRequest {
  pub fn is_closed(&self) -> bool {
    self.state == "closed"
  }
}

/// Source of milestone, issue, pull request and user records
///
/// All calls block until the tracker answers. Missing records surface as
/// `ReleaseError::NotFound`, except the two identity lookups which return
/// `Ok(None)`.
pub trait RemoteTracker: Send + Sync {
  /// Verify a repository exists and return its address
  fn repository(&self, owner: &str, name: &str) -> ReleaseResult<RepoRef>;

  /// All milestones, open and closed
  fn milestones(&self, repo: &RepoRef) -> ReleaseResult<Vec<Milestone>>;

  /// Closed issues (including pull requests) in a milestone, in tracker order
  fn closed_issues(&self, repo: &RepoRef, milestone: u64) -> ReleaseResult<Vec<Issue>>;

  fn pull_request(&self, repo: &RepoRef, number: u64) -> ReleaseResult<PullRequest>;

  fn add_label(&self, repo: &RepoRef, issue: u64, label: &str) -> ReleaseResult<()>;

  fn update_milestone(&self, repo: &RepoRef, milestone: u64, state: MilestoneState) -> ReleaseResult<()>;

  /// Display name of a user, if the account has one
  fn resolve_user_name(&self, login: &str) -> ReleaseResult<Option<String>>;

  /// Login owning a (public) email address
  fn resolve_login_by_email(&self, email: &str) -> ReleaseResult<Option<String>>;
}
