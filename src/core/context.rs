//! Per-invocation context - build once, pass everywhere
//!
//! # Architecture
//!
//! ```text
//! main.rs:
//!   ReleaseContext::build() -> &ReleaseContext
//!   |
//!   v
//! commands/pick.rs, credits.rs, etc:
//!   fn run_*(ctx: &ReleaseContext, ...)
//! ```
//!
//! The tracker handle lives here and nowhere else. It is created when the
//! context is built and dropped when the command returns.

use crate::core::config::{ReleaseConfig, RepoKey};
use crate::core::error::{EnvironmentError, ReleaseResult};
use crate::core::vcs::{CommandRunner, LocalRepo, SystemGit};
use crate::release::PrCache;
use crate::remote::{GitHubTracker, RemoteTracker, RepoRef};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared state for one command invocation
#[derive(Clone)]
pub struct ReleaseContext {
  /// Directory relative repository paths resolve against
  pub root: PathBuf,

  pub config: Arc<ReleaseConfig>,

  pub tracker: Arc<dyn RemoteTracker>,

  pub git: Arc<dyn CommandRunner>,
}

impl ReleaseContext {
  /// Load configuration and open the tracker handle
  pub fn build(root: &Path, config_path: Option<&Path>) -> ReleaseResult<Self> {
    let config = ReleaseConfig::load(root, config_path)?;
    let tracker = GitHubTracker::new(&config)?;

    Ok(Self {
      root: root.to_path_buf(),
      config: Arc::new(config),
      tracker: Arc::new(tracker),
      git: Arc::new(SystemGit::new()),
    })
  }

  /// Assemble a context from parts
  #[cfg(test)]
  pub fn from_parts(
    root: impl Into<PathBuf>,
    config: ReleaseConfig,
    tracker: Arc<dyn RemoteTracker>,
    git: Arc<dyn CommandRunner>,
  ) -> Self {
    Self {
      root: root.into(),
      config: Arc::new(config),
      tracker,
      git,
    }
  }

  pub fn tracker(&self) -> &dyn RemoteTracker {
    self.tracker.as_ref()
  }

  /// Tracker address of a configured repository
  pub fn remote(&self, key: RepoKey) -> RepoRef {
    RepoRef::new(&self.config.organization, &self.config.repository(key).remote)
  }

  /// Tracker address of a configured repository, verified to exist
  pub fn verified_remote(&self, key: RepoKey) -> ReleaseResult<RepoRef> {
    let remote = self.remote(key);
    self.tracker().repository(&remote.owner, &remote.name)
  }

  /// Local checkout path of a configured repository
  pub fn checkout_path(&self, key: RepoKey) -> PathBuf {
    self.resolve(&self.config.repository(key).path)
  }

  /// Local checkout of a configured repository; it must exist
  pub fn checkout(&self, key: RepoKey) -> ReleaseResult<LocalRepo<'_>> {
    let path = self.checkout_path(key);
    if !path.is_dir() {
      return Err(EnvironmentError::RepoNotFound { path }.into());
    }
    Ok(LocalRepo::new(self.git.as_ref(), path))
  }

  /// Fresh pull request cache for a configured repository, verified on the tracker
  pub fn pr_cache(&self, key: RepoKey) -> ReleaseResult<PrCache<'_>> {
    Ok(PrCache::new(self.tracker(), self.verified_remote(key)?))
  }

  /// Resolve a configured path against the root
  pub fn resolve(&self, path: &Path) -> PathBuf {
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.root.join(path)
    }
  }
}
