//! Read-through pull request cache
//!
//! One cache per command invocation. Each number is fetched from the tracker
//! at most once; a number the tracker does not know is remembered as missing
//! and every later lookup reports NotFound again without a remote call.

use crate::core::error::{NotFoundError, ReleaseResult};
use crate::remote::{PullRequest, RemoteTracker, RepoRef};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub struct PrCache<'a> {
  tracker: &'a dyn RemoteTracker,
  repo: RepoRef,
  entries: HashMap<u64, Option<Arc<PullRequest>>>,
}

impl<'a> PrCache<'a> {
  pub fn new(tracker: &'a dyn RemoteTracker, repo: RepoRef) -> Self {
    Self {
      tracker,
      repo,
      entries: HashMap::new(),
    }
  }

  pub fn repo(&self) -> &RepoRef {
    &self.repo
  }

  /// Fetch `number` on first use; later calls return the same record
  pub fn get(&mut self, number: u64) -> ReleaseResult<Arc<PullRequest>> {
    if let Some(entry) = self.entries.get(&number) {
      return entry.clone().ok_or_else(|| self.missing(number));
    }

    debug!(repo = %self.repo, number, "fetching pull request");
    match self.tracker.pull_request(&self.repo, number) {
      Ok(pull) => {
        let pull = Arc::new(pull);
        self.entries.insert(number, Some(Arc::clone(&pull)));
        Ok(pull)
      }
      Err(err) if err.is_not_found() => {
        self.entries.insert(number, None);
        Err(err)
      }
      Err(err) => Err(err),
    }
  }

  fn missing(&self, number: u64) -> crate::core::error::ReleaseError {
    NotFoundError::PullRequest {
      repo: self.repo.to_string(),
      number,
    }
    .into()
  }
}
