//! CLI commands for opp-release
//!
//! ## Release notes
//! - **release_notes**: plain and web release notes for a release branch
//! - **unmerged_docs**: docs pull requests still open for a release
//!
//! ## Milestones
//! - **pick**: cherry-pick a milestone's merged pull requests
//! - **milestone**: close a milestone, list its merge commits
//!
//! ## Contributors
//! - **credits**: regenerate the credits page
//!
//! All commands accept `&ReleaseContext`, built once in `main`.

pub mod credits;
pub mod milestone;
pub mod pick;
pub mod release_notes;
pub mod unmerged_docs;

pub use credits::run_credits;
pub use milestone::{run_milestone_close, run_milestone_list_commits};
pub use pick::run_pick;
pub use release_notes::run_release_notes;
pub use unmerged_docs::run_unmerged_docs;

use crate::core::error::ReleaseResult;
use crate::remote::milestone::{latest_version_milestone, milestone_by_title};
use crate::remote::{Milestone, RemoteTracker, RepoRef};

/// Milestone by title, or the latest open version milestone when no title is given
fn resolve_milestone(tracker: &dyn RemoteTracker, repo: &RepoRef, title: Option<&str>) -> ReleaseResult<Milestone> {
  match title {
    Some(title) => milestone_by_title(tracker, repo, title),
    None => {
      let milestone = latest_version_milestone(tracker, repo)?;
      println!("No milestone passed in. Found {}", milestone.title);
      Ok(milestone)
    }
  }
}

/// Context over a scratch root with `core`, `frontend` and `docs` checkouts
#[cfg(test)]
pub(crate) fn test_context(
  root: &std::path::Path,
  tracker: std::sync::Arc<crate::remote::fake::FakeTracker>,
  runner: std::sync::Arc<crate::core::vcs::fake::FakeRunner>,
) -> crate::core::context::ReleaseContext {
  use crate::core::config::ReleaseConfig;

  let mut config = ReleaseConfig::default();
  config.repositories.core.path = "core".into();
  config.repositories.frontend.path = "frontend".into();
  config.repositories.docs.path = "docs".into();
  config.credits_output = "site/credits.markdown".into();
  for dir in ["core", "frontend", "docs"] {
    std::fs::create_dir_all(root.join(dir)).unwrap();
  }

  crate::core::context::ReleaseContext::from_parts(root, config, tracker, runner)
}
