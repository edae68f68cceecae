//! Milestone lookup helpers

use super::{Milestone, RemoteTracker, RepoRef};
use crate::core::error::{NotFoundError, ReleaseResult};
use semver::Version;

/// Find a milestone (open or closed) by exact title
pub fn milestone_by_title(tracker: &dyn RemoteTracker, repo: &RepoRef, title: &str) -> ReleaseResult<Milestone> {
  tracker
    .milestones(repo)?
    .into_iter()
    .find(|milestone| milestone.title == title)
    .ok_or_else(|| {
      NotFoundError::Milestone {
        repo: repo.to_string(),
        title: title.to_string(),
      }
      .into()
    })
}

/// The open milestone with the highest version-like title
pub fn latest_version_milestone(tracker: &dyn RemoteTracker, repo: &RepoRef) -> ReleaseResult<Milestone> {
  tracker
    .milestones(repo)?
    .into_iter()
    .filter(Milestone::is_open)
    .filter_map(|milestone| milestone_version(&milestone.title).map(|version| (version, milestone)))
    .max_by(|(a, _), (b, _)| a.cmp(b))
    .map(|(_, milestone)| milestone)
    .ok_or_else(|| NotFoundError::NoVersionMilestone { repo: repo.to_string() }.into())
}

/// Parse a milestone title as a version; `0.118` reads as `0.118.0`
pub fn milestone_version(title: &str) -> Option<Version> {
  let title = title.trim().trim_start_matches('v');
  let padded = match title.matches('.').count() {
    0 => format!("{}.0.0", title),
    1 => format!("{}.0", title),
    _ => title.to_string(),
  };
  Version::parse(&padded).ok()
}
