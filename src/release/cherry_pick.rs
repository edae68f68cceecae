//! Milestone cherry-pick reconciliation
//!
//! Closed pull requests in a milestone are split into three groups: already
//! carrying the tracking label, merged and waiting to be picked, and not
//! merged yet. Waiting pull requests are picked one at a time in ascending
//! number order, each followed by applying the tracking label, and the chain
//! stops at the first failure.
//!
//! The label, not local history, is what marks a pull request as done: after
//! a conflict is resolved by hand, a rerun re-derives "already picked" from
//! the tracker.

use super::pr_cache::PrCache;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::core::vcs::LocalRepo;
use crate::remote::{Issue, Milestone, PullRequest, RemoteTracker};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Step of the chain that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickStage {
  CherryPick,
  Label,
}

impl fmt::Display for PickStage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PickStage::CherryPick => write!(f, "cherry-pick"),
      PickStage::Label => write!(f, "labeling"),
    }
  }
}

/// Where the chain stopped and why
#[derive(Debug, Clone)]
pub struct PickFailure {
  pub pull: Arc<PullRequest>,
  pub stage: PickStage,
  pub reason: String,
}

/// Outcome of one reconciliation run
#[derive(Debug, Default)]
pub struct PickReport {
  /// Already labeled before this run
  pub already_picked: Vec<Issue>,
  /// Picked (and labeled, unless the failure is at the label stage) this run
  pub picked: Vec<(Arc<PullRequest>, Issue)>,
  pub not_merged: Vec<(Arc<PullRequest>, Issue)>,
  pub failure: Option<PickFailure>,
}

impl PickReport {
  pub fn succeeded(&self) -> bool {
    self.failure.is_none()
  }

  /// Error to surface after the report has been shown
  pub fn error(&self) -> Option<ReleaseError> {
    self.failure.as_ref().map(|failure| ReleaseError::Reconciliation {
      number: failure.pull.number,
      reason: format!("{} step failed: {}", failure.stage, failure.reason),
    })
  }

  /// Text report: previously picked, just picked, not merged yet
  pub fn render(&self) -> String {
    let mut output = String::new();

    output.push_str("Previously Picked\n\n");
    for issue in &self.already_picked {
      output.push_str(&entry(&issue.title, &issue.author, issue.number));
    }

    output.push_str("\nJust Picked\n\n");
    for (pull, _) in &self.picked {
      output.push_str(&entry(&pull.title, &pull.author, pull.number));
    }

    output.push_str("\nNot Merged Yet\n\n");
    for (pull, _) in &self.not_merged {
      output.push_str(&entry(&pull.title, &pull.author, pull.number));
    }

    output
  }
}

fn entry(title: &str, author: &str, number: u64) -> String {
  format!("- {} (@{} - #{})\n", title, author, number)
}

pub struct CherryPickReconciler<'a> {
  tracker: &'a dyn RemoteTracker,
  checkout: &'a LocalRepo<'a>,
  tracking_label: String,
}

impl<'a> CherryPickReconciler<'a> {
  pub fn new(tracker: &'a dyn RemoteTracker, checkout: &'a LocalRepo<'a>, tracking_label: impl Into<String>) -> Self {
    Self {
      tracker,
      checkout,
      tracking_label: tracking_label.into(),
    }
  }

  /// Classify the milestone's pull requests and pick the merged ones
  ///
  /// Tracker failures while classifying are returned as `Err` before anything
  /// is picked. Failures inside the pick chain are recorded in the report.
  pub fn reconcile(&self, milestone: &Milestone, prs: &mut PrCache<'_>) -> ReleaseResult<PickReport> {
    let mut issues = self.tracker.closed_issues(prs.repo(), milestone.number)?;
    issues.sort_by_key(|issue| issue.number);

    let mut report = PickReport::default();
    let mut to_pick = Vec::new();

    for issue in issues {
      if !issue.is_pull_request {
        continue;
      }

      if issue.has_label(&self.tracking_label) {
        info!("Already cherry picked: {} (#{})", issue.title, issue.number);
        report.already_picked.push(issue);
        continue;
      }

      let pull = prs.get(issue.number)?;
      if !pull.merged {
        info!("Not merged yet: {} (#{})", pull.title, pull.number);
        report.not_merged.push((pull, issue));
        continue;
      }

      to_pick.push((pull, issue));
    }

    for (pull, issue) in to_pick {
      info!("Cherry picking {} ({})", pull.title, pull.html_url);

      let picked = match pull.merge_commit_sha.as_deref() {
        Some(sha) => self.checkout.cherry_pick(sha).map_err(|e| e.to_string()),
        None => Err("pull request has no merge commit".to_string()),
      };
      if let Err(reason) = picked {
        warn!(number = pull.number, "cherry-pick failed, stopping");
        report.failure = Some(PickFailure {
          pull,
          stage: PickStage::CherryPick,
          reason,
        });
        break;
      }

      let labeled = self.tracker.add_label(prs.repo(), issue.number, &self.tracking_label);
      report.picked.push((Arc::clone(&pull), issue));
      if let Err(err) = labeled {
        warn!(number = pull.number, "picked but labeling failed, stopping");
        report.failure = Some(PickFailure {
          pull,
          stage: PickStage::Label,
          reason: err.to_string(),
        });
        break;
      }
    }

    Ok(report)
  }
}

/// Merge commits of merged pull requests in the milestone, ascending issue order
pub fn milestone_merge_commits(
  tracker: &dyn RemoteTracker,
  milestone: &Milestone,
  prs: &mut PrCache<'_>,
) -> ReleaseResult<Vec<String>> {
  let mut issues = tracker.closed_issues(prs.repo(), milestone.number)?;
  issues.sort_by_key(|issue| issue.number);

  let mut commits = Vec::new();
  for issue in issues.iter().filter(|issue| issue.is_pull_request) {
    let pull = prs.get(issue.number)?;
    if pull.merged
      && let Some(sha) = &pull.merge_commit_sha
    {
      commits.push(sha.clone());
    }
  }

  Ok(commits)
}
