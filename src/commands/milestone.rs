//! `milestone-close` and `milestone-list-commits` commands

use super::resolve_milestone;
use crate::core::config::RepoKey;
use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::release::cherry_pick::milestone_merge_commits;
use crate::remote::MilestoneState;
use crate::remote::milestone::milestone_by_title;
use tracing::info;

/// Close a core milestone (latest version milestone when no title is given)
pub fn run_milestone_close(ctx: &ReleaseContext, milestone: Option<&str>) -> ReleaseResult<()> {
  let remote = ctx.verified_remote(RepoKey::Core)?;
  let milestone = resolve_milestone(ctx.tracker(), &remote, milestone)?;

  ctx
    .tracker()
    .update_milestone(&remote, milestone.number, MilestoneState::Closed)?;
  info!(milestone = %milestone.title, "milestone closed");
  println!("Closed milestone {}", milestone.title);
  Ok(())
}

/// Print the merge commits of a milestone, space separated
pub fn run_milestone_list_commits(ctx: &ReleaseContext, repository: RepoKey, title: &str) -> ReleaseResult<()> {
  let mut prs = ctx.pr_cache(repository)?;
  let milestone = milestone_by_title(ctx.tracker(), prs.repo(), title)?;

  let commits = milestone_merge_commits(ctx.tracker(), &milestone, &mut prs)?;
  println!("{}", commits.join(" "));
  Ok(())
}
