//! `pick` command

use super::resolve_milestone;
use crate::core::config::RepoKey;
use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::release::CherryPickReconciler;
use tracing::info;

/// Cherry-pick every merged, unlabeled pull request of a milestone
///
/// The report is always printed before a failure is returned.
pub fn run_pick(ctx: &ReleaseContext, repository: RepoKey, milestone: Option<&str>) -> ReleaseResult<()> {
  let checkout = ctx.checkout(repository)?;
  checkout.ensure_clean()?;

  let mut prs = ctx.pr_cache(repository)?;
  println!("Repository {}", prs.repo());
  let milestone = resolve_milestone(ctx.tracker(), prs.repo(), milestone)?;

  checkout.fetch()?;

  let report = CherryPickReconciler::new(ctx.tracker(), &checkout, ctx.config.tracking_label.as_str())
    .reconcile(&milestone, &mut prs)?;

  println!();
  print!("{}", report.render());

  if report.succeeded() {
    info!(milestone = %milestone.title, picked = report.picked.len(), "milestone reconciled");
  }

  match report.error() {
    Some(err) => Err(err),
    None => Ok(()),
  }
}
