//! `unmerged-docs` command

use crate::core::config::RepoKey;
use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::release::changelog::docs_cross_reference;
use crate::release::log::LogLine;
use crate::release::{PrCache, Release};
use crate::remote::PullRequest;
use regex::Regex;
use std::sync::Arc;
use tracing::warn;

/// A code pull request whose docs counterpart is still open
#[derive(Debug)]
pub struct UnmergedDocs {
  pub code: Arc<PullRequest>,
  pub docs: Arc<PullRequest>,
}

/// Walk the log and collect docs pull requests that are not closed
///
/// Pull requests the tracker does not know are skipped with a warning.
pub fn find_unmerged_docs(
  lines: &[LogLine],
  prs: &mut PrCache<'_>,
  docs_prs: &mut PrCache<'_>,
  pattern: &Regex,
) -> ReleaseResult<Vec<UnmergedDocs>> {
  let mut unmerged = Vec::new();

  for number in lines.iter().filter_map(LogLine::pr) {
    let code = match prs.get(number) {
      Ok(pull) => pull,
      Err(err) if err.is_not_found() => {
        warn!(number, "pull request not found, skipping");
        continue;
      }
      Err(err) => return Err(err),
    };

    let Some(docs_number) = docs_cross_reference(pattern, &code.body) else {
      continue;
    };

    let docs = match docs_prs.get(docs_number) {
      Ok(pull) => pull,
      Err(err) if err.is_not_found() => {
        warn!(number, docs_number, "docs pull request not found, skipping");
        continue;
      }
      Err(err) => return Err(err),
    };

    if !docs.is_closed() {
      unmerged.push(UnmergedDocs { code, docs });
    }
  }

  Ok(unmerged)
}

/// Print code PR titles with the URL of their open docs PR
pub fn run_unmerged_docs(ctx: &ReleaseContext, branch: &str, release: &str) -> ReleaseResult<()> {
  let checkout = ctx.checkout(RepoKey::Core)?;
  let mut prs = ctx.pr_cache(RepoKey::Core)?;
  let mut docs_prs = ctx.pr_cache(RepoKey::Docs)?;

  let lines = Release::new(release, branch).log_lines(&checkout)?;
  let pattern = ctx.config.docs_pr_regex()?;

  for entry in find_unmerged_docs(&lines, &mut prs, &mut docs_prs, &pattern)? {
    println!("{}", entry.code.title);
    println!("{}", entry.docs.html_url);
    println!();
  }

  Ok(())
}
