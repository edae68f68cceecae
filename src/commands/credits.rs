//! `credits` command

use crate::core::config::RepoKey;
use crate::core::context::ReleaseContext;
use crate::core::error::{ConfigError, EnvironmentError, ReleaseError, ReleaseResult, ResultExt};
use crate::core::vcs::AuthorLine;
use crate::credits::{CreditsOptions, CreditsPipeline, render_page};
use crate::ui::progress::MultiProgress;
use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Commit authors across the configured repositories
///
/// A checkout that does not exist is skipped with a warning.
pub fn collect_authors(ctx: &ReleaseContext, repositories: &[RepoKey]) -> ReleaseResult<Vec<AuthorLine>> {
  if repositories.is_empty() {
    return Err(
      ConfigError::MissingField {
        field: "credits_repositories".to_string(),
      }
      .into(),
    );
  }

  let mut authors = Vec::new();
  for &key in repositories {
    let checkout = match ctx.checkout(key) {
      Ok(checkout) => checkout,
      Err(ReleaseError::Environment(EnvironmentError::RepoNotFound { path })) => {
        warn!(repository = %key, path = %path.display(), "checkout not found, skipping");
        continue;
      }
      Err(err) => return Err(err),
    };

    let found = checkout.authors()?;
    info!(repository = %key, path = %checkout.path().display(), commits = found.len(), "read commit authors");
    authors.extend(found);
  }

  Ok(authors)
}

/// Resolve contributor names and write the credits page
pub fn run_credits(ctx: &ReleaseContext, simul_requests: usize, no_cache: bool, quiet: bool) -> ReleaseResult<PathBuf> {
  let authors = collect_authors(ctx, &ctx.config.credits_repositories)?;

  let options = CreditsOptions {
    simul_requests,
    use_cache: !no_cache,
    progress: if quiet { MultiProgress::hidden() } else { MultiProgress::new() },
  };
  let report = CreditsPipeline::new(ctx.tracker(), ctx.resolve(&ctx.config.cache_dir), options).run(&authors)?;

  let output = ctx.resolve(&ctx.config.credits_output);
  if let Some(parent) = output.parent() {
    fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
  }
  fs::write(&output, render_page(&report.roster, Utc::now()))
    .with_context(|| format!("Failed to write {}", output.display()))?;

  for failure in &report.failures {
    eprintln!("Could not resolve {}: {}", failure.key, failure.reason);
  }
  if !quiet {
    println!("Wrote {} contributors to {}", report.roster.len(), output.display());
  }

  Ok(output)
}
