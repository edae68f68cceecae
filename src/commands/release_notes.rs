//! `release-notes` command

use crate::core::config::RepoKey;
use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseResult, ResultExt};
use crate::release::labels::DocLinker;
use crate::release::{ChangelogGenerator, Release, Variant};
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Compare view for opening the release pull request
pub fn compare_link(ctx: &ReleaseContext, branch: &str, release: &str) -> String {
  let core = ctx.remote(RepoKey::Core);
  format!(
    "https://github.com/{}/{}/compare/master...{}?expand=1&title={}",
    core.owner, core.name, branch, release
  )
}

/// Website (web variant) and GitHub (plain variant) note files for a release
pub fn note_paths(ctx: &ReleaseContext, release: &str) -> (PathBuf, PathBuf) {
  let data_dir = ctx.resolve(&ctx.config.data_dir);
  (
    data_dir.join(format!("{}.md", release)),
    data_dir.join(format!("{}-github.md", release)),
  )
}

/// Generate both release note variants for `branch`
pub fn run_release_notes(
  ctx: &ReleaseContext,
  branch: &str,
  release: Option<String>,
  force_update: bool,
) -> ReleaseResult<()> {
  let checkout = ctx.checkout(RepoKey::Core)?;

  let release = match release {
    Some(release) => release,
    None => {
      let detected = checkout.version_of_branch(branch)?;
      println!("Auto detected version {}", detected);
      detected
    }
  };

  println!("PR link: {}", compare_link(ctx, branch, &release));

  let (file_website, file_github) = note_paths(ctx, &release);
  if !force_update && file_website.is_file() && file_github.is_file() {
    println!("Found existing files");
    println!("{}", file_website.display());
    println!("{}", file_github.display());
    return Ok(());
  }

  let mut prs = ctx.pr_cache(RepoKey::Core)?;
  let generator = ChangelogGenerator::new(
    DocLinker::new(&ctx.config.site_url),
    ctx.config.docs_pr_regex()?,
    ctx.remote(RepoKey::Docs),
  );
  let release = Release::new(release, branch);

  if let Some(parent) = file_website.parent() {
    fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
  }

  for (file, variant) in [(&file_website, Variant::Web), (&file_github, Variant::Plain)] {
    let notes = generator.generate(&release, &checkout, &mut prs, variant)?;
    println!("Writing {}", file.display());
    fs::write(file, notes).with_context(|| format!("Failed to write {}", file.display()))?;
  }

  info!(release = %release.identifier, "release notes written");
  Ok(())
}
