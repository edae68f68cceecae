//! Release notes generation
//!
//! Log lines are resolved to pull requests through the shared [`PrCache`],
//! filed into sections by label, and rendered as markdown bullets followed by
//! one block of reference-style links. Each link appears in that block once,
//! however many entries point at it.
//!
//! The two variants differ in audience:
//!
//! - **Plain**: GitHub release body. `@login` and `#123` autolink there, doc
//!   links are absolute.
//! - **Web**: website post. Authors and pull requests become reference
//!   links, doc links are site-relative, and docs PR cross-references from
//!   the PR body are embedded.

use super::labels::{Category, DocLinker, LabelClass, classify_label};
use super::log::{LogLine, Release};
use super::pr_cache::PrCache;
use crate::core::error::ReleaseResult;
use crate::core::vcs::LocalRepo;
use crate::remote::{PullRequest, RepoRef};
use regex::Regex;
use std::collections::BTreeSet;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
  Plain,
  Web,
}

impl Variant {
  fn website_tags(self) -> bool {
    self == Variant::Web
  }
}

/// Number of the docs pull request referenced in `body`, if any
pub fn docs_cross_reference(pattern: &Regex, body: &str) -> Option<u64> {
  pattern.captures(body).and_then(|caps| caps.get(1)?.as_str().parse().ok())
}

pub struct ChangelogGenerator {
  linker: DocLinker,
  docs_pr_pattern: Regex,
  docs_repo: RepoRef,
}

impl ChangelogGenerator {
  pub fn new(linker: DocLinker, docs_pr_pattern: Regex, docs_repo: RepoRef) -> Self {
    Self {
      linker,
      docs_pr_pattern,
      docs_repo,
    }
  }

  /// Render the release notes for `release` (re-reads the log from `repo`)
  pub fn generate(
    &self,
    release: &Release,
    repo: &LocalRepo<'_>,
    prs: &mut PrCache<'_>,
    variant: Variant,
  ) -> ReleaseResult<String> {
    let lines = release.log_lines(repo)?;
    info!(release = %release.identifier, lines = lines.len(), ?variant, "generating release notes");
    self.render(&lines, prs, variant)
  }

  /// Render already-parsed log lines
  ///
  /// A pull request that cannot be fetched (unknown, server error, bad body)
  /// degrades to the raw log text; failures that would hit every later
  /// request (rate limit, credentials, connection) abort.
  pub fn render(&self, lines: &[LogLine], prs: &mut PrCache<'_>, variant: Variant) -> ReleaseResult<String> {
    let core_repo = prs.repo().clone();
    let mut sections: Vec<(Category, Vec<String>)> = Vec::new();
    let mut links = BTreeSet::new();

    for line in lines {
      let (category, entry) = match line.pr() {
        None => (Category::Other, line.line().to_string()),
        Some(number) => match prs.get(number) {
          Ok(pull) => self.render_pull(&pull, &core_repo, variant, &mut links),
          Err(err) if err.is_not_found() => {
            warn!(number, "pull request not found, using log text");
            (Category::Other, line.line().to_string())
          }
          Err(err) if err.is_single_request_failure() => {
            warn!(number, error = %err, "could not fetch pull request, using log text");
            (Category::Other, line.line().to_string())
          }
          Err(err) => return Err(err),
        },
      };

      match sections.iter_mut().find(|(existing, _)| *existing == category) {
        Some((_, entries)) => entries.push(entry),
        None => sections.push((category, vec![entry])),
      }
    }

    let mut output = String::new();
    for (category, entries) in &sections {
      output.push_str(&format!("## {}\n\n", category.title()));
      for entry in entries {
        output.push_str(entry);
        output.push('\n');
      }
      output.push('\n');
    }

    for link in &links {
      output.push_str(link);
      output.push('\n');
    }

    Ok(output)
  }

  fn render_pull(
    &self,
    pull: &PullRequest,
    core_repo: &RepoRef,
    variant: Variant,
    links: &mut BTreeSet<String>,
  ) -> (Category, String) {
    let mut parts = vec!["-".to_string(), pull.title.trim().to_string()];

    match variant {
      Variant::Plain => parts.push(format!("(@{} - #{})", pull.author, pull.number)),
      Variant::Web => {
        parts.push(format!("([@{}] - [#{}])", pull.author, pull.number));
        links.insert(format!("[@{0}]: https://github.com/{0}", pull.author));
        links.insert(format!("[#{}]: {}", pull.number, core_repo.pull_url(pull.number)));
      }
    }

    let mut category = None;
    for label in &pull.labels {
      match classify_label(label) {
        LabelClass::Category(found) => {
          category.get_or_insert(found);
        }
        LabelClass::Integration(_) => {
          self
            .linker
            .process_doc_label(label, &mut parts, links, variant.website_tags())
        }
        LabelClass::Unmatched => {}
      }
    }

    if variant == Variant::Web
      && let Some(docs_number) = docs_cross_reference(&self.docs_pr_pattern, &pull.body)
    {
      parts.push(format!("([docs#{}])", docs_number));
      links.insert(format!("[docs#{}]: {}", docs_number, self.docs_repo.pull_url(docs_number)));
    }

    (category.unwrap_or(Category::Other), parts.join(" "))
  }
}
