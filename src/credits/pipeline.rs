//! Contributor identity resolution
//!
//! Two stages, each a bounded fan-out over a dedicated rayon pool:
//!
//! 1. email → login (skipped for GitHub noreply addresses)
//! 2. login → display name
//!
//! Both caches are read before the first stage and written once after the
//! second; workers never touch them. A failed lookup is recorded and the run
//! carries on with whatever it has.

use super::cache::{IdentityCache, LOGIN_BY_EMAIL, NAME_BY_LOGIN};
use crate::core::error::ReleaseResult;
use crate::core::vcs::AuthorLine;
use crate::remote::RemoteTracker;
use crate::ui::progress::MultiProgress;
use rayon::prelude::*;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// Default number of lookups in flight
pub const DEFAULT_SIMUL_REQUESTS: usize = 63;

static NOREPLY_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)^(?:\d+\+)?([A-Za-z0-9-]+)@users\.noreply\.github\.com$").expect("Invalid regex pattern for noreply email")
});

/// Login encoded in a GitHub noreply address
pub fn noreply_login(email: &str) -> Option<String> {
  NOREPLY_RE.captures(email).map(|caps| caps[1].to_string())
}

#[derive(Clone)]
pub struct CreditsOptions {
  pub simul_requests: usize,
  pub use_cache: bool,
  pub progress: MultiProgress,
}

impl Default for CreditsOptions {
  fn default() -> Self {
    Self {
      simul_requests: DEFAULT_SIMUL_REQUESTS,
      use_cache: true,
      progress: MultiProgress::hidden(),
    }
  }
}

/// One roster line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contributor {
  pub login: Option<String>,
  pub name: String,
  pub commits: usize,
}

/// A lookup that failed; `key` is the email or login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityFailure {
  pub key: String,
  pub reason: String,
}

#[derive(Debug, Default)]
pub struct CreditsReport {
  pub roster: Vec<Contributor>,
  pub failures: Vec<IdentityFailure>,
}

/// Commits grouped under one email
struct EmailAuthor {
  /// First spelling seen; noreply logins keep their case
  email: String,
  git_name: String,
  commits: usize,
}

/// Commits grouped under one account; `login` is the first spelling seen
struct LoginAuthor {
  login: String,
  commits: usize,
}

pub struct CreditsPipeline<'a> {
  tracker: &'a dyn RemoteTracker,
  cache_dir: PathBuf,
  options: CreditsOptions,
}

impl<'a> CreditsPipeline<'a> {
  pub fn new(tracker: &'a dyn RemoteTracker, cache_dir: impl Into<PathBuf>, options: CreditsOptions) -> Self {
    Self {
      tracker,
      cache_dir: cache_dir.into(),
      options,
    }
  }

  fn open_cache(&self, file: &str) -> ReleaseResult<IdentityCache> {
    let path = self.cache_dir.join(file);
    if self.options.use_cache {
      IdentityCache::load(path)
    } else {
      Ok(IdentityCache::empty(path))
    }
  }

  /// Resolve every author to a roster entry, sorted by display name
  pub fn run(&self, authors: &[AuthorLine]) -> ReleaseResult<CreditsReport> {
    let mut by_email: BTreeMap<String, EmailAuthor> = BTreeMap::new();
    for author in authors {
      let email = author.email.trim().to_lowercase();
      if email.is_empty() {
        continue;
      }
      by_email
        .entry(email)
        .or_insert_with(|| EmailAuthor {
          email: author.email.trim().to_string(),
          git_name: author.name.trim().to_string(),
          commits: 0,
        })
        .commits += 1;
    }
    info!(authors = by_email.len(), commits = authors.len(), "resolving contributors");

    let mut logins = self.open_cache(LOGIN_BY_EMAIL)?;
    let mut names = self.open_cache(NAME_BY_LOGIN)?;
    debug!(logins = logins.len(), names = names.len(), "identity caches ready");
    let mut failures = Vec::new();

    // Stage 1: email → login
    let mut login_of: BTreeMap<&str, Option<String>> = BTreeMap::new();
    let mut pending_emails = Vec::new();
    for (email, author) in &by_email {
      if let Some(login) = noreply_login(&author.email) {
        login_of.insert(email, Some(login));
      } else if let Some(cached) = logins.get(email) {
        login_of.insert(email, cached.map(str::to_string));
      } else {
        pending_emails.push(email.as_str());
      }
    }

    let resolved = self.fan_out("Resolving emails", &pending_emails, |email| {
      self.tracker.resolve_login_by_email(email)
    })?;
    for (email, result) in resolved {
      match result {
        Ok(login) => {
          logins.insert(email, login.clone());
          login_of.insert(email, login);
        }
        Err(reason) => {
          failures.push(IdentityFailure {
            key: email.to_string(),
            reason,
          });
          login_of.insert(email, None);
        }
      }
    }

    // Contributors keyed by lower-cased login (GitHub logins are case-insensitive),
    // or by email when no login is known
    let mut by_login: BTreeMap<String, LoginAuthor> = BTreeMap::new();
    let mut anonymous: Vec<Contributor> = Vec::new();
    for (email, author) in &by_email {
      match login_of.get(email.as_str()).cloned().flatten() {
        Some(login) => {
          by_login
            .entry(login.to_lowercase())
            .or_insert_with(|| LoginAuthor { login, commits: 0 })
            .commits += author.commits;
        }
        None => anonymous.push(Contributor {
          login: None,
          name: if author.git_name.is_empty() { email.clone() } else { author.git_name.clone() },
          commits: author.commits,
        }),
      }
    }

    // Stage 2: login → display name
    let pending_logins: Vec<&str> = by_login
      .iter()
      .filter(|(key, _)| !names.contains(key))
      .map(|(_, account)| account.login.as_str())
      .collect();

    let resolved = self.fan_out("Resolving names", &pending_logins, |login| {
      self.tracker.resolve_user_name(login)
    })?;
    for (login, result) in resolved {
      match result {
        Ok(name) => names.insert(login.to_lowercase(), name),
        Err(reason) => failures.push(IdentityFailure {
          key: login.to_string(),
          reason,
        }),
      }
    }

    let mut roster = anonymous;
    for (key, account) in by_login {
      let name = names
        .get(&key)
        .flatten()
        .map(str::to_string)
        .unwrap_or_else(|| account.login.clone());
      roster.push(Contributor {
        login: Some(account.login),
        name,
        commits: account.commits,
      });
    }
    sort_roster(&mut roster);

    logins.save()?;
    names.save()?;

    if !failures.is_empty() {
      warn!(failed = failures.len(), "some identities could not be resolved");
    }
    debug!(roster = roster.len(), "credits resolved");

    Ok(CreditsReport { roster, failures })
  }

  /// Run `lookup` for every key on a pool of `simul_requests` threads
  ///
  /// Per-key errors are returned as strings alongside the key; only failing to
  /// build the pool is an `Err`.
  fn fan_out<'k, T, F>(
    &self,
    label: &str,
    keys: &[&'k str],
    lookup: F,
  ) -> ReleaseResult<Vec<(&'k str, Result<T, String>)>>
  where
    T: Send,
    F: Fn(&str) -> ReleaseResult<T> + Sync,
  {
    if keys.is_empty() {
      return Ok(Vec::new());
    }

    let pool = rayon::ThreadPoolBuilder::new()
      .num_threads(self.options.simul_requests.max(1))
      .build()?;
    let progress = &self.options.progress;
    let bar = progress.add_bar(keys.len(), label);

    debug!(label, pending = keys.len(), threads = self.options.simul_requests, "dispatching lookups");
    let results: Vec<_> = pool.install(|| {
      keys
        .par_iter()
        .map(|key| {
          let result = lookup(*key).map_err(|e| {
            warn!(key = *key, error = %e, "identity lookup failed");
            e.to_string()
          });
          progress.inc(&bar);
          (*key, result)
        })
        .collect()
    });

    progress.complete(&bar, keys.len());
    Ok(results)
  }
}

/// Lower-cased display name, then login
pub fn sort_roster(roster: &mut [Contributor]) {
  roster.sort_by(|a, b| {
    a.name
      .to_lowercase()
      .cmp(&b.name.to_lowercase())
      .then_with(|| a.login.cmp(&b.login))
  });
}
