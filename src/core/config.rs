use crate::core::error::{ConfigError, ReleaseResult, ResultExt};
use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for opp-release
/// Searched in order: opp-release.toml, .opp-release.toml, .config/opp-release.toml
///
/// Every key is optional; a missing file yields the built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
  /// Organization owning all repositories on the tracker
  #[serde(default = "default_organization")]
  pub organization: String,

  /// Base URL of the tracker REST API
  #[serde(default = "default_api_url")]
  pub api_url: String,

  /// Environment variable holding an optional API token
  #[serde(default = "default_token_env")]
  pub token_env: String,

  /// Label applied to an issue once its pull request has been cherry-picked
  #[serde(default = "default_tracking_label")]
  pub tracking_label: String,

  /// Pattern locating a docs pull request reference in a PR body.
  /// Must contain exactly one capture group for the number.
  #[serde(default = "default_docs_pr_pattern")]
  pub docs_pr_pattern: String,

  /// Public documentation site
  #[serde(default = "default_site_url")]
  pub site_url: String,

  /// Where generated release notes are written
  #[serde(default = "default_data_dir")]
  pub data_dir: PathBuf,

  /// Where the identity caches live
  #[serde(default = "default_data_dir")]
  pub cache_dir: PathBuf,

  /// Where the credits page is written
  #[serde(default = "default_credits_output")]
  pub credits_output: PathBuf,

  #[serde(default)]
  pub repositories: RepositoriesConfig,

  /// Repositories whose history feeds the credits page
  #[serde(default = "default_credits_repositories")]
  pub credits_repositories: Vec<RepoKey>,
}

/// The three repositories a release touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RepoKey {
  /// Core runtime
  #[value(name = "opp", alias = "core")]
  Core,
  /// Web frontend
  #[value(alias = "f")]
  Frontend,
  /// Documentation site
  #[value(alias = "d")]
  Docs,
}

impl fmt::Display for RepoKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      RepoKey::Core => "core",
      RepoKey::Frontend => "frontend",
      RepoKey::Docs => "docs",
    };
    write!(f, "{}", name)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoriesConfig {
  #[serde(default = "default_core_repository")]
  pub core: RepositoryConfig,
  #[serde(default = "default_frontend_repository")]
  pub frontend: RepositoryConfig,
  #[serde(default = "default_docs_repository")]
  pub docs: RepositoryConfig,
}

/// A repository on the tracker and its local checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
  /// Repository name under `organization`
  pub remote: String,
  /// Local checkout (relative paths resolve against the working directory)
  pub path: PathBuf,
}

fn default_organization() -> String {
  "open-peer-power".to_string()
}

fn default_api_url() -> String {
  "https://api.github.com".to_string()
}

fn default_token_env() -> String {
  "GITHUB_TOKEN".to_string()
}

fn default_tracking_label() -> String {
  "cherry-picked".to_string()
}

fn default_docs_pr_pattern() -> String {
  r"open-peer-power/open-peer-power\.io#(\d+)".to_string()
}

fn default_site_url() -> String {
  "https://www.open-peer-power.io".to_string()
}

fn default_data_dir() -> PathBuf {
  PathBuf::from("data")
}

fn default_credits_output() -> PathBuf {
  PathBuf::from("../open-peer-power.io/source/developers/credits.markdown")
}

fn default_credits_repositories() -> Vec<RepoKey> {
  vec![RepoKey::Core, RepoKey::Frontend, RepoKey::Docs]
}

fn repository(remote: &str) -> RepositoryConfig {
  RepositoryConfig {
    remote: remote.to_string(),
    path: PathBuf::from("..").join(remote),
  }
}

fn default_core_repository() -> RepositoryConfig {
  repository("core")
}

fn default_frontend_repository() -> RepositoryConfig {
  repository("frontend")
}

fn default_docs_repository() -> RepositoryConfig {
  repository("open-peer-power.io")
}

impl Default for RepositoriesConfig {
  fn default() -> Self {
    Self {
      core: default_core_repository(),
      frontend: default_frontend_repository(),
      docs: default_docs_repository(),
    }
  }
}

impl Default for ReleaseConfig {
  fn default() -> Self {
    Self {
      organization: default_organization(),
      api_url: default_api_url(),
      token_env: default_token_env(),
      tracking_label: default_tracking_label(),
      docs_pr_pattern: default_docs_pr_pattern(),
      site_url: default_site_url(),
      data_dir: default_data_dir(),
      cache_dir: default_data_dir(),
      credits_output: default_credits_output(),
      repositories: RepositoriesConfig::default(),
      credits_repositories: default_credits_repositories(),
    }
  }
}

impl ReleaseConfig {
  /// Find config file in search order: opp-release.toml, .opp-release.toml, .config/opp-release.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("opp-release.toml"),
      path.join(".opp-release.toml"),
      path.join(".config").join("opp-release.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from an explicit path, or search `dir`, or fall back to defaults
  pub fn load(dir: &Path, explicit: Option<&Path>) -> ReleaseResult<Self> {
    let config_path = match explicit {
      Some(path) => path.to_path_buf(),
      None => match Self::find_config_path(dir) {
        Some(path) => path,
        None => return Ok(Self::default()),
      },
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: ReleaseConfig = toml_edit::de::from_str(&content).map_err(|e| ConfigError::Invalid {
      path: config_path.clone(),
      message: e.to_string(),
    })?;

    config.validate().map_err(|message| ConfigError::Invalid {
      path: config_path.clone(),
      message,
    })?;

    Ok(config)
  }

  /// Validate values that serde cannot check
  pub fn validate(&self) -> Result<(), String> {
    let pattern = Regex::new(&self.docs_pr_pattern).map_err(|e| format!("docs_pr_pattern: {}", e))?;
    if pattern.captures_len() != 2 {
      return Err(format!(
        "docs_pr_pattern '{}' must contain exactly one capture group",
        self.docs_pr_pattern
      ));
    }

    for key in [RepoKey::Core, RepoKey::Frontend, RepoKey::Docs] {
      if self.repository(key).remote.trim().is_empty() {
        return Err(format!("repositories.{}.remote must not be empty", key));
      }
    }

    if self.organization.trim().is_empty() {
      return Err("organization must not be empty".to_string());
    }

    Ok(())
  }

  /// Repository settings for a key
  pub fn repository(&self, key: RepoKey) -> &RepositoryConfig {
    match key {
      RepoKey::Core => &self.repositories.core,
      RepoKey::Frontend => &self.repositories.frontend,
      RepoKey::Docs => &self.repositories.docs,
    }
  }

  /// Compiled docs cross-reference pattern
  pub fn docs_pr_regex(&self) -> ReleaseResult<Regex> {
    Ok(Regex::new(&self.docs_pr_pattern)?)
  }
}
