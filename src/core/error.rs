//! Error types for opp-release with contextual messages and exit codes
//!
//! Every error category maps to an exit code and, where a corrective action
//! exists, a help message printed below the error.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for opp-release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing records)
  User = 1,
  /// System error (git, network, I/O)
  System = 2,
  /// A cherry-pick chain stopped midway
  Reconciliation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for opp-release
#[derive(Debug)]
pub enum ReleaseError {
  /// Configuration errors
  Config(ConfigError),

  /// Local environment is not usable (checkout, branch, tool)
  Environment(EnvironmentError),

  /// Remote tracker has no record for the request
  NotFound(NotFoundError),

  /// Git command errors
  Git(GitError),

  /// Remote tracker transport / protocol errors
  Remote(RemoteError),

  /// A cherry-pick chain stopped at this pull request
  Reconciliation { number: u64, reason: String },

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context, help } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ReleaseError::Io(e) => ReleaseError::Message {
        message: format!("I/O error: {}", e),
        context: Some(ctx_str),
        help: None,
      },
      _ => self,
    }
  }

  /// True when the remote tracker reported a missing record
  pub fn is_not_found(&self) -> bool {
    matches!(self, ReleaseError::NotFound(_))
  }

  /// Failures confined to one request: a missing record, a server error or
  /// an unreadable body. Rate limits, rejected credentials and connection
  /// failures hit every later request too.
  pub fn is_single_request_failure(&self) -> bool {
    match self {
      ReleaseError::NotFound(_) => true,
      ReleaseError::Remote(RemoteError::Http { status, .. }) => *status >= 500,
      ReleaseError::Remote(RemoteError::Decode { .. }) => true,
      _ => false,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::Config(_) => ExitCode::User,
      ReleaseError::Environment(_) => ExitCode::User,
      ReleaseError::NotFound(_) => ExitCode::User,
      ReleaseError::Git(_) => ExitCode::System,
      ReleaseError::Remote(_) => ExitCode::System,
      ReleaseError::Reconciliation { .. } => ExitCode::Reconciliation,
      ReleaseError::Io(_) => ExitCode::System,
      ReleaseError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::Environment(e) => e.help_message(),
      ReleaseError::NotFound(e) => e.help_message(),
      ReleaseError::Remote(e) => e.help_message(),
      ReleaseError::Reconciliation { number, .. } => Some(format!(
        "Resolve the conflict for #{} by hand, commit it, then rerun `opp-release pick`. \
         Already labeled pull requests are skipped.",
        number
      )),
      ReleaseError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::Environment(e) => write!(f, "{}", e),
      ReleaseError::NotFound(e) => write!(f, "{}", e),
      ReleaseError::Git(e) => write!(f, "{}", e),
      ReleaseError::Remote(e) => write!(f, "{}", e),
      ReleaseError::Reconciliation { number, reason } => {
        write!(f, "Cherry picking #{} failed: {}", number, reason)
      }
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<String> for ReleaseError {
  fn from(msg: String) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<&str> for ReleaseError {
  fn from(msg: &str) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<toml_edit::de::Error> for ReleaseError {
  fn from(err: toml_edit::de::Error) -> Self {
    ReleaseError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ReleaseError {
  fn from(err: serde_json::Error) -> Self {
    ReleaseError::message(format!("JSON error: {}", err))
  }
}

impl From<regex::Error> for ReleaseError {
  fn from(err: regex::Error) -> Self {
    ReleaseError::message(format!("Invalid pattern: {}", err))
  }
}

impl From<rayon::ThreadPoolBuildError> for ReleaseError {
  fn from(err: rayon::ThreadPoolBuildError) -> Self {
    ReleaseError::message(format!("Failed to start worker pool: {}", err))
  }
}

impl From<ConfigError> for ReleaseError {
  fn from(err: ConfigError) -> Self {
    ReleaseError::Config(err)
  }
}

impl From<EnvironmentError> for ReleaseError {
  fn from(err: EnvironmentError) -> Self {
    ReleaseError::Environment(err)
  }
}

impl From<NotFoundError> for ReleaseError {
  fn from(err: NotFoundError) -> Self {
    ReleaseError::NotFound(err)
  }
}

impl From<RemoteError> for ReleaseError {
  fn from(err: RemoteError) -> Self {
    ReleaseError::Remote(err)
  }
}

impl From<GitError> for ReleaseError {
  fn from(err: GitError) -> Self {
    ReleaseError::Git(err)
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Config file could not be parsed or failed validation
  Invalid { path: PathBuf, message: String },

  /// Missing required field
  MissingField { field: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::Invalid { path, .. } => Some(format!(
        "Fix {} or remove it to fall back to the built-in defaults.",
        path.display()
      )),
      ConfigError::MissingField { field } => Some(format!("Add `{}` to opp-release.toml.", field)),
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::Invalid { path, message } => {
        write!(f, "Invalid configuration in {}: {}", path.display(), message)
      }
      ConfigError::MissingField { field } => {
        write!(f, "Missing required field in config: {}", field)
      }
    }
  }
}

/// Local environment errors
#[derive(Debug)]
pub enum EnvironmentError {
  /// Local checkout does not exist or is not a git repository
  RepoNotFound { path: PathBuf },

  /// Branch (or range) is unknown to the local checkout
  BranchNotFound { branch: String, path: PathBuf },

  /// Required executable is not on PATH
  ToolMissing { tool: String },

  /// Working tree has uncommitted changes
  DirtyWorkingTree { path: PathBuf },
}

impl EnvironmentError {
  fn help_message(&self) -> Option<String> {
    match self {
      EnvironmentError::RepoNotFound { path } => Some(format!(
        "Clone the repository to {} or point `[repositories]` in opp-release.toml at your checkout.",
        path.display()
      )),
      EnvironmentError::BranchNotFound { branch, path } => Some(format!(
        "Run `git fetch` in {} and check that branch '{}' exists.",
        path.display(),
        branch
      )),
      EnvironmentError::ToolMissing { tool } => Some(format!("Install {} and make sure it is on your PATH.", tool)),
      EnvironmentError::DirtyWorkingTree { path } => Some(format!(
        "Commit or stash the changes in {} before continuing.",
        path.display()
      )),
    }
  }
}

impl fmt::Display for EnvironmentError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EnvironmentError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      EnvironmentError::BranchNotFound { branch, path } => {
        write!(f, "Branch '{}' not found in {}", branch, path.display())
      }
      EnvironmentError::ToolMissing { tool } => write!(f, "Required tool not found: {}", tool),
      EnvironmentError::DirtyWorkingTree { path } => {
        write!(f, "Repository at {} has uncommitted changes", path.display())
      }
    }
  }
}

/// Missing records on the remote tracker
#[derive(Debug)]
pub enum NotFoundError {
  /// Repository does not exist (or is not visible)
  Repository { repo: String },

  /// Pull request number does not exist
  PullRequest { repo: String, number: u64 },

  /// No milestone with this title
  Milestone { repo: String, title: String },

  /// No open milestone has a version-like title
  NoVersionMilestone { repo: String },
}

impl NotFoundError {
  fn help_message(&self) -> Option<String> {
    match self {
      NotFoundError::Milestone { .. } | NotFoundError::NoVersionMilestone { .. } => {
        Some("Pass the milestone title explicitly with --milestone.".to_string())
      }
      NotFoundError::Repository { .. } => {
        Some("Check `organization` and `[repositories]` in opp-release.toml.".to_string())
      }
      NotFoundError::PullRequest { .. } => None,
    }
  }
}

impl fmt::Display for NotFoundError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      NotFoundError::Repository { repo } => write!(f, "Repository not found: {}", repo),
      NotFoundError::PullRequest { repo, number } => {
        write!(f, "Pull request {}#{} not found", repo, number)
      }
      NotFoundError::Milestone { repo, title } => {
        write!(f, "Milestone '{}' not found in {}", title, repo)
      }
      NotFoundError::NoVersionMilestone { repo } => {
        write!(f, "No open version milestone found in {}", repo)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command exited non-zero
  CommandFailed {
    command: String,
    dir: PathBuf,
    stderr: String,
  },
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, dir, stderr } => {
        write!(f, "Git command failed in {}: {}", dir.display(), command)?;
        if !stderr.trim().is_empty() {
          write!(f, "\n{}", stderr.trim_end())?;
        }
        Ok(())
      }
    }
  }
}

/// Remote tracker transport and protocol errors
#[derive(Debug)]
pub enum RemoteError {
  /// Non-success HTTP status
  Http { url: String, status: u16, message: String },

  /// API rate limit exhausted
  RateLimited { url: String },

  /// Connection-level failure
  Transport { url: String, message: String },

  /// Response body did not match the expected shape
  Decode { url: String, message: String },
}

impl RemoteError {
  fn help_message(&self) -> Option<String> {
    match self {
      RemoteError::RateLimited { .. } => Some(
        "Export a token in the variable named by `token_env` (GITHUB_TOKEN by default) or lower --simul-requests."
          .to_string(),
      ),
      RemoteError::Http { status: 401, .. } => Some("The API token was rejected; check that it has not expired.".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for RemoteError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RemoteError::Http { url, status, message } => write!(f, "{} returned HTTP {}: {}", url, status, message),
      RemoteError::RateLimited { url } => write!(f, "Rate limit exceeded while requesting {}", url),
      RemoteError::Transport { url, message } => write!(f, "Request to {} failed: {}", url, message),
      RemoteError::Decode { url, message } => write!(f, "Unexpected response from {}: {}", url, message),
    }
  }
}

/// Result type alias for opp-release
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("\nAn error occurred: {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("Help: {}\n", help);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_exit_codes() {
    let err = ReleaseError::Reconciliation {
      number: 7,
      reason: "conflict".to_string(),
    };
    assert_eq!(err.exit_code(), ExitCode::Reconciliation);
    assert_eq!(err.exit_code().as_i32(), 3);

    let err: ReleaseError = NotFoundError::PullRequest {
      repo: "o/r".to_string(),
      number: 1,
    }
    .into();
    assert_eq!(err.exit_code(), ExitCode::User);
    assert!(err.is_not_found());
  }

  #[test]
  fn test_config_errors_are_user_errors() {
    let err: ReleaseError = ConfigError::MissingField {
      field: "credits_repositories".to_string(),
    }
    .into();
    assert!(matches!(err, ReleaseError::Config(ConfigError::MissingField { .. })));
    assert_eq!(err.exit_code(), ExitCode::User);
    assert!(err.help_message().unwrap().contains("credits_repositories"));
  }

  #[test]
  fn test_single_request_failures() {
    let server: ReleaseError = RemoteError::Http {
      url: "u".to_string(),
      status: 502,
      message: "bad gateway".to_string(),
    }
    .into();
    assert!(server.is_single_request_failure());

    let unauthorized: ReleaseError = RemoteError::Http {
      url: "u".to_string(),
      status: 401,
      message: "bad credentials".to_string(),
    }
    .into();
    assert!(!unauthorized.is_single_request_failure());

    let limited: ReleaseError = RemoteError::RateLimited { url: "u".to_string() }.into();
    assert!(!limited.is_single_request_failure());
  }

  #[test]
  fn test_context_chains_on_messages() {
    let err = ReleaseError::message("boom").context("inner").context("outer");
    assert_eq!(err.to_string(), "boom\nouter\ninner");
  }

  #[test]
  fn test_environment_errors_carry_help() {
    let err: ReleaseError = EnvironmentError::BranchNotFound {
      branch: "rc".to_string(),
      path: PathBuf::from("../core"),
    }
    .into();
    let help = err.help_message().unwrap();
    assert!(help.contains("rc"));
    assert!(help.contains("../core"));
  }

  #[test]
  fn test_git_error_display_includes_dir() {
    let err = GitError::CommandFailed {
      command: "git cherry-pick abc".to_string(),
      dir: PathBuf::from("../core"),
      stderr: "CONFLICT (content)\n".to_string(),
    };
    let text = err.to_string();
    assert!(text.contains("../core"));
    assert!(text.contains("git cherry-pick abc"));
    assert!(text.ends_with("CONFLICT (content)"));
  }
}
