//! GitHub REST implementation of [`RemoteTracker`] (blocking client)

use super::{Issue, Milestone, MilestoneState, PullRequest, RemoteTracker, RepoRef};
use crate::core::config::ReleaseConfig;
use crate::core::error::{NotFoundError, ReleaseResult, RemoteError};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Page size used for every listing endpoint
const PER_PAGE: usize = 100;

#[derive(Debug, Deserialize)]
struct WireUser {
  login: String,
}

#[derive(Debug, Deserialize)]
struct WireLabel {
  name: String,
}

#[derive(Debug, Deserialize)]
struct WireRepository {
  name: String,
  owner: WireUser,
}

#[derive(Debug, Deserialize)]
struct WireMilestone {
  number: u64,
  title: String,
  state: String,
}

#[derive(Debug, Deserialize)]
struct WireIssue {
  number: u64,
  title: String,
  state: String,
  user: WireUser,
  #[serde(default)]
  labels: Vec<WireLabel>,
  /// Present only when the issue is a pull request
  #[serde(default)]
  pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct WirePull {
  number: u64,
  title: String,
  #[serde(default)]
  body: Option<String>,
  user: WireUser,
  #[serde(default)]
  merge_commit_sha: Option<String>,
  #[serde(default)]
  merged: bool,
  #[serde(default)]
  labels: Vec<WireLabel>,
  state: String,
  html_url: String,
}

#[derive(Debug, Deserialize)]
struct WireProfile {
  #[serde(default)]
  name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUserSearch {
  items: Vec<WireUser>,
}

impl From<WireMilestone> for Milestone {
  fn from(wire: WireMilestone) -> Self {
    Milestone {
      number: wire.number,
      title: wire.title,
      state: wire.state,
    }
  }
}

impl From<WireIssue> for Issue {
  fn from(wire: WireIssue) -> Self {
    Issue {
      number: wire.number,
      title: wire.title,
      labels: wire.labels.into_iter().map(|label| label.name).collect(),
      is_pull_request: wire.pull_request.is_some(),
      state: wire.state,
      author: wire.user.login,
    }
  }
}

impl From<WirePull> for PullRequest {
  fn from(wire: WirePull) -> Self {
    PullRequest {
      number: wire.number,
      title: wire.title,
      body: wire.body.unwrap_or_default(),
      author: wire.user.login,
      merge_commit_sha: wire.merge_commit_sha,
      merged: wire.merged,
      labels: wire.labels.into_iter().map(|label| label.name).collect(),
      state: wire.state,
      html_url: wire.html_url,
    }
  }
}

/// Tracker handle backed by the GitHub REST API
pub struct GitHubTracker {
  client: Client,
  api_url: String,
  token: Option<String>,
}

impl GitHubTracker {
  /// Build a tracker from configuration; the token is read from `token_env` if set
  pub fn new(config: &ReleaseConfig) -> ReleaseResult<Self> {
    let token = std::env::var(&config.token_env).ok().filter(|token| !token.trim().is_empty());
    Self::with_token(&config.api_url, token)
  }

  pub fn with_token(api_url: &str, token: Option<String>) -> ReleaseResult<Self> {
    let client = Client::builder()
      .user_agent(concat!("opp-release/", env!("CARGO_PKG_VERSION")))
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(|e| RemoteError::Transport {
        url: api_url.to_string(),
        message: e.to_string(),
      })?;

    Ok(Self {
      client,
      api_url: api_url.trim_end_matches('/').to_string(),
      token,
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.api_url, path)
  }

  /// Send a request; `Ok(None)` means the tracker answered 404
  fn send(&self, request: RequestBuilder, url: &str) -> ReleaseResult<Option<Response>> {
    let mut request = request
      .header("Accept", "application/vnd.github+json")
      .header("X-GitHub-Api-Version", "2022-11-28");
    if let Some(token) = &self.token {
      request = request.bearer_auth(token);
    }

    debug!(url, "tracker request");
    let response = request.send().map_err(|e| RemoteError::Transport {
      url: url.to_string(),
      message: e.to_string(),
    })?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
      return Ok(None);
    }

    if status == StatusCode::TOO_MANY_REQUESTS || (status == StatusCode::FORBIDDEN && rate_limit_exhausted(&response)) {
      return Err(RemoteError::RateLimited { url: url.to_string() }.into());
    }

    if !status.is_success() {
      let message = response.text().unwrap_or_default();
      return Err(
        RemoteError::Http {
          url: url.to_string(),
          status: status.as_u16(),
          message,
        }
        .into(),
      );
    }

    Ok(Some(response))
  }

  fn get_json<T: DeserializeOwned>(&self, path: &str) -> ReleaseResult<Option<T>> {
    let url = self.url(path);
    match self.send(self.client.get(&url), &url)? {
      Some(response) => decode(response, &url).map(Some),
      None => Ok(None),
    }
  }

  /// Follow `page=` until a short page comes back
  fn get_paged<T: DeserializeOwned>(&self, path: &str) -> ReleaseResult<Option<Vec<T>>> {
    let separator = if path.contains('?') { '&' } else { '?' };
    let mut items = Vec::new();

    for page in 1.. {
      let page_path = format!("{}{}per_page={}&page={}", path, separator, PER_PAGE, page);
      let batch: Vec<T> = match self.get_json(&page_path)? {
        Some(batch) => batch,
        None => return Ok(None),
      };
      let done = batch.len() < PER_PAGE;
      items.extend(batch);
      if done {
        break;
      }
    }

    Ok(Some(items))
  }

  fn repo_missing(repo: &RepoRef) -> NotFoundError {
    NotFoundError::Repository { repo: repo.to_string() }
  }
}

fn rate_limit_exhausted(response: &Response) -> bool {
  response
    .headers()
    .get("x-ratelimit-remaining")
    .and_then(|value| value.to_str().ok())
    .is_some_and(|remaining| remaining.trim() == "0")
}

fn decode<T: DeserializeOwned>(response: Response, url: &str) -> ReleaseResult<T> {
  response.json::<T>().map_err(|e| {
    RemoteError::Decode {
      url: url.to_string(),
      message: e.to_string(),
    }
    .into()
  })
}

impl RemoteTracker for GitHubTracker {
  fn repository(&self, owner: &str, name: &str) -> ReleaseResult<RepoRef> {
    let repo = RepoRef::new(owner, name);
    let wire: WireRepository = self
      .get_json(&format!("/repos/{}/{}", owner, name))?
      .ok_or_else(|| Self::repo_missing(&repo))?;
    Ok(RepoRef::new(wire.owner.login, wire.name))
  }

  fn milestones(&self, repo: &RepoRef) -> ReleaseResult<Vec<Milestone>> {
    let wire: Vec<WireMilestone> = self
      .get_paged(&format!("/repos/{}/{}/milestones?state=all", repo.owner, repo.name))?
      .ok_or_else(|| Self::repo_missing(repo))?;
    Ok(wire.into_iter().map(Milestone::from).collect())
  }

  fn closed_issues(&self, repo: &RepoRef, milestone: u64) -> ReleaseResult<Vec<Issue>> {
    let wire: Vec<WireIssue> = self
      .get_paged(&format!(
        "/repos/{}/{}/issues?milestone={}&state=closed",
        repo.owner, repo.name, milestone
      ))?
      .ok_or_else(|| Self::repo_missing(repo))?;
    Ok(wire.into_iter().map(Issue::from).collect())
  }

  fn pull_request(&self, repo: &RepoRef, number: u64) -> ReleaseResult<PullRequest> {
    let wire: WirePull = self
      .get_json(&format!("/repos/{}/{}/pulls/{}", repo.owner, repo.name, number))?
      .ok_or_else(|| NotFoundError::PullRequest {
        repo: repo.to_string(),
        number,
      })?;
    Ok(wire.into())
  }

  fn add_label(&self, repo: &RepoRef, issue: u64, label: &str) -> ReleaseResult<()> {
    let url = self.url(&format!("/repos/{}/{}/issues/{}/labels", repo.owner, repo.name, issue));
    let body = serde_json::json!({ "labels": [label] });
    self.send(self.client.post(&url).json(&body), &url)?.ok_or_else(|| NotFoundError::PullRequest {
      repo: repo.to_string(),
      number: issue,
    })?;
    Ok(())
  }

  fn update_milestone(&self, repo: &RepoRef, milestone: u64, state: MilestoneState) -> ReleaseResult<()> {
    let url = self.url(&format!("/repos/{}/{}/milestones/{}", repo.owner, repo.name, milestone));
    let body = serde_json::json!({ "state": state.as_str() });
    self.send(self.client.patch(&url).json(&body), &url)?.ok_or_else(|| NotFoundError::Milestone {
      repo: repo.to_string(),
      title: format!("#{}", milestone),
    })?;
    Ok(())
  }

  fn resolve_user_name(&self, login: &str) -> ReleaseResult<Option<String>> {
    let profile: Option<WireProfile> = self.get_json(&format!("/users/{}", login))?;
    Ok(
      profile
        .and_then(|profile| profile.name)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty()),
    )
  }

  fn resolve_login_by_email(&self, email: &str) -> ReleaseResult<Option<String>> {
    let url = self.url("/search/users");
    let query = format!("{} in:email", email);
    let request = self.client.get(&url).query(&[("q", query.as_str())]);
    let Some(response) = self.send(request, &url)? else {
      return Ok(None);
    };
    let search: WireUserSearch = decode(response, &url)?;
    Ok(search.items.into_iter().next().map(|user| user.login))
  }
}
