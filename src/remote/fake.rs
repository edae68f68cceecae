//! In-memory tracker for unit tests
//!
//! Counts every remote call and records the peak number of identity lookups
//! in flight at once.

use super::{Issue, Milestone, MilestoneState, PullRequest, RemoteTracker, RepoRef};
use crate::core::error::{NotFoundError, ReleaseError, ReleaseResult};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

#[derive(Default)]
struct FakeState {
  milestones: Vec<Milestone>,
  issues: Vec<Issue>,
  pulls: HashMap<u64, PullRequest>,
  names: HashMap<String, String>,
  logins: HashMap<String, String>,
  failing_identities: HashSet<String>,
  failing_labels: HashSet<u64>,
  failing_pulls: HashMap<u64, u16>,
  pull_fetches: HashMap<u64, usize>,
  labels_added: Vec<(u64, String)>,
  milestone_updates: Vec<(u64, MilestoneState)>,
}

#[derive(Default)]
pub struct FakeTracker {
  state: Mutex<FakeState>,
  lookup_delay: Duration,
  pub name_calls: AtomicUsize,
  pub email_calls: AtomicUsize,
  in_flight: AtomicUsize,
  peak_in_flight: AtomicUsize,
}

impl FakeTracker {
  pub fn new() -> Self {
    Self::default()
  }

  /// Identity lookups sleep for `delay` so concurrent calls overlap
  pub fn with_lookup_delay(delay: Duration) -> Self {
    Self {
      lookup_delay: delay,
      ..Self::default()
    }
  }

  pub fn repo() -> RepoRef {
    RepoRef::new("open-peer-power", "core")
  }

  /// A merged pull request with merge commit `sha<number>`
  pub fn merged_pull(number: u64, title: &str, author: &str) -> PullRequest {
    PullRequest {
      number,
      title: title.to_string(),
      body: String::new(),
      author: author.to_string(),
      merge_commit_sha: Some(format!("sha{}", number)),
      merged: true,
      labels: Vec::new(),
      state: "closed".to_string(),
      html_url: format!("https://github.com/open-peer-power/core/pull/{}", number),
    }
  }

  /// The issue record backing a pull request
  pub fn issue_for(pull: &PullRequest) -> Issue {
    Issue {
      number: pull.number,
      title: pull.title.clone(),
      labels: pull.labels.clone(),
      is_pull_request: true,
      state: "closed".to_string(),
      author: pull.author.clone(),
    }
  }

  pub fn set_milestones(&self, milestones: Vec<Milestone>) {
    self.state.lock().unwrap().milestones = milestones;
  }

  pub fn add_pull(&self, pull: PullRequest) {
    self.state.lock().unwrap().pulls.insert(pull.number, pull);
  }

  pub fn add_issue(&self, issue: Issue) {
    self.state.lock().unwrap().issues.push(issue);
  }

  pub fn add_user(&self, login: &str, name: &str) {
    self.state.lock().unwrap().names.insert(login.to_string(), name.to_string());
  }

  pub fn add_email(&self, email: &str, login: &str) {
    self.state.lock().unwrap().logins.insert(email.to_string(), login.to_string());
  }

  /// Lookups of this login or email fail with a transport error
  pub fn fail_identity(&self, key: &str) {
    self.state.lock().unwrap().failing_identities.insert(key.to_string());
  }

  /// Labeling this issue fails with a transport error
  pub fn fail_label(&self, issue: u64) {
    self.state.lock().unwrap().failing_labels.insert(issue);
  }

  /// Fetching this pull request fails with HTTP `status`
  pub fn fail_pull(&self, number: u64, status: u16) {
    self.state.lock().unwrap().failing_pulls.insert(number, status);
  }

  pub fn pull_fetches(&self, number: u64) -> usize {
    self.state.lock().unwrap().pull_fetches.get(&number).copied().unwrap_or(0)
  }

  pub fn labels_added(&self) -> Vec<(u64, String)> {
    self.state.lock().unwrap().labels_added.clone()
  }

  pub fn milestone_updates(&self) -> Vec<(u64, MilestoneState)> {
    self.state.lock().unwrap().milestone_updates.clone()
  }

  pub fn peak_in_flight(&self) -> usize {
    self.peak_in_flight.load(Ordering::SeqCst)
  }

  fn identity_call<T>(&self, key: &str, lookup: impl FnOnce(&FakeState) -> Option<T>) -> ReleaseResult<Option<T>> {
    let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
    if !self.lookup_delay.is_zero() {
      thread::sleep(self.lookup_delay);
    }

    let result = {
      let state = self.state.lock().unwrap();
      if state.failing_identities.contains(key) {
        Err(transport_error(key))
      } else {
        Ok(lookup(&state))
      }
    };

    self.in_flight.fetch_sub(1, Ordering::SeqCst);
    result
  }
}

fn transport_error(what: &str) -> ReleaseError {
  ReleaseError::Remote(crate::core::error::RemoteError::Transport {
    url: format!("fake://{}", what),
    message: "connection reset".to_string(),
  })
}

impl RemoteTracker for FakeTracker {
  fn repository(&self, owner: &str, name: &str) -> ReleaseResult<RepoRef> {
    Ok(RepoRef::new(owner, name))
  }

  fn milestones(&self, _repo: &RepoRef) -> ReleaseResult<Vec<Milestone>> {
    Ok(self.state.lock().unwrap().milestones.clone())
  }

  fn closed_issues(&self, _repo: &RepoRef, _milestone: u64) -> ReleaseResult<Vec<Issue>> {
    Ok(self.state.lock().unwrap().issues.clone())
  }

  fn pull_request(&self, repo: &RepoRef, number: u64) -> ReleaseResult<PullRequest> {
    let mut state = self.state.lock().unwrap();
    *state.pull_fetches.entry(number).or_default() += 1;
    if let Some(&status) = state.failing_pulls.get(&number) {
      return Err(ReleaseError::Remote(crate::core::error::RemoteError::Http {
        url: format!("fake://pulls/{}", number),
        status,
        message: "bad gateway".to_string(),
      }));
    }
    state.pulls.get(&number).cloned().ok_or_else(|| {
      NotFoundError::PullRequest {
        repo: repo.to_string(),
        number,
      }
      .into()
    })
  }

  fn add_label(&self, _repo: &RepoRef, issue: u64, label: &str) -> ReleaseResult<()> {
    let mut state = self.state.lock().unwrap();
    if state.failing_labels.contains(&issue) {
      return Err(transport_error("labels"));
    }
    state.labels_added.push((issue, label.to_string()));
    if let Some(record) = state.issues.iter_mut().find(|record| record.number == issue) {
      record.labels.push(label.to_string());
    }
    Ok(())
  }

  fn update_milestone(&self, _repo: &RepoRef, milestone: u64, new_state: MilestoneState) -> ReleaseResult<()> {
    self.state.lock().unwrap().milestone_updates.push((milestone, new_state));
    Ok(())
  }

  fn resolve_user_name(&self, login: &str) -> ReleaseResult<Option<String>> {
    self.name_calls.fetch_add(1, Ordering::SeqCst);
    self.identity_call(login, |state| state.names.get(login).cloned())
  }

  fn resolve_login_by_email(&self, email: &str) -> ReleaseResult<Option<String>> {
    self.email_calls.fetch_add(1, Ordering::SeqCst);
    self.identity_call(email, |state| state.logins.get(email).cloned())
  }
}
