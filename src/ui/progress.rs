//! Progress bars for the credits lookups
//!
//! Uses `linya`; bars are shared across the worker pool behind a mutex and
//! drawn on stderr. A hidden tracker keeps the same API and draws nothing.

use linya::{Bar, Progress};
use std::sync::{Arc, Mutex, MutexGuard};

/// Thread-safe set of bars, one per resolution stage
#[derive(Clone)]
pub struct MultiProgress {
  progress: Option<Arc<Mutex<Progress>>>,
}

/// Handle to one bar; inert when the tracker is hidden
pub struct StageBar {
  bar: Option<Bar>,
}

impl MultiProgress {
  pub fn new() -> Self {
    Self {
      progress: Some(Arc::new(Mutex::new(Progress::new()))),
    }
  }

  /// Tracker that never draws (quiet runs, tests)
  pub fn hidden() -> Self {
    Self { progress: None }
  }

  fn lock(progress: &Mutex<Progress>) -> MutexGuard<'_, Progress> {
    progress.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  /// Add a bar with a label and total
  pub fn add_bar(&self, total: usize, label: impl Into<String>) -> StageBar {
    let bar = self
      .progress
      .as_ref()
      .map(|progress| Self::lock(progress).bar(total, label.into()));
    StageBar { bar }
  }

  /// Increment a bar by one
  pub fn inc(&self, stage: &StageBar) {
    if let (Some(progress), Some(bar)) = (&self.progress, &stage.bar) {
      Self::lock(progress).inc_and_draw(bar, 1);
    }
  }

  /// Set a bar to `total` once its stage has finished
  pub fn complete(&self, stage: &StageBar, total: usize) {
    if let (Some(progress), Some(bar)) = (&self.progress, &stage.bar) {
      Self::lock(progress).set_and_draw(bar, total);
    }
  }
}

impl Default for MultiProgress {
  fn default() -> Self {
    Self::new()
  }
}
