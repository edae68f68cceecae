//! On-disk identity caches
//!
//! Each cache is one JSON object in `cache_dir`. A `null` value records a
//! lookup that found nothing, so it is not repeated on the next run.

use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// email → login
pub const LOGIN_BY_EMAIL: &str = "login_by_email.json";

/// login → display name
pub const NAME_BY_LOGIN: &str = "name_by_login.json";

#[derive(Debug, Clone)]
pub struct IdentityCache {
  path: PathBuf,
  entries: BTreeMap<String, Option<String>>,
}

impl IdentityCache {
  /// Cache backed by `path` that ignores whatever is stored there
  pub fn empty(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      entries: BTreeMap::new(),
    }
  }

  /// Read the cache; a missing file is an empty cache
  pub fn load(path: impl Into<PathBuf>) -> ReleaseResult<Self> {
    let path = path.into();
    if !path.exists() {
      debug!(path = %path.display(), "no identity cache yet");
      return Ok(Self::empty(path));
    }

    let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let entries = serde_json::from_str(&content).map_err(|e| {
      ReleaseError::with_help(
        format!("Identity cache {} is corrupt: {}", path.display(), e),
        "Rerun with --no-cache to rebuild it.",
      )
    })?;

    debug!(path = %path.display(), "loaded identity cache");
    Ok(Self { path, entries })
  }

  /// `None` on a miss, `Some(None)` for a cached negative result
  pub fn get(&self, key: &str) -> Option<Option<&str>> {
    self.entries.get(key).map(|value| value.as_deref())
  }

  pub fn contains(&self, key: &str) -> bool {
    self.entries.contains_key(key)
  }

  pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
    self.entries.insert(key.into(), value);
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Write the whole cache, creating `cache_dir` if needed
  ///
  /// Goes through a sibling `.tmp` file and a rename so an interrupted run
  /// leaves the previous cache intact.
  pub fn save(&self) -> ReleaseResult<()> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut json = serde_json::to_string_pretty(&self.entries)?;
    json.push('\n');
    let staging = self.path.with_extension("tmp");
    fs::write(&staging, json).with_context(|| format!("Failed to write {}", staging.display()))?;
    fs::rename(&staging, &self.path).with_context(|| format!("Failed to replace {}", self.path.display()))?;
    Ok(())
  }
}
