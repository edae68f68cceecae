//! Pull request label classification and documentation links
//!
//! Labels are matched against a fixed set of patterns; anything else is
//! [`LabelClass::Unmatched`] and contributes nothing to the changelog.

use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// Prefix of labels naming the integration a pull request touches
const INTEGRATION_PREFIX: &str = "integration: ";

/// Trigger platforms documented on the automation trigger page
const AUTOMATION_TRIGGERS: &[&str] = &[
  "event",
  "geo_location",
  "mqtt",
  "numeric_state",
  "openpeerpower",
  "state",
  "sun",
  "tag",
  "template",
  "time",
  "time_pattern",
  "webhook",
  "zone",
];

/// Changelog section an entry is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
  BreakingChange,
  NewIntegration,
  NewPlatform,
  BetaFix,
  Other,
}

impl Category {
  pub fn title(&self) -> &'static str {
    match self {
      Self::BreakingChange => "Breaking Changes",
      Self::NewIntegration => "New Integrations",
      Self::NewPlatform => "New Platforms",
      Self::BetaFix => "Beta Fixes",
      Self::Other => "All Changes",
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.title())
  }
}

/// Result of matching one label
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelClass {
  /// Selects a changelog section
  Category(Category),
  /// `integration: <name>`
  Integration(String),
  Unmatched,
}

/// Match a label against the recognised patterns
pub fn classify_label(label: &str) -> LabelClass {
  match label.trim() {
    "breaking-change" | "breaking change" => LabelClass::Category(Category::BreakingChange),
    "new-integration" => LabelClass::Category(Category::NewIntegration),
    "new-platform" => LabelClass::Category(Category::NewPlatform),
    "beta-fix" => LabelClass::Category(Category::BetaFix),
    other => match other.strip_prefix(INTEGRATION_PREFIX).map(str::trim) {
      Some(name) if !name.is_empty() => LabelClass::Integration(name.to_string()),
      _ => LabelClass::Unmatched,
    },
  }
}

/// Builds documentation references for integration labels
#[derive(Debug, Clone)]
pub struct DocLinker {
  site_url: String,
}

impl Default for DocLinker {
  fn default() -> Self {
    Self::new("https://www.open-peer-power.io")
  }
}

impl DocLinker {
  pub fn new(site_url: impl Into<String>) -> Self {
    Self {
      site_url: site_url.into().trim_end_matches('/').to_string(),
    }
  }

  /// Website pages link site-relative; everything else gets absolute URLs
  fn base(&self, website_tags: bool) -> &str {
    if website_tags { "" } else { self.site_url.as_str() }
  }

  /// Reference line for an automation trigger platform (`automation.<domain>`)
  ///
  /// Unknown domains yield `None`.
  pub fn automation_link(&self, platform: &str, website_tags: bool) -> Option<String> {
    let domain = platform.strip_prefix("automation.")?;
    if !AUTOMATION_TRIGGERS.contains(&domain) {
      return None;
    }

    let anchor = match domain {
      "openpeerpower" => "open-peer-power".to_string(),
      other => other.replace('_', "-"),
    };

    Some(format!(
      "[{} docs]: {}/docs/automation/trigger/#{}-trigger",
      platform,
      self.base(website_tags),
      anchor
    ))
  }

  /// Reference line for an integration page
  pub fn integration_link(&self, name: &str, website_tags: bool) -> String {
    format!("[{} docs]: {}/integrations/{}/", name, self.base(website_tags), name)
  }

  /// Append a docs marker to `parts` and its reference to `links`
  ///
  /// Labels other than `integration: <name>` are ignored, as are automation
  /// platforms without a documented trigger.
  pub fn process_doc_label(&self, label: &str, parts: &mut Vec<String>, links: &mut BTreeSet<String>, website_tags: bool) {
    let LabelClass::Integration(name) = classify_label(label) else {
      return;
    };

    let link = if name.starts_with("automation.") {
      self.automation_link(&name, website_tags)
    } else {
      Some(self.integration_link(&name, website_tags))
    };

    let Some(link) = link else {
      debug!(label, "no documentation page for label");
      return;
    };

    parts.push(format!("([{} docs])", name));
    links.insert(link);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_automation_link() {
    let linker = DocLinker::default();

    assert_eq!(
      linker.automation_link("automation.mqtt", false).unwrap(),
      "[automation.mqtt docs]: https://www.open-peer-power.io/docs/automation/trigger/#mqtt-trigger"
    );
    assert_eq!(
      linker.automation_link("automation.openpeerpower", false).unwrap(),
      "[automation.openpeerpower docs]: https://www.open-peer-power.io/docs/automation/trigger/#open-peer-power-trigger"
    );
    assert_eq!(
      linker.automation_link("automation.numeric_state", false).unwrap(),
      "[automation.numeric_state docs]: https://www.open-peer-power.io/docs/automation/trigger/#numeric-state-trigger"
    );
  }

  #[test]
  fn test_automation_link_website_is_relative() {
    assert_eq!(
      DocLinker::default().automation_link("automation.time_pattern", true).unwrap(),
      "[automation.time_pattern docs]: /docs/automation/trigger/#time-pattern-trigger"
    );
  }

  #[test]
  fn test_automation_link_unknown_domain_fails_soft() {
    let linker = DocLinker::default();
    assert_eq!(linker.automation_link("automation.teleport", false), None);
    assert_eq!(linker.automation_link("mqtt", false), None);
  }

  #[test]
  fn test_process_doc_label() {
    let linker = DocLinker::default();
    let mut links = BTreeSet::new();
    let mut parts = Vec::new();

    linker.process_doc_label("integration: hue", &mut parts, &mut links, false);

    assert_eq!(parts.last().unwrap(), "([hue docs])");
    assert!(links.iter().next().unwrap().starts_with("[hue docs]"));
    assert_eq!(
      links.iter().next().unwrap(),
      "[hue docs]: https://www.open-peer-power.io/integrations/hue/"
    );
  }

  #[test]
  fn test_process_doc_label_ignores_other_labels() {
    let linker = DocLinker::default();
    let mut links = BTreeSet::new();
    let mut parts = Vec::new();

    linker.process_doc_label("breaking-change", &mut parts, &mut links, false);
    linker.process_doc_label("integration: automation.teleport", &mut parts, &mut links, false);
    linker.process_doc_label("integration: ", &mut parts, &mut links, false);

    assert!(parts.is_empty());
    assert!(links.is_empty());
  }

  #[test]
  fn test_classify_label() {
    assert_eq!(
      classify_label("breaking-change"),
      LabelClass::Category(Category::BreakingChange)
    );
    assert_eq!(
      classify_label("new-platform"),
      LabelClass::Category(Category::NewPlatform)
    );
    assert_eq!(
      classify_label("integration: zwave"),
      LabelClass::Integration("zwave".to_string())
    );
    assert_eq!(classify_label("cla-signed"), LabelClass::Unmatched);
    assert_eq!(classify_label("integration:"), LabelClass::Unmatched);
  }
}
