//! Credits page rendering

use super::pipeline::Contributor;
use chrono::{DateTime, Utc};

/// Markdown page for the website, roster already sorted
pub fn render_page(roster: &[Contributor], generated: DateTime<Utc>) -> String {
  let mut page = String::new();

  page.push_str("---\n");
  page.push_str("title: \"Credits\"\n");
  page.push_str("description: \"Credits for the developers who contributed to Open Peer Power.\"\n");
  page.push_str(&format!("date: {}\n", generated.format("%Y-%m-%d %H:%M:%S %z")));
  page.push_str("sidebar: true\n");
  page.push_str("layout: page\n");
  page.push_str("---\n\n");
  page.push_str(&format!(
    "This page lists the {} people who have contributed commits to Open Peer Power, its frontend and its website.\n\n",
    roster.len()
  ));

  for contributor in roster {
    page.push_str(&entry(contributor));
    page.push('\n');
  }

  page
}

fn entry(contributor: &Contributor) -> String {
  let commits = match contributor.commits {
    1 => "1 commit".to_string(),
    n => format!("{} commits", n),
  };
  let name = escape(&contributor.name);

  match &contributor.login {
    Some(login) => format!("- [{}](https://github.com/{}) ({})", name, login, commits),
    None => format!("- {} ({})", name, commits),
  }
}

/// Brackets would break the link syntax
fn escape(name: &str) -> String {
  name.replace('[', "\\[").replace(']', "\\]")
}
