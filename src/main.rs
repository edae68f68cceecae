mod commands;
mod core;
mod credits;
mod logging;
mod release;
mod remote;
mod ui;

use crate::core::config::RepoKey;
use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseError, ResultExt, print_error};
use clap::builder::TypedValueParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Release helper for Open Peer Power: release notes, cherry-picks, credits
#[derive(Parser)]
#[command(name = "opp-release")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Show debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Configuration file (default: opp-release.toml in the current directory)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Generate release notes for Open Peer Power
  ReleaseNotes {
    /// Release branch
    #[arg(long, default_value = "rc")]
    branch: String,
    /// Version being released (default: read from the branch)
    #[arg(long)]
    release: Option<String>,
    /// Regenerate even when both files already exist
    #[arg(long)]
    force_update: bool,
  },

  /// Cherry pick all merged PRs of a milestone into the current branch
  Pick {
    /// Repository to pick into
    #[arg(value_enum, default_value_t = RepoKey::Core)]
    repository: RepoKey,
    /// Milestone title (default: latest open version milestone)
    #[arg(long)]
    milestone: Option<String>,
  },

  /// Close a milestone
  MilestoneClose {
    /// Milestone title (default: latest open version milestone)
    #[arg(long)]
    milestone: Option<String>,
  },

  /// List the merge commits of a milestone
  MilestoneListCommits {
    /// Repository owning the milestone
    #[arg(long, value_enum, default_value_t = RepoKey::Core)]
    repository: RepoKey,
    /// Milestone title
    title: String,
  },

  /// Find unmerged documentation PRs
  UnmergedDocs {
    /// Release branch
    #[arg(long, default_value = "rc")]
    branch: String,
    /// Version being released
    release: String,
  },

  /// Generate the credits page
  Credits {
    /// How many API requests can be performed simultaneously
    #[arg(
      short = 'r',
      long,
      default_value_t = credits::pipeline::DEFAULT_SIMUL_REQUESTS,
      value_parser = clap::value_parser!(u16).range(1..).map(usize::from)
    )]
    simul_requests: usize,
    /// Do not use the locally cached name-by-login and login-by-email files
    #[arg(short = 'c', long)]
    no_cache: bool,
    /// Suppress console logging and progress
    #[arg(short, long)]
    quiet: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();

  let quiet = matches!(cli.command, Commands::Credits { quiet: true, .. });
  logging::init(cli.verbose, quiet);

  let root = match std::env::current_dir().context("Failed to get current directory") {
    Ok(dir) => dir,
    Err(e) => handle_error(e),
  };

  // One context (config + tracker handle) per invocation
  let ctx = match ReleaseContext::build(&root, cli.config.as_deref()) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let result = match cli.command {
    Commands::ReleaseNotes {
      branch,
      release,
      force_update,
    } => commands::run_release_notes(&ctx, &branch, release, force_update),
    Commands::Pick { repository, milestone } => commands::run_pick(&ctx, repository, milestone.as_deref()),
    Commands::MilestoneClose { milestone } => commands::run_milestone_close(&ctx, milestone.as_deref()),
    Commands::MilestoneListCommits { repository, title } => {
      commands::run_milestone_list_commits(&ctx, repository, &title)
    }
    Commands::UnmergedDocs { branch, release } => commands::run_unmerged_docs(&ctx, &branch, &release),
    Commands::Credits {
      simul_requests,
      no_cache,
      quiet,
    } => commands::run_credits(&ctx, simul_requests, no_cache, quiet).map(|_| ()),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: ReleaseError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
