//! Diagnostic logging on stderr
//!
//! Reports meant for the user (pick report, commit lists) are printed to
//! stdout by the commands; everything here goes to stderr.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set
fn default_filter(verbose: bool, quiet: bool) -> String {
  let level = if verbose {
    "debug"
  } else if quiet {
    "warn"
  } else {
    "info"
  };
  format!("opp_release={}", level)
}

/// Initialize the global subscriber; `RUST_LOG` overrides the flags
pub fn init(verbose: bool, quiet: bool) {
  let env_filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbose, quiet)));

  let stderr_layer = fmt::layer()
    .with_writer(std::io::stderr)
    .with_target(false)
    .compact();

  // A second init (tests) keeps the first subscriber
  let _ = tracing_subscriber::registry()
    .with(env_filter)
    .with(stderr_layer)
    .try_init();
}
