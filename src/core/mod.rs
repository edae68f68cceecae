//! Core building blocks shared by every command
//!
//! - **config**: opp-release.toml parsing and validation
//! - **context**: per-invocation context (config, tracker handle, git runner)
//! - **error**: error types with contextual help messages and exit codes
//! - **vcs**: git command runner and local checkout operations

pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
