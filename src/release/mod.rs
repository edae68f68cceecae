//! Release history against tracker metadata
//!
//! # Architecture
//!
//! - **log**: `origin/master...<branch>` log text into [`log::LogLine`]s
//! - **pr_cache**: read-through pull request cache, one per invocation
//! - **labels**: label classification and documentation links
//! - **changelog**: plain and web release notes
//! - **cherry_pick**: milestone reconciliation with the tracking label
//!
//! Everything here is sequential. Remote fetches happen one at a time as the
//! log is walked, and cherry-picks mutate the checkout in order.

pub mod changelog;
pub mod cherry_pick;
pub mod labels;
pub mod log;
pub mod pr_cache;

pub use changelog::{ChangelogGenerator, Variant};
pub use cherry_pick::CherryPickReconciler;
pub use log::Release;
pub use pr_cache::PrCache;
