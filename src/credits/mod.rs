//! Contributor credits
//!
//! - **cache**: the two on-disk identity caches
//! - **pipeline**: bounded-concurrency identity resolution
//! - **page**: the markdown credits page

pub mod cache;
pub mod page;
pub mod pipeline;

pub use page::render_page;
pub use pipeline::{CreditsOptions, CreditsPipeline};
