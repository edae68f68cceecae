//! Integration tests: real git checkouts, compiled binary, no network

mod helpers;
mod test_cli;
mod test_credits;
mod test_pick;
mod test_release_notes;
