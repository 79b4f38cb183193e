//! proclog library
//!
//! Command-line follower for server-side process logs.

pub mod cli;
pub mod follow;

// Re-export main entry points
pub use cli::Args;
pub use follow::{run_follow, FollowOutcome};
