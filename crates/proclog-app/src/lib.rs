//! proclog-app - Log follower state and orchestration for proclog
//!
//! This crate implements the TEA (The Elm Architecture) pattern for the log
//! follower: [`LogState`] is the view model, [`handler::update`] the state
//! machine, `actions` the polling and whole-log tasks, and [`Engine`] the
//! event loop tying them together. Settings loading lives in [`config`].

pub mod actions;
pub mod config;
pub mod engine;
pub mod handler;
pub mod log_state;
pub mod message;
pub mod signals;
pub mod state;

// Re-export primary types
pub use config::Settings;
pub use engine::{Engine, FollowerHandle};
pub use handler::{UpdateAction, UpdateResult};
pub use log_state::{LogEvent, LogResponse, LogState, UNKNOWN_LENGTH};
pub use message::Message;
pub use state::{AppState, FollowPhase, LogSnapshot, SessionId};
