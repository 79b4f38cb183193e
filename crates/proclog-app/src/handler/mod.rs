//! Handler module - TEA update function
//!
//! Organized into submodules:
//! - `update`: Main update() function and message dispatch

pub mod update;


use std::time::Duration;

use proclog_core::{DisplayOptions, InstanceId, LogRange};

use crate::message::Message;
use crate::state::SessionId;

// Re-export main entry point
pub use update::update;

/// Actions that the event loop should perform after update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateAction {
    /// Spawn a polling loop, replacing any running session task
    SpawnPolling {
        session_id: SessionId,
        instance_id: InstanceId,
        range: LogRange,
        options: DisplayOptions,
        interval: Duration,
    },

    /// Spawn a whole-log load, replacing any running session task
    SpawnWholeLoad {
        session_id: SessionId,
        instance_id: InstanceId,
    },

    /// Abort the running session task
    CancelSession,

    /// Wake the polling loop out of its wait
    ForceRefresh,
}

/// Result of processing a message
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Optional follow-up message to process
    pub message: Option<Message>,
    /// Optional action for the event loop to perform
    pub action: Option<UpdateAction>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn message(msg: Message) -> Self {
        Self {
            message: Some(msg),
            action: None,
        }
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            message: None,
            action: Some(action),
        }
    }
}
