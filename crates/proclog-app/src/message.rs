//! Message types for the application (TEA pattern)

use std::time::Duration;

use proclog_core::{DisplayOptions, InstanceId, LogChunk, LogRange};

use crate::log_state::LogResponse;
use crate::state::SessionId;

/// All possible messages/actions in the application
#[derive(Debug, Clone)]
pub enum Message {
    // ─────────────────────────────────────────────────────────
    // Intents (from the View)
    // ─────────────────────────────────────────────────────────
    /// Start polling an instance, superseding any running session
    StartPolling {
        instance_id: InstanceId,
        options: DisplayOptions,
        /// Initial working range (`None` = configured tail)
        range: Option<LogRange>,
        /// Clear the accumulated log first
        reset: bool,
    },

    /// Cancel the running session
    StopPolling,

    /// Replace the log with the full log, then resume polling from its end
    LoadWholeLog {
        instance_id: InstanceId,
        options: DisplayOptions,
    },

    /// Cut the current wait short
    ForceRefresh,

    /// Clear the accumulated log
    Reset,

    /// Request application quit
    Quit,

    // ─────────────────────────────────────────────────────────
    // Session Events (from background tasks)
    // ─────────────────────────────────────────────────────────
    /// A polling iteration issued its fetches
    LogRequested { session_id: SessionId },

    /// A polling iteration or whole-log load completed
    LogReceived {
        session_id: SessionId,
        response: LogResponse,
    },

    /// The polling loop is waiting before its next iteration
    PollWaiting {
        session_id: SessionId,
        delay: Duration,
    },

    /// The polling loop saw a terminal status and ended
    PollFinished { session_id: SessionId },

    /// The whole log was fetched
    WholeLogLoaded {
        session_id: SessionId,
        chunk: LogChunk,
    },
}

impl Message {
    /// Session the message originates from, for task-sourced messages
    pub fn session_id(&self) -> Option<SessionId> {
        match self {
            Message::LogRequested { session_id }
            | Message::LogReceived { session_id, .. }
            | Message::PollWaiting { session_id, .. }
            | Message::PollFinished { session_id }
            | Message::WholeLogLoaded { session_id, .. } => Some(*session_id),
            _ => None,
        }
    }
}
