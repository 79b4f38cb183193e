//! Application state (Model in TEA pattern)

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use proclog_core::{DisplayOptions, InstanceId, LogRange};

use crate::config::Settings;
use crate::log_state::LogState;

/// Identifier of one polling or loading session
pub type SessionId = u64;

static SESSION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a new unique session ID
pub fn next_session_id() -> SessionId {
    SESSION_ID_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// What the follower is currently doing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FollowPhase {
    /// Nothing started yet
    #[default]
    Idle,
    /// A polling iteration is fetching
    Polling,
    /// Between polling iterations
    Waiting { delay: Duration },
    /// A whole-log load is fetching
    Loading,
    /// The last session ended (stop, terminal status or error)
    Stopped,
}

/// Kind of the running session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Polling,
    WholeLog,
}

/// The one session whose results are applied to the log state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSession {
    pub id: SessionId,
    pub kind: SessionKind,
    pub instance_id: InstanceId,
    pub options: DisplayOptions,
}

/// Everything a View observes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSnapshot {
    pub instance_id: Option<InstanceId>,
    pub phase: FollowPhase,
    pub log: LogState,
}

/// Complete application state
#[derive(Debug)]
pub struct AppState {
    /// Accumulated log of the followed instance
    pub log: LogState,

    /// Controller phase
    pub phase: FollowPhase,

    /// Running session; messages from any other session are discarded
    pub active: Option<ActiveSession>,

    /// Instance the log belongs to (kept after the session ends)
    pub instance_id: Option<InstanceId>,

    /// Delay between polling iterations
    pub poll_interval: Duration,

    /// Range the first poll of a fresh start asks for
    pub default_range: LogRange,

    /// Quit requested
    pub quit_requested: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_settings(&Settings::default())
    }

    pub fn with_settings(settings: &Settings) -> Self {
        Self {
            log: LogState::new(),
            phase: FollowPhase::Idle,
            active: None,
            instance_id: None,
            poll_interval: settings.polling.interval(),
            default_range: LogRange::tail(settings.polling.initial_tail_bytes),
            quit_requested: false,
        }
    }

    /// The active session, if `session_id` is it
    pub fn active_session(&self, session_id: SessionId) -> Option<&ActiveSession> {
        self.active.as_ref().filter(|s| s.id == session_id)
    }

    pub fn is_active_session(&self, session_id: SessionId) -> bool {
        self.active_session(session_id).is_some()
    }

    /// End the active session, if any, and return its id
    pub fn end_session(&mut self) -> Option<SessionId> {
        let ended = self.active.take().map(|s| s.id);
        if ended.is_some() {
            self.phase = FollowPhase::Stopped;
        }
        ended
    }

    pub fn should_quit(&self) -> bool {
        self.quit_requested
    }

    /// Value published to subscribers
    pub fn snapshot(&self) -> LogSnapshot {
        LogSnapshot {
            instance_id: self.instance_id,
            phase: self.phase,
            log: self.log.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proclog_client::test_utils::test_instance_id;

    fn session(kind: SessionKind) -> ActiveSession {
        ActiveSession {
            id: next_session_id(),
            kind,
            instance_id: test_instance_id(),
            options: DisplayOptions::default(),
        }
    }

    #[test]
    fn test_session_ids_are_unique() {
        let a = next_session_id();
        let b = next_session_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_default_state_uses_settings() {
        let state = AppState::new();
        assert_eq!(state.phase, FollowPhase::Idle);
        assert_eq!(state.poll_interval, Duration::from_millis(5000));
        assert_eq!(state.default_range, LogRange::tail(2048));
        assert!(!state.should_quit());
    }

    #[test]
    fn test_active_session_matching() {
        let mut state = AppState::new();
        let s = session(SessionKind::Polling);
        state.active = Some(s);

        assert!(state.is_active_session(s.id));
        assert!(!state.is_active_session(s.id + 1000));
    }

    #[test]
    fn test_end_session() {
        let mut state = AppState::new();
        assert_eq!(state.end_session(), None);
        assert_eq!(state.phase, FollowPhase::Idle);

        let s = session(SessionKind::WholeLog);
        state.active = Some(s);
        state.phase = FollowPhase::Loading;
        assert_eq!(state.end_session(), Some(s.id));
        assert_eq!(state.phase, FollowPhase::Stopped);
        assert!(state.active.is_none());
    }
}
