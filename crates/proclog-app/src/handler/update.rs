//! Main update function - handles state transitions (TEA pattern)

use proclog_core::{DisplayOptions, InstanceId, LogChunk, LogRange};
use tracing::{debug, info, warn};

use crate::log_state::{LogEvent, LogResponse};
use crate::message::Message;
use crate::state::{next_session_id, ActiveSession, AppState, FollowPhase, SessionId, SessionKind};

use super::{UpdateAction, UpdateResult};

/// Process a message and update state
/// Returns optional follow-up message and/or action
pub fn update(state: &mut AppState, message: Message) -> UpdateResult {
    if let Some(session_id) = message.session_id() {
        if !state.is_active_session(session_id) {
            debug!("Discarding message from stale session {}", session_id);
            return UpdateResult::none();
        }
    }

    match message {
        // ─────────────────────────────────────────────────────────
        // Intents
        // ─────────────────────────────────────────────────────────
        Message::StartPolling {
            instance_id,
            options,
            range,
            reset,
        } => handle_start_polling(state, instance_id, options, range, reset),

        Message::StopPolling => match state.end_session() {
            Some(session_id) => {
                info!("Stopped session {}", session_id);
                UpdateResult::action(UpdateAction::CancelSession)
            }
            None => UpdateResult::none(),
        },

        Message::LoadWholeLog {
            instance_id,
            options,
        } => handle_load_whole(state, instance_id, options),

        Message::ForceRefresh => {
            if matches!(state.phase, FollowPhase::Waiting { .. }) {
                UpdateResult::action(UpdateAction::ForceRefresh)
            } else {
                debug!("Refresh ignored in phase {:?}", state.phase);
                UpdateResult::none()
            }
        }

        Message::Reset => {
            state.log.apply(&LogEvent::Reset);
            UpdateResult::none()
        }

        Message::Quit => {
            state.quit_requested = true;
            match state.end_session() {
                Some(_) => UpdateResult::action(UpdateAction::CancelSession),
                None => UpdateResult::none(),
            }
        }

        // ─────────────────────────────────────────────────────────
        // Session Events
        // ─────────────────────────────────────────────────────────
        Message::LogRequested { .. } => {
            state.log.apply(&LogEvent::Request);
            state.phase = FollowPhase::Polling;
            UpdateResult::none()
        }

        Message::LogReceived { response, .. } => {
            handle_log_received(state, response);
            UpdateResult::none()
        }

        Message::PollWaiting { delay, .. } => {
            state.phase = FollowPhase::Waiting { delay };
            UpdateResult::none()
        }

        Message::PollFinished { session_id } => {
            let status = state.log.status.map(|s| s.as_str()).unwrap_or("(unknown)");
            info!(
                "Session {}: process reached terminal status {}, polling stopped",
                session_id, status
            );
            state.end_session();
            UpdateResult::none()
        }

        Message::WholeLogLoaded { session_id, chunk } => {
            handle_whole_log_loaded(state, session_id, chunk)
        }
    }
}

fn handle_start_polling(
    state: &mut AppState,
    instance_id: InstanceId,
    options: DisplayOptions,
    range: Option<LogRange>,
    reset: bool,
) -> UpdateResult {
    if reset {
        state.log.apply(&LogEvent::Reset);
    }

    let session_id = next_session_id();
    let range = range.unwrap_or(state.default_range);
    info!(
        "Session {}: polling {} from {:?} every {:?}",
        session_id, instance_id, range, state.poll_interval
    );

    state.active = Some(ActiveSession {
        id: session_id,
        kind: SessionKind::Polling,
        instance_id,
        options,
    });
    state.instance_id = Some(instance_id);
    state.phase = FollowPhase::Polling;

    UpdateResult::action(UpdateAction::SpawnPolling {
        session_id,
        instance_id,
        range,
        options,
        interval: state.poll_interval,
    })
}

fn handle_load_whole(
    state: &mut AppState,
    instance_id: InstanceId,
    options: DisplayOptions,
) -> UpdateResult {
    let session_id = next_session_id();
    info!("Session {}: loading whole log of {}", session_id, instance_id);

    state.active = Some(ActiveSession {
        id: session_id,
        kind: SessionKind::WholeLog,
        instance_id,
        options,
    });
    state.instance_id = Some(instance_id);
    state.phase = FollowPhase::Loading;
    state.log.apply(&LogEvent::Request);

    UpdateResult::action(UpdateAction::SpawnWholeLoad {
        session_id,
        instance_id,
    })
}

fn handle_log_received(state: &mut AppState, response: LogResponse) {
    let failed = response.error.clone();
    state.log.apply(&LogEvent::Response(response));

    if let Some(error) = failed {
        warn!("Fetching log failed: {}", error);
        state.end_session();
    }
}

fn handle_whole_log_loaded(
    state: &mut AppState,
    session_id: SessionId,
    chunk: LogChunk,
) -> UpdateResult {
    let Some(session) = state.active_session(session_id).copied() else {
        return UpdateResult::none();
    };

    if session.kind != SessionKind::WholeLog {
        warn!("Session {} is not a whole-log load", session_id);
        return UpdateResult::none();
    }

    let next = LogRange::starting_at(0).advance(&chunk.range);
    debug!(
        "Whole log loaded ({} bytes), resuming from {:?}",
        chunk.len(),
        next.low
    );
    state.log.apply(&LogEvent::Response(LogResponse::overwrite(
        chunk,
        session.options,
    )));

    UpdateResult::message(Message::StartPolling {
        instance_id: session.instance_id,
        options: session.options,
        range: Some(next),
        reset: false,
    })
}
