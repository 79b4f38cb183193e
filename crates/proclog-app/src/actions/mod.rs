//! Action handlers: UpdateAction dispatch and background task spawning
//!
//! At most one session task runs per engine. Spawning a new one aborts the
//! previous task; the handler discards anything it already sent because the
//! messages carry a session id that is no longer active.

pub mod polling;
pub mod whole_log;

use std::sync::Arc;

use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tracing::debug;

use proclog_client::LogService;

use crate::message::Message;
use crate::state::SessionId;
use crate::UpdateAction;

pub use polling::{run_poll_loop, PollContext};
pub use whole_log::load_whole_log;

/// Handle to the running session task
#[derive(Debug)]
pub struct SessionTask {
    pub session_id: SessionId,
    handle: JoinHandle<()>,
    refresh: Arc<Notify>,
}

impl SessionTask {
    /// Wake the task if it is waiting between polling iterations
    pub fn refresh(&self) {
        self.refresh.notify_waiters();
    }

    pub fn abort(self) {
        debug!("Aborting session {}", self.session_id);
        self.handle.abort();
    }
}

/// Execute an action, updating the engine's single task slot
pub fn handle_action<S>(
    action: UpdateAction,
    msg_tx: &mpsc::Sender<Message>,
    service: &Arc<S>,
    task: &mut Option<SessionTask>,
) where
    S: LogService + Sync + 'static,
{
    match action {
        UpdateAction::SpawnPolling {
            session_id,
            instance_id,
            range,
            options,
            interval,
        } => {
            cancel(task);
            let refresh = Arc::new(Notify::new());
            let ctx = PollContext {
                session_id,
                instance_id,
                options,
                interval,
                service: service.clone(),
                msg_tx: msg_tx.clone(),
                refresh: refresh.clone(),
            };
            let handle = tokio::spawn(run_poll_loop(ctx, range));
            *task = Some(SessionTask {
                session_id,
                handle,
                refresh,
            });
        }

        UpdateAction::SpawnWholeLoad {
            session_id,
            instance_id,
        } => {
            cancel(task);
            let handle = tokio::spawn(load_whole_log(
                session_id,
                instance_id,
                service.clone(),
                msg_tx.clone(),
            ));
            *task = Some(SessionTask {
                session_id,
                handle,
                refresh: Arc::new(Notify::new()),
            });
        }

        UpdateAction::CancelSession => cancel(task),

        UpdateAction::ForceRefresh => {
            if let Some(running) = task.as_ref() {
                running.refresh();
            }
        }
    }
}

/// Abort whatever occupies the task slot
pub fn cancel(task: &mut Option<SessionTask>) {
    if let Some(running) = task.take() {
        running.abort();
    }
}
