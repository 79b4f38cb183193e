//! Whole-log load: fetch the log from offset 0

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use proclog_client::LogService;
use proclog_core::{InstanceId, LogRange};

use crate::log_state::LogResponse;
use crate::message::Message;
use crate::state::SessionId;

/// Fetch the complete log and report it to the engine.
///
/// Resuming polling afterwards is the handler's job, so a load cancelled
/// before it reports never restarts anything.
pub async fn load_whole_log<S>(
    session_id: SessionId,
    instance_id: InstanceId,
    service: Arc<S>,
    msg_tx: mpsc::Sender<Message>,
) where
    S: LogService + Sync + 'static,
{
    debug!(
        "Session {}: fetching whole log of {}",
        session_id, instance_id
    );

    let msg = match service
        .fetch_log(instance_id, LogRange::starting_at(0))
        .await
    {
        Ok(chunk) => {
            debug!("Session {}: whole log is {} bytes", session_id, chunk.len());
            Message::WholeLogLoaded { session_id, chunk }
        }
        Err(e) => {
            warn!("Session {}: loading whole log failed: {}", session_id, e);
            Message::LogReceived {
                session_id,
                response: LogResponse::failed(e),
            }
        }
    };

    let _ = msg_tx.send(msg).await;
}
