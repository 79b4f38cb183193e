//! Polling loop: fetch status and log chunk, wait, repeat until terminal

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Notify};
use tracing::{debug, warn};

use proclog_client::LogService;
use proclog_core::{DisplayOptions, InstanceId, LogRange};

use crate::log_state::LogResponse;
use crate::message::Message;
use crate::state::SessionId;

/// Everything one polling session needs
pub struct PollContext<S> {
    pub session_id: SessionId,
    pub instance_id: InstanceId,
    pub options: DisplayOptions,
    pub interval: Duration,
    pub service: Arc<S>,
    pub msg_tx: mpsc::Sender<Message>,
    /// Notified to cut a wait short
    pub refresh: Arc<Notify>,
}

/// Next step of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollStep {
    Fetch(LogRange),
    Wait(LogRange),
    Done,
}

/// Run polling iterations starting at `range` until the process reaches a
/// terminal status, a fetch fails, or the message channel closes.
pub async fn run_poll_loop<S>(ctx: PollContext<S>, range: LogRange)
where
    S: LogService + Sync + 'static,
{
    let mut step = PollStep::Fetch(range);
    loop {
        step = match step {
            PollStep::Fetch(range) => ctx.fetch(range).await,
            PollStep::Wait(range) => ctx.wait(range).await,
            PollStep::Done => break,
        };
    }
    debug!("Session {}: polling loop ended", ctx.session_id);
}

impl<S> PollContext<S>
where
    S: LogService + Sync + 'static,
{
    async fn fetch(&self, range: LogRange) -> PollStep {
        if !self
            .send(Message::LogRequested {
                session_id: self.session_id,
            })
            .await
        {
            return PollStep::Done;
        }

        debug!(
            "Session {}: fetching {} range {:?}",
            self.session_id, self.instance_id, range
        );

        let fetched = tokio::try_join!(
            self.service.fetch_process(self.instance_id),
            self.service.fetch_log(self.instance_id, range),
        );

        let (entry, chunk) = match fetched {
            Ok(both) => both,
            Err(e) => {
                warn!("Session {}: poll failed: {}", self.session_id, e);
                self.send(Message::LogReceived {
                    session_id: self.session_id,
                    response: LogResponse::failed(e),
                })
                .await;
                return PollStep::Done;
            }
        };

        let next = range.advance(&chunk.range);
        let finished = entry.status.is_final();
        debug!(
            "Session {}: got {} bytes, status {}, next {:?}",
            self.session_id,
            chunk.len(),
            entry.status,
            next
        );

        let response = LogResponse::appended(chunk, entry.status, self.options);
        if !self
            .send(Message::LogReceived {
                session_id: self.session_id,
                response,
            })
            .await
        {
            return PollStep::Done;
        }

        if finished {
            self.send(Message::PollFinished {
                session_id: self.session_id,
            })
            .await;
            return PollStep::Done;
        }

        PollStep::Wait(next)
    }

    async fn wait(&self, range: LogRange) -> PollStep {
        // Registered before PollWaiting goes out so a refresh sent in
        // response to it is not missed.
        let notified = self.refresh.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        if !self
            .send(Message::PollWaiting {
                session_id: self.session_id,
                delay: self.interval,
            })
            .await
        {
            return PollStep::Done;
        }

        tokio::select! {
            _ = tokio::time::sleep(self.interval) => {}
            _ = &mut notified => {
                debug!("Session {}: refresh requested", self.session_id);
            }
        }

        PollStep::Fetch(range)
    }

    /// Send to the engine; false once the engine is gone
    async fn send(&self, msg: Message) -> bool {
        self.msg_tx.send(msg).await.is_ok()
    }
}
