//! Engine - orchestration state for the log follower
//!
//! The Engine owns the TEA state, the message channel, the single running
//! session task and the snapshot publisher. Views talk to it through a
//! [`FollowerHandle`] and observe it through a `watch` channel.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use proclog_client::LogService;
use proclog_core::{DisplayOptions, Error, InstanceId, LogRange, Result};

use crate::actions::{self, SessionTask};
use crate::config::Settings;
use crate::handler;
use crate::message::Message;
use crate::state::{AppState, LogSnapshot};

/// Capacity of the message channel
const MESSAGE_CHANNEL_CAPACITY: usize = 256;

/// Orchestration engine for one followed log.
pub struct Engine<S> {
    /// TEA application state (the Model)
    pub state: AppState,

    /// Sender half of the message channel.
    /// Cloned into session tasks and handles.
    pub msg_tx: mpsc::Sender<Message>,

    /// Receiver half of the message channel.
    pub msg_rx: mpsc::Receiver<Message>,

    /// Running session task, if any
    task: Option<SessionTask>,

    /// Log service shared with session tasks
    service: Arc<S>,

    /// Latest published state
    snapshot_tx: watch::Sender<LogSnapshot>,

    /// Loaded settings
    pub settings: Settings,
}

impl<S> Engine<S>
where
    S: LogService + Sync + 'static,
{
    /// Create an engine over `service`.
    pub fn new(service: Arc<S>, settings: Settings) -> Self {
        let state = AppState::with_settings(&settings);
        let (msg_tx, msg_rx) = mpsc::channel::<Message>(MESSAGE_CHANNEL_CAPACITY);
        let (snapshot_tx, _) = watch::channel(state.snapshot());

        Self {
            state,
            msg_tx,
            msg_rx,
            task: None,
            service,
            snapshot_tx,
            settings,
        }
    }

    /// Get a clone of the message sender for spawning input sources.
    pub fn msg_sender(&self) -> mpsc::Sender<Message> {
        self.msg_tx.clone()
    }

    /// Subscribe to state snapshots.
    pub fn subscribe(&self) -> watch::Receiver<LogSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Intent API for Views
    pub fn handle(&self) -> FollowerHandle {
        FollowerHandle {
            msg_tx: self.msg_tx.clone(),
            snapshot_rx: self.subscribe(),
        }
    }

    /// Process a single message through the TEA update cycle.
    ///
    /// Runs `handler::update`, dispatches the resulting action, follows
    /// chained messages, then publishes a snapshot if anything changed.
    pub fn process_message(&mut self, msg: Message) {
        let mut msg = Some(msg);
        while let Some(m) = msg {
            let result = handler::update(&mut self.state, m);

            if let Some(action) = result.action {
                actions::handle_action(action, &self.msg_tx, &self.service, &mut self.task);
            }

            msg = result.message;
        }

        self.publish();
    }

    /// Drain and process all pending messages from the channel.
    ///
    /// Returns the number of messages processed.
    pub fn drain_pending_messages(&mut self) -> usize {
        let mut count = 0;
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.process_message(msg);
            count += 1;
        }
        count
    }

    /// Process messages until quit is requested.
    pub async fn run(&mut self) {
        while !self.should_quit() {
            match self.msg_rx.recv().await {
                Some(msg) => self.process_message(msg),
                None => break,
            }
        }
        debug!("Engine loop finished");
    }

    /// Check if the application should quit.
    pub fn should_quit(&self) -> bool {
        self.state.should_quit()
    }

    /// Current snapshot
    pub fn snapshot(&self) -> LogSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Abort the running session task.
    pub fn shutdown(&mut self) {
        if self.task.is_some() {
            info!("Shutting down running session");
        }
        actions::cancel(&mut self.task);
    }

    fn publish(&self) {
        let next = self.state.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

impl<S> Drop for Engine<S> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FollowerHandle
// ─────────────────────────────────────────────────────────────────────────────

/// Cloneable intent API over an [`Engine`]
#[derive(Debug, Clone)]
pub struct FollowerHandle {
    msg_tx: mpsc::Sender<Message>,
    snapshot_rx: watch::Receiver<LogSnapshot>,
}

impl FollowerHandle {
    /// Start polling `instance_id`. `range = None` uses the configured tail.
    pub async fn start_polling(
        &self,
        instance_id: InstanceId,
        options: DisplayOptions,
        range: Option<LogRange>,
        reset: bool,
    ) -> Result<()> {
        self.send(Message::StartPolling {
            instance_id,
            options,
            range,
            reset,
        })
        .await
    }

    pub async fn stop_polling(&self) -> Result<()> {
        self.send(Message::StopPolling).await
    }

    /// Replace the log with the full log, then keep polling from its end
    pub async fn load_whole(&self, instance_id: InstanceId, options: DisplayOptions) -> Result<()> {
        self.send(Message::LoadWholeLog {
            instance_id,
            options,
        })
        .await
    }

    pub async fn force_refresh(&self) -> Result<()> {
        self.send(Message::ForceRefresh).await
    }

    pub async fn reset(&self) -> Result<()> {
        self.send(Message::Reset).await
    }

    pub async fn quit(&self) -> Result<()> {
        self.send(Message::Quit).await
    }

    /// Subscribe to state snapshots
    pub fn subscribe(&self) -> watch::Receiver<LogSnapshot> {
        self.snapshot_rx.clone()
    }

    async fn send(&self, msg: Message) -> Result<()> {
        self.msg_tx
            .send(msg)
            .await
            .map_err(|_| Error::ChannelClosed)
    }
}
