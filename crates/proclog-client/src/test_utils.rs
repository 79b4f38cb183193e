//! Test utilities for the log service
//!
//! Provides [`ScriptedLogService`], a [`LogService`] whose answers are queued
//! up front by the test and whose calls are recorded for later assertions.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::time::Instant;

use proclog_core::{Error, InstanceId, LogChunk, LogRange, ProcessEntry, ProcessStatus, Result};

use crate::service::LogService;

/// A recorded `fetch_log` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogCall {
    pub instance_id: InstanceId,
    pub range: LogRange,
    /// When the call was made (tokio clock, so paused-time tests can use it)
    pub at: Instant,
}

#[derive(Default)]
struct Script {
    statuses: VecDeque<Result<ProcessStatus>>,
    chunks: VecDeque<Result<LogChunk>>,
    status_calls: usize,
    log_calls: Vec<LogCall>,
}

/// Log service driven by queued answers.
///
/// Each `fetch_process` / `fetch_log` call pops the next queued answer. Once
/// a queue is empty the call never completes, which models a request that is
/// still in flight when the test inspects the state.
#[derive(Default)]
pub struct ScriptedLogService {
    script: Mutex<Script>,
}

impl ScriptedLogService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a status answer
    pub fn push_status(&self, status: ProcessStatus) -> &Self {
        self.lock().statuses.push_back(Ok(status));
        self
    }

    /// Queue a failing status answer
    pub fn push_status_error(&self, error: Error) -> &Self {
        self.lock().statuses.push_back(Err(error));
        self
    }

    /// Queue a chunk answer
    pub fn push_chunk(&self, data: impl Into<Vec<u8>>, range: LogRange) -> &Self {
        self.lock().chunks.push_back(Ok(LogChunk::new(data, range)));
        self
    }

    /// Queue a failing chunk answer
    pub fn push_chunk_error(&self, error: Error) -> &Self {
        self.lock().chunks.push_back(Err(error));
        self
    }

    /// Number of `fetch_process` calls made so far
    pub fn status_calls(&self) -> usize {
        self.lock().status_calls
    }

    /// All `fetch_log` calls made so far, in order
    pub fn log_calls(&self) -> Vec<LogCall> {
        self.lock().log_calls.clone()
    }

    /// Ranges requested by `fetch_log`, in order
    pub fn requested_ranges(&self) -> Vec<LogRange> {
        self.lock().log_calls.iter().map(|c| c.range).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LogService for ScriptedLogService {
    async fn fetch_process(&self, instance_id: InstanceId) -> Result<ProcessEntry> {
        let next = {
            let mut script = self.lock();
            script.status_calls += 1;
            script.statuses.pop_front()
        };

        match next {
            Some(answer) => answer.map(|status| ProcessEntry::new(instance_id, status)),
            None => std::future::pending().await,
        }
    }

    async fn fetch_log(&self, instance_id: InstanceId, range: LogRange) -> Result<LogChunk> {
        let next = {
            let mut script = self.lock();
            script.log_calls.push(LogCall {
                instance_id,
                range,
                at: Instant::now(),
            });
            script.chunks.pop_front()
        };

        match next {
            Some(answer) => answer,
            None => std::future::pending().await,
        }
    }
}

/// A fixed instance id for tests
pub fn test_instance_id() -> InstanceId {
    "0b9f7c1e-5f0a-4a4e-9a47-3c1d2e4f5a6b"
        .parse()
        .unwrap_or_else(|_| unreachable!("literal uuid is valid"))
}
