//! Follow mode - stream a process log to stdout
//!
//! Output is either the raw (timestamp-processed) log text, or NDJSON events
//! with `--json`, one event per line:
//!
//! ```json
//! {"event":"started","instance_id":"0b9f7c1e-...","whole":false,"timestamp":1704700001000}
//! {"event":"status","status":"RUNNING","timestamp":1704700001200}
//! {"event":"log","text":"12:00:01.000 step 1\n","timestamp":1704700001200}
//! {"event":"stopped","status":"FINISHED","timestamp":1704700006300}
//! ```

pub mod runner;
pub mod stdin;

use std::io::{self, Write};

use chrono::Utc;
use serde::Serialize;
use tracing::error;

use proclog_app::{FollowPhase, LogSnapshot};
use proclog_core::{InstanceId, ProcessStatus, RequestError};

pub use runner::{run_follow, FollowOutcome};

/// Events emitted while following
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FollowEvent {
    /// Following started
    Started {
        instance_id: InstanceId,
        whole: bool,
        timestamp: i64,
    },

    /// New log text appended
    Log { text: String, timestamp: i64 },

    /// The whole log replaced everything shown so far
    Replaced { text: String, timestamp: i64 },

    /// Process status changed
    Status {
        status: ProcessStatus,
        timestamp: i64,
    },

    /// Waiting before the next poll
    Waiting { delay_ms: u64, timestamp: i64 },

    /// A fetch failed
    Error {
        message: String,
        http_status: Option<u16>,
        timestamp: i64,
    },

    /// Following ended
    Stopped {
        status: Option<ProcessStatus>,
        timestamp: i64,
    },
}

impl FollowEvent {
    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    pub fn started(instance_id: InstanceId, whole: bool) -> Self {
        Self::Started {
            instance_id,
            whole,
            timestamp: Self::now(),
        }
    }

    pub fn log(text: String) -> Self {
        Self::Log {
            text,
            timestamp: Self::now(),
        }
    }

    pub fn replaced(text: String) -> Self {
        Self::Replaced {
            text,
            timestamp: Self::now(),
        }
    }

    pub fn status(status: ProcessStatus) -> Self {
        Self::Status {
            status,
            timestamp: Self::now(),
        }
    }

    pub fn waiting(delay_ms: u64) -> Self {
        Self::Waiting {
            delay_ms,
            timestamp: Self::now(),
        }
    }

    pub fn error(error: &RequestError) -> Self {
        Self::Error {
            message: error.message.clone(),
            http_status: error.status,
            timestamp: Self::now(),
        }
    }

    pub fn stopped(status: Option<ProcessStatus>) -> Self {
        Self::Stopped {
            status,
            timestamp: Self::now(),
        }
    }

    /// Emit this event to stdout as JSON
    pub fn emit_json(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize follow event: {}", e);
                return;
            }
        };

        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json).and_then(|_| stdout.flush()) {
            error!("Failed to write follow event to stdout: {}", e);
        }
    }

    /// Emit this event as plain text: log text to stdout, the rest to stderr
    pub fn emit_text(&self) {
        match self {
            Self::Log { text, .. } => write_stdout(text),
            Self::Replaced { text, .. } => {
                eprintln!("--- whole log ---");
                write_stdout(text);
            }
            Self::Status { status, .. } => eprintln!("[status: {}]", status),
            Self::Error {
                message,
                http_status: Some(code),
                ..
            } => eprintln!("error: {} (HTTP {})", message, code),
            Self::Error { message, .. } => eprintln!("error: {}", message),
            Self::Started { .. } | Self::Waiting { .. } | Self::Stopped { .. } => {}
        }
    }
}

fn write_stdout(text: &str) {
    let mut stdout = io::stdout().lock();
    if let Err(e) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.flush())
    {
        error!("Failed to write log text to stdout: {}", e);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Snapshot diffing
// ─────────────────────────────────────────────────────────────────────────────

/// Turns successive snapshots into the events that separate them
#[derive(Debug, Default)]
pub struct Printer {
    epoch: u64,
    emitted: usize,
    status: Option<ProcessStatus>,
    phase: FollowPhase,
    error_reported: bool,
}

impl Printer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events describing what changed since the previous snapshot
    pub fn diff(&mut self, snapshot: &LogSnapshot) -> Vec<FollowEvent> {
        let mut events = Vec::new();
        let log = &snapshot.log;

        if log.epoch != self.epoch {
            self.epoch = log.epoch;
            if !log.segments.is_empty() {
                events.push(FollowEvent::replaced(log.text()));
            }
        } else {
            for segment in log.segments.iter().skip(self.emitted) {
                events.push(FollowEvent::log(segment.clone()));
            }
        }
        self.emitted = log.segments.len();

        if log.status != self.status {
            self.status = log.status;
            if let Some(status) = log.status {
                events.push(FollowEvent::status(status));
            }
        }

        match (&log.last_error, self.error_reported) {
            (Some(error), false) => {
                events.push(FollowEvent::error(error));
                self.error_reported = true;
            }
            (None, true) => self.error_reported = false,
            _ => {}
        }

        if snapshot.phase != self.phase {
            self.phase = snapshot.phase;
            match snapshot.phase {
                FollowPhase::Waiting { delay } => {
                    events.push(FollowEvent::waiting(delay.as_millis() as u64))
                }
                FollowPhase::Stopped => events.push(FollowEvent::stopped(log.status)),
                _ => {}
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use proclog_app::{LogEvent, LogResponse};
    use proclog_core::{DisplayOptions, Error, LogChunk, LogRange};

    fn snapshot() -> LogSnapshot {
        LogSnapshot::default()
    }

    fn append(snap: &mut LogSnapshot, data: &str, low: u64, high: u64) {
        snap.log.apply(&LogEvent::Response(LogResponse::appended(
            LogChunk::new(data, LogRange::span(low, high, Some(high))),
            ProcessStatus::Running,
            DisplayOptions::default(),
        )));
    }

    #[test]
    fn test_event_serialization() {
        let event = FollowEvent::Status {
            status: ProcessStatus::TimedOut,
            timestamp: 1,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"event":"status","status":"TIMED_OUT","timestamp":1}"#
        );

        let event = FollowEvent::Waiting {
            delay_ms: 5000,
            timestamp: 2,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event":"waiting","delay_ms":5000,"timestamp":2}"#);
    }

    #[test]
    fn test_appended_segments_emitted_once() {
        let mut printer = Printer::new();
        let mut snap = snapshot();

        append(&mut snap, "a\n", 0, 2);
        let events = printer.diff(&snap);
        assert!(matches!(&events[0], FollowEvent::Log { text, .. } if text == "a\n"));
        assert!(matches!(
            &events[1],
            FollowEvent::Status {
                status: ProcessStatus::Running,
                ..
            }
        ));

        append(&mut snap, "b\n", 2, 4);
        let events = printer.diff(&snap);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], FollowEvent::Log { text, .. } if text == "b\n"));

        assert!(printer.diff(&snap).is_empty());
    }

    #[test]
    fn test_overwrite_is_replaced_event() {
        let mut printer = Printer::new();
        let mut snap = snapshot();
        append(&mut snap, "tail\n", 10, 15);
        printer.diff(&snap);

        snap.log.apply(&LogEvent::Response(LogResponse::overwrite(
            LogChunk::new("ALL\n", LogRange::span(0, 4, Some(4))),
            DisplayOptions::default(),
        )));
        let events = printer.diff(&snap);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], FollowEvent::Replaced { text, .. } if text == "ALL\n"));

        append(&mut snap, "more\n", 4, 9);
        let events = printer.diff(&snap);
        assert!(matches!(&events[0], FollowEvent::Log { text, .. } if text == "more\n"));
    }

    #[test]
    fn test_phase_and_error_events() {
        let mut printer = Printer::new();
        let mut snap = snapshot();

        snap.phase = FollowPhase::Waiting {
            delay: Duration::from_millis(5000),
        };
        let events = printer.diff(&snap);
        assert!(matches!(
            events[0],
            FollowEvent::Waiting { delay_ms: 5000, .. }
        ));

        let failed = LogResponse::failed(Error::http(503, "busy"));
        snap.log.apply(&LogEvent::Response(failed));
        snap.phase = FollowPhase::Stopped;
        let events = printer.diff(&snap);
        assert!(matches!(
            &events[0],
            FollowEvent::Error {
                http_status: Some(503),
                ..
            }
        ));
        assert!(matches!(
            events[1],
            FollowEvent::Stopped { status: None, .. }
        ));

        assert!(printer.diff(&snap).is_empty(), "error reported once");
    }
}
