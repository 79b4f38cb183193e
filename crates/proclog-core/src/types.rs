//! Domain types shared by the client and app crates

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

// ─────────────────────────────────────────────────────────────────────────────
// InstanceId
// ─────────────────────────────────────────────────────────────────────────────

/// Identifier of a process instance on the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(Uuid);

impl FromStr for InstanceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| Error::invalid_instance_id(s))
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ProcessStatus
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle status of a process instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessStatus {
    New,
    Preparing,
    Enqueued,
    Waiting,
    Starting,
    Running,
    Suspended,
    Resuming,
    Finished,
    Failed,
    Cancelled,
    TimedOut,
    /// A status this client does not know about
    #[serde(other)]
    Unknown,
}

impl ProcessStatus {
    /// Terminal statuses: the process will not change state again.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            ProcessStatus::Finished
                | ProcessStatus::Failed
                | ProcessStatus::Cancelled
                | ProcessStatus::TimedOut
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessStatus::New => "NEW",
            ProcessStatus::Preparing => "PREPARING",
            ProcessStatus::Enqueued => "ENQUEUED",
            ProcessStatus::Waiting => "WAITING",
            ProcessStatus::Starting => "STARTING",
            ProcessStatus::Running => "RUNNING",
            ProcessStatus::Suspended => "SUSPENDED",
            ProcessStatus::Resuming => "RESUMING",
            ProcessStatus::Finished => "FINISHED",
            ProcessStatus::Failed => "FAILED",
            ProcessStatus::Cancelled => "CANCELLED",
            ProcessStatus::TimedOut => "TIMED_OUT",
            ProcessStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Process resource as returned by the status endpoint.
///
/// Only the fields the log follower needs are modelled; the rest of the
/// server payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessEntry {
    pub instance_id: InstanceId,
    pub status: ProcessStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_at: Option<String>,
}

impl ProcessEntry {
    pub fn new(instance_id: InstanceId, status: ProcessStatus) -> Self {
        Self {
            instance_id,
            status,
            project_name: None,
            initiator: None,
            created_at: None,
            last_updated_at: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LogRange / LogChunk
// ─────────────────────────────────────────────────────────────────────────────

/// Byte window into the server-held log.
///
/// As a request: `low = None` means "relative to the current tail" and `high`
/// bounds the size. As a response: the offsets the server actually returned
/// and the total log `length` at that moment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
}

impl LogRange {
    /// The last `bytes` bytes of the log
    pub fn tail(bytes: u64) -> Self {
        Self {
            low: None,
            high: Some(bytes),
            length: None,
        }
    }

    /// Everything from `offset` to the current end of the log
    pub fn starting_at(offset: u64) -> Self {
        Self {
            low: Some(offset),
            high: None,
            length: None,
        }
    }

    /// A fully specified range, as reported by the server
    pub fn span(low: u64, high: u64, length: Option<u64>) -> Self {
        Self {
            low: Some(low),
            high: Some(high),
            length,
        }
    }

    /// Working range for the fetch after one that returned `returned`.
    ///
    /// Continues from where the returned chunk ended with no upper bound. If
    /// the server did not report an end offset, the current start is kept.
    pub fn advance(&self, returned: &LogRange) -> LogRange {
        LogRange {
            low: returned.high.or(self.low),
            high: None,
            length: None,
        }
    }

    /// True when the range reaches the very start of the log
    pub fn starts_at_beginning(&self) -> bool {
        self.low == Some(0)
    }
}

/// One server-returned slice of the log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogChunk {
    pub data: Vec<u8>,
    pub range: LogRange,
}

impl LogChunk {
    pub fn new(data: impl Into<Vec<u8>>, range: LogRange) -> Self {
        Self {
            data: data.into(),
            range,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
}
