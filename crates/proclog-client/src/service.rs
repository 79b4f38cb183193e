//! The collaborator the log follower fetches through.
//!
//! The app crate only ever talks to the server through this trait, so the
//! polling state machine can be driven by [`HttpLogService`](crate::HttpLogService)
//! in production and by a scripted double in tests.

use proclog_core::{InstanceId, LogChunk, LogRange, ProcessEntry, Result};

/// Process status and log access
#[trait_variant::make(LogService: Send)]
pub trait LocalLogService {
    /// Fetch the current process resource (status and metadata)
    async fn fetch_process(&self, instance_id: InstanceId) -> Result<ProcessEntry>;

    /// Fetch a slice of the process log.
    ///
    /// `range` is advisory: the server decides which bytes it returns and
    /// reports the effective offsets in the chunk's range.
    async fn fetch_log(&self, instance_id: InstanceId, range: LogRange) -> Result<LogChunk>;
}
