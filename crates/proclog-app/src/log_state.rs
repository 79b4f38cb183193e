//! Log state - the view model the follower builds from server responses.
//!
//! Every incoming [`LogEvent`] is applied to all projections of [`LogState`]
//! at once: the process status, the accumulated text segments, the known log
//! length, the completion flag and the request lifecycle (loading/error).

use proclog_core::{process, DisplayOptions, LogChunk, ProcessStatus, RequestError};

/// Known log length before any response reported one
pub const UNKNOWN_LENGTH: i64 = -1;

/// Outcome of one fetch, as applied to [`LogState`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogResponse {
    /// Process status fetched alongside the chunk (polling only)
    pub status: Option<ProcessStatus>,
    pub chunk: Option<LogChunk>,
    pub error: Option<RequestError>,
    /// Replace all segments instead of appending
    pub overwrite: bool,
    pub options: DisplayOptions,
}

impl LogResponse {
    /// A chunk appended after a polling iteration
    pub fn appended(chunk: LogChunk, status: ProcessStatus, options: DisplayOptions) -> Self {
        Self {
            status: Some(status),
            chunk: Some(chunk),
            error: None,
            overwrite: false,
            options,
        }
    }

    /// A whole-log response replacing everything accumulated so far
    pub fn overwrite(chunk: LogChunk, options: DisplayOptions) -> Self {
        Self {
            status: None,
            chunk: Some(chunk),
            error: None,
            overwrite: true,
            options,
        }
    }

    /// A failed fetch
    pub fn failed(error: impl Into<RequestError>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// The chunk, unless this response failed or carried none
    fn usable_chunk(&self) -> Option<&LogChunk> {
        if self.error.is_some() {
            return None;
        }
        self.chunk.as_ref()
    }
}

/// Events that mutate [`LogState`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    /// Clear everything (new instance selected or a fresh start)
    Reset,
    /// A fetch was issued
    Request,
    /// A fetch completed (successfully or not)
    Response(LogResponse),
}

/// Accumulated log of one process instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogState {
    /// Last status reported by the server
    pub status: Option<ProcessStatus>,
    /// Processed text, one block per non-empty chunk, in arrival order
    pub segments: Vec<String>,
    /// Largest log length any chunk reported, or [`UNKNOWN_LENGTH`]
    pub known_length: i64,
    /// A chunk reaching offset 0 has been seen
    pub completed: bool,
    /// A fetch is in flight
    pub loading: bool,
    /// Error of the last completed fetch
    pub last_error: Option<RequestError>,
    /// Bumped whenever `segments` is replaced rather than appended to
    pub epoch: u64,
}

impl Default for LogState {
    fn default() -> Self {
        Self::new()
    }
}

impl LogState {
    pub fn new() -> Self {
        Self {
            status: None,
            segments: Vec::new(),
            known_length: UNKNOWN_LENGTH,
            completed: false,
            loading: false,
            last_error: None,
            epoch: 0,
        }
    }

    /// Apply one event to every projection
    pub fn apply(&mut self, event: &LogEvent) {
        self.apply_status(event);
        self.apply_segments(event);
        self.apply_length(event);
        self.apply_completed(event);
        self.apply_request_lifecycle(event);
    }

    /// All segments joined into one text
    pub fn text(&self) -> String {
        self.segments.concat()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn apply_status(&mut self, event: &LogEvent) {
        match event {
            LogEvent::Reset => self.status = None,
            LogEvent::Response(LogResponse {
                status: Some(status),
                ..
            }) => self.status = Some(*status),
            _ => {}
        }
    }

    fn apply_segments(&mut self, event: &LogEvent) {
        match event {
            LogEvent::Reset => {
                self.segments.clear();
                self.epoch += 1;
            }
            LogEvent::Response(response) => {
                let Some(chunk) = response.usable_chunk() else {
                    return;
                };

                if response.overwrite {
                    self.segments = vec![process(&chunk.data, response.options)];
                    self.epoch += 1;
                } else if !chunk.is_empty() {
                    self.segments.push(process(&chunk.data, response.options));
                }
            }
            LogEvent::Request => {}
        }
    }

    fn apply_length(&mut self, event: &LogEvent) {
        match event {
            LogEvent::Reset => self.known_length = UNKNOWN_LENGTH,
            LogEvent::Response(response) => {
                if let Some(chunk) = response.usable_chunk() {
                    let reported = chunk
                        .range
                        .length
                        .and_then(|l| i64::try_from(l).ok())
                        .unwrap_or(UNKNOWN_LENGTH);
                    self.known_length = self.known_length.max(reported);
                }
            }
            LogEvent::Request => {}
        }
    }

    fn apply_completed(&mut self, event: &LogEvent) {
        match event {
            LogEvent::Reset => self.completed = false,
            LogEvent::Response(response) => {
                if let Some(chunk) = response.usable_chunk() {
                    self.completed = self.completed || chunk.range.starts_at_beginning();
                }
            }
            LogEvent::Request => {}
        }
    }

    fn apply_request_lifecycle(&mut self, event: &LogEvent) {
        match event {
            LogEvent::Request => {
                self.loading = true;
                self.last_error = None;
            }
            LogEvent::Response(response) => {
                self.loading = false;
                self.last_error = response.error.clone();
            }
            LogEvent::Reset => {}
        }
    }
}
