//! `Range` / `Content-Range` header codec for the log endpoint.
//!
//! Requests use `Range: bytes={low}-{high}` where either side may be empty:
//! `bytes=-2048` asks for the last 2048 bytes, `bytes=2048-` for everything
//! from offset 2048. Responses report `Content-Range: bytes {low}-{high}/{length}`
//! with `high` exclusive, or `bytes */{length}` when nothing could be served.

use proclog_core::LogRange;

/// Parsed `Content-Range` response header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRange {
    /// Bytes `low..high` of a log that is `length` bytes long (if known)
    Bytes {
        low: u64,
        high: u64,
        length: Option<u64>,
    },
    /// No bytes served; only the total length is reported
    Unsatisfied { length: Option<u64> },
}

impl ContentRange {
    /// The range as seen by the state machine.
    ///
    /// For an unsatisfied range the chunk is empty and positioned at the
    /// requested start (or the end of the log when no start was requested).
    pub fn to_log_range(self, requested: &LogRange) -> LogRange {
        match self {
            ContentRange::Bytes { low, high, length } => LogRange::span(low, high, length),
            ContentRange::Unsatisfied { length } => {
                let at = requested.low.or(length).unwrap_or(0);
                LogRange::span(at, at, length)
            }
        }
    }
}

/// Value of the `Range` request header, or `None` for the whole log
pub fn range_header(range: &LogRange) -> Option<String> {
    if range.low.is_none() && range.high.is_none() {
        return None;
    }

    let low = range.low.map(|v| v.to_string()).unwrap_or_default();
    let high = range.high.map(|v| v.to_string()).unwrap_or_default();
    Some(format!("bytes={low}-{high}"))
}

/// Parse a `Content-Range` header value.
///
/// Returns `None` for anything that is not a byte range.
pub fn parse_content_range(value: &str) -> Option<ContentRange> {
    let rest = value.trim().strip_prefix("bytes")?.trim_start();
    let (span, length) = rest.split_once('/')?;

    let length = match length.trim() {
        "*" => None,
        n => Some(n.parse::<u64>().ok()?),
    };

    let span = span.trim();
    if span == "*" {
        return Some(ContentRange::Unsatisfied { length });
    }

    let (low, high) = span.split_once('-')?;
    let low = low.trim().parse::<u64>().ok()?;
    let high = high.trim().parse::<u64>().ok()?;
    if high < low {
        return None;
    }

    Some(ContentRange::Bytes { low, high, length })
}
