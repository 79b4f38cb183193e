//! Log chunk processing - turns raw log bytes into display text.
//!
//! Server log lines start with an ISO-8601 timestamp such as
//! `2018-06-14T19:51:20.123+0000`. Processing rewrites that prefix according
//! to [`DisplayOptions`]; every other byte of the chunk is passed through.

use std::fmt::Display;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, Local, TimeZone};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Timestamp prefix at the start of a log line
static TIMESTAMP_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{3}[+-]\d{4}")
        .expect("Invalid timestamp prefix regex")
});

const SERVER_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
const TIME_FORMAT: &str = "%H:%M:%S%.3f";

/// How timestamps in log lines are shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    /// Convert timestamps to the viewer's local time zone
    pub use_local_time: bool,
    /// Include the calendar date, not just the time of day
    pub show_date: bool,
}

impl DisplayOptions {
    pub fn new(use_local_time: bool, show_date: bool) -> Self {
        Self {
            use_local_time,
            show_date,
        }
    }

    fn format(&self) -> &'static str {
        if self.show_date {
            DATE_TIME_FORMAT
        } else {
            TIME_FORMAT
        }
    }
}

/// Process a raw chunk into display text.
///
/// Invalid UTF-8 is replaced, line terminators are preserved. Lines without a
/// recognised timestamp prefix are returned unchanged.
pub fn process(data: &[u8], options: DisplayOptions) -> String {
    if options.use_local_time {
        process_in_zone(data, options.show_date, Some(&Local))
    } else {
        process_in_zone::<Local>(data, options.show_date, None)
    }
}

/// Same as [`process`] with an explicit target zone.
///
/// `zone = None` keeps each timestamp in the offset the server wrote it with.
pub fn process_in_zone<Tz>(data: &[u8], show_date: bool, zone: Option<&Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let options = DisplayOptions {
        use_local_time: zone.is_some(),
        show_date,
    };
    let text = String::from_utf8_lossy(data);

    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        match reformat_timestamp(line, &options, zone) {
            Some(formatted) => out.push_str(&formatted),
            None => out.push_str(line),
        }
    }
    out
}

fn reformat_timestamp<Tz>(line: &str, options: &DisplayOptions, zone: Option<&Tz>) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let m = TIMESTAMP_PREFIX.find(line)?;
    let ts: DateTime<FixedOffset> = DateTime::parse_from_str(m.as_str(), SERVER_FORMAT).ok()?;

    let formatted = match zone {
        Some(zone) => ts.with_timezone(zone).format(options.format()).to_string(),
        None => ts.format(options.format()).to_string(),
    };

    let rest = &line[m.end()..];
    let mut result = String::with_capacity(formatted.len() + rest.len());
    result.push_str(&formatted);
    result.push_str(rest);
    Some(result)
}
