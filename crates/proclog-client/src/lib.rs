//! proclog-client - Process API access for proclog
//!
//! - [`LogService`] - the collaborator trait the log follower fetches through
//! - [`HttpLogService`] - `reqwest` implementation against the process REST API
//! - [`range`] - `Range` / `Content-Range` header codec
//!
//! With the `test-helpers` feature, [`test_utils::ScriptedLogService`] provides
//! a scripted implementation for driving the follower in tests.

pub mod http;
pub mod range;
pub mod service;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

pub use http::HttpLogService;
pub use range::{parse_content_range, range_header, ContentRange};
pub use service::{LocalLogService, LogService};
