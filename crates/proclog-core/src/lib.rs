//! # proclog-core - Core Domain Types
//!
//! Foundation crate for proclog. Provides domain types, error handling,
//! log chunk processing and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, chrono, thiserror, regex, tracing, uuid).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`InstanceId`] - Identifier of a process instance
//! - [`ProcessStatus`] - Process lifecycle status with [`ProcessStatus::is_final`]
//! - [`ProcessEntry`] - Process resource returned by the server
//! - [`LogRange`], [`LogChunk`] - Byte windows into the server-held log
//!
//! ### Processing (`processor`)
//! - [`process()`] - Raw chunk bytes to display text
//! - [`DisplayOptions`] - Local time / date display switches
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum
//! - [`RequestError`] - Cloneable failed-request record kept in state
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Logs an error with context on the way up
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use proclog_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod prelude;
pub mod processor;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use error::{Error, RequestError, Result, ResultExt};
pub use processor::{process, process_in_zone, DisplayOptions};
pub use types::{InstanceId, LogChunk, LogRange, ProcessEntry, ProcessStatus};
