//! Prelude for common imports used throughout all proclog crates

pub use crate::error::{Error, Result, ResultExt};
pub use tracing::{debug, error, info, warn};
