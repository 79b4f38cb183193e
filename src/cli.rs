//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;

use proclog_app::Settings;
use proclog_core::InstanceId;

/// proclog - follow the log of a server-side process instance
#[derive(Parser, Debug, Clone)]
#[command(name = "proclog")]
#[command(version, about = "Follow the log of a server-side process instance", long_about = None)]
pub struct Args {
    /// Process instance to follow
    #[arg(value_name = "INSTANCE_ID")]
    pub instance_id: InstanceId,

    /// Server base URL
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,

    /// API key for the Authorization header (overrides PROCLOG_API_KEY)
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Settings file (default: <config dir>/proclog/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show timestamps in the local time zone
    #[arg(long)]
    pub local_time: bool,

    /// Include the date in timestamps
    #[arg(long)]
    pub show_date: bool,

    /// Bytes of log tail fetched by the first poll
    #[arg(long, value_name = "BYTES", value_parser = clap::value_parser!(u64).range(1..))]
    pub tail: Option<u64>,

    /// Delay between polls in milliseconds
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Load the whole log first, then keep polling
    #[arg(long)]
    pub whole: bool,

    /// Emit NDJSON events instead of raw log text
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// Overlay command-line values on loaded settings
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(ref url) = self.server {
            settings.server.url = url.clone();
        }
        if let Some(ref key) = self.api_key {
            settings.server.api_key = key.clone();
        }
        if let Some(tail) = self.tail {
            settings.polling.initial_tail_bytes = tail;
        }
        if let Some(interval_ms) = self.interval_ms {
            settings.polling.interval_ms = interval_ms;
        }
        if self.local_time {
            settings.display.use_local_time = true;
        }
        if self.show_date {
            settings.display.show_date = true;
        }
    }
}
