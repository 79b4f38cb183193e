//! Configuration types

use std::time::Duration;

use proclog_core::DisplayOptions;
use serde::{Deserialize, Serialize};

/// Application settings (config.toml)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub polling: PollingSettings,

    #[serde(default)]
    pub display: DisplaySettings,
}

/// Server connection settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerSettings {
    /// Base URL of the server API
    #[serde(default = "default_server_url")]
    pub url: String,

    /// API key sent in the Authorization header (empty = none)
    #[serde(default)]
    pub api_key: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ServerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// API key, if one is configured
    pub fn api_key(&self) -> Option<String> {
        let key = self.api_key.trim();
        (!key.is_empty()).then(|| key.to_string())
    }
}

/// Polling behaviour
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PollingSettings {
    /// Delay between polling iterations in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Size of the tail fetched by the first poll of a fresh start
    #[serde(default = "default_initial_tail_bytes")]
    pub initial_tail_bytes: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            initial_tail_bytes: default_initial_tail_bytes(),
        }
    }
}

impl PollingSettings {
    /// Polling interval, clamped to [`MIN_POLL_INTERVAL_MS`]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(MIN_POLL_INTERVAL_MS))
    }
}

/// Minimum polling interval, to keep a misconfigured client from hammering the server
pub const MIN_POLL_INTERVAL_MS: u64 = 250;

/// Timestamp display settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DisplaySettings {
    #[serde(default)]
    pub use_local_time: bool,

    #[serde(default)]
    pub show_date: bool,
}

impl DisplaySettings {
    pub fn options(&self) -> DisplayOptions {
        DisplayOptions::new(self.use_local_time, self.show_date)
    }
}

fn default_server_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_interval_ms() -> u64 {
    5000
}

fn default_initial_tail_bytes() -> u64 {
    2048
}
