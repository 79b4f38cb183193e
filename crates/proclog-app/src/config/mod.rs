//! Configuration file parsing for proclog
//!
//! Settings come from `config.toml` in the platform config directory (or an
//! explicit `--config` path), with `PROCLOG_API_KEY` overriding the API key.

pub mod settings;
pub mod types;

pub use settings::{
    apply_env_overrides, default_config_path, load_settings, load_settings_from, API_KEY_ENV_VAR,
};
pub use types::*;
