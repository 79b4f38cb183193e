//! Settings parser for config.toml

use std::path::{Path, PathBuf};

use super::types::Settings;
use proclog_core::prelude::*;

const CONFIG_FILENAME: &str = "config.toml";
const APP_DIR: &str = "proclog";

/// Environment variable overriding `server.api_key`
pub const API_KEY_ENV_VAR: &str = "PROCLOG_API_KEY";

/// `<config dir>/proclog/config.toml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILENAME))
}

/// Load settings from `explicit` if given, otherwise from the default path.
///
/// Environment overrides are applied on top of whatever was loaded.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    let mut settings = match explicit {
        Some(path) => load_settings_from(path, true)?,
        None => match default_config_path() {
            Some(path) => load_settings_from(&path, false)?,
            None => {
                debug!("No config directory on this platform, using defaults");
                Settings::default()
            }
        },
    };

    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Load settings from `path`.
///
/// When `explicit`, a missing or unparseable file is an error. Otherwise a
/// missing file yields defaults and a broken one is logged and ignored.
pub fn load_settings_from(path: &Path, explicit: bool) -> Result<Settings> {
    if !path.exists() {
        if explicit {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        debug!("No config file at {:?}, using defaults", path);
        return Ok(Settings::default());
    }

    let parsed = std::fs::read_to_string(path)
        .map_err(|e| Error::config(format!("Failed to read {}: {}", path.display(), e)))
        .and_then(|content| {
            toml::from_str::<Settings>(&content)
                .map_err(|e| Error::config(format!("Failed to parse {}: {}", path.display(), e)))
        });

    match parsed {
        Ok(settings) => {
            debug!("Loaded settings from {:?}", path);
            Ok(settings)
        }
        Err(e) if explicit => Err(e),
        Err(e) => {
            warn!("{}, using defaults", e);
            Ok(Settings::default())
        }
    }
}

/// Apply `PROCLOG_API_KEY` if set and non-empty
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(key) = std::env::var(API_KEY_ENV_VAR) {
        if !key.trim().is_empty() {
            debug!("Using API key from {}", API_KEY_ENV_VAR);
            settings.server.api_key = key;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_implicit_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let settings = load_settings_from(&dir.path().join("config.toml"), false).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let err = load_settings_from(&path, true).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { path: p } if p == path));
    }

    #[test]
    fn test_loads_values() {
        let file = write_config(
            r#"
            [server]
            url = "https://concord.example.com"
            timeout_secs = 5

            [polling]
            interval_ms = 1000
            initial_tail_bytes = 4096

            [display]
            use_local_time = true
            "#,
        );

        let settings = load_settings_from(file.path(), true).unwrap();
        assert_eq!(settings.server.url, "https://concord.example.com");
        assert_eq!(settings.server.timeout_secs, 5);
        assert_eq!(settings.polling.interval_ms, 1000);
        assert_eq!(settings.polling.initial_tail_bytes, 4096);
        assert!(settings.display.use_local_time);
        assert!(!settings.display.show_date);
    }

    #[test]
    fn test_broken_implicit_file_falls_back() {
        let file = write_config("[polling\ninterval_ms = ");
        let settings = load_settings_from(file.path(), false).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_broken_explicit_file_is_an_error() {
        let file = write_config("[polling]\ninterval_ms = \"soon\"");
        let err = load_settings_from(file.path(), true).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    #[serial]
    fn test_env_api_key_overrides_file() {
        let file = write_config("[server]\napi_key = \"from-file\"");
        std::env::set_var(API_KEY_ENV_VAR, "from-env");
        let settings = load_settings(Some(file.path()));
        std::env::remove_var(API_KEY_ENV_VAR);

        let settings = settings.unwrap();
        assert_eq!(settings.server.api_key().as_deref(), Some("from-env"));
    }

    #[test]
    #[serial]
    fn test_blank_env_api_key_is_ignored() {
        let file = write_config("[server]\napi_key = \"from-file\"");
        std::env::set_var(API_KEY_ENV_VAR, "   ");
        let settings = load_settings(Some(file.path()));
        std::env::remove_var(API_KEY_ENV_VAR);

        let settings = settings.unwrap();
        assert_eq!(settings.server.api_key().as_deref(), Some("from-file"));
    }
}
