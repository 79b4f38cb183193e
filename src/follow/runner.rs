//! Follow mode runner - main event loop

use std::sync::Arc;

use proclog_app::{config, signals, Engine, FollowPhase, Message, Settings};
use proclog_client::HttpLogService;
use proclog_core::prelude::*;
use proclog_core::{ProcessStatus, RequestError};

use super::stdin::spawn_stdin_reader_blocking;
use super::{FollowEvent, Printer};
use crate::cli::Args;

/// How following ended
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowOutcome {
    /// Last status the server reported
    pub status: Option<ProcessStatus>,
    /// Error that ended the last session
    pub error: Option<RequestError>,
}

impl FollowOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Resolve settings from the config file, environment and arguments
pub fn resolve_settings(args: &Args) -> Result<Settings> {
    let mut settings = config::load_settings(args.config.as_deref())
        .context("Failed to load settings")?;
    args.apply_to(&mut settings);
    Ok(settings)
}

/// Follow the log of `args.instance_id` until polling stops or quit
pub async fn run_follow(args: Args) -> Result<FollowOutcome> {
    let settings = resolve_settings(&args)?;
    let instance_id = args.instance_id;
    let options = settings.display.options();

    info!("Following {} on {}", instance_id, settings.server.url);

    let service = HttpLogService::new(
        &settings.server.url,
        settings.server.api_key(),
        settings.server.timeout(),
    )
    .context("Failed to create the process API client")?;

    let mut engine = Engine::new(Arc::new(service), settings);
    signals::spawn_signal_handler(engine.msg_sender());

    let stdin_tx = engine.msg_sender();
    std::thread::spawn(move || {
        spawn_stdin_reader_blocking(stdin_tx, instance_id, options);
    });

    let emit = |event: &FollowEvent| {
        if args.json {
            event.emit_json();
        } else {
            event.emit_text();
        }
    };

    emit(&FollowEvent::started(instance_id, args.whole));

    let initial = if args.whole {
        Message::LoadWholeLog {
            instance_id,
            options,
        }
    } else {
        Message::StartPolling {
            instance_id,
            options,
            range: None,
            reset: true,
        }
    };

    let mut snapshots = engine.subscribe();
    let mut printer = Printer::new();
    engine.process_message(initial);

    loop {
        if snapshots.has_changed().unwrap_or(false) {
            let snapshot = snapshots.borrow_and_update().clone();
            printer.diff(&snapshot).iter().for_each(&emit);
        }

        if engine.should_quit() {
            info!("Quit requested");
            break;
        }
        if engine.state.phase == FollowPhase::Stopped {
            info!("Session ended");
            break;
        }

        match engine.msg_rx.recv().await {
            Some(msg) => engine.process_message(msg),
            None => {
                info!("Message channel closed");
                break;
            }
        }
    }

    engine.shutdown();

    let outcome = FollowOutcome {
        status: engine.state.log.status,
        error: engine.state.log.last_error.clone(),
    };
    if let Some(ref e) = outcome.error {
        error!("Following ended with error: {}", e);
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    #[serial]
    fn test_resolve_settings_precedence() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nurl = \"http://file:8001\"\napi_key = \"file-key\"\n\n[polling]\ninterval_ms = 2000"
        )
        .unwrap();
        std::env::remove_var(config::API_KEY_ENV_VAR);

        let path = file.path().to_string_lossy().to_string();
        let args = Args::try_parse_from([
            "proclog",
            "0b9f7c1e-5f0a-4a4e-9a47-3c1d2e4f5a6b",
            "--config",
            &path,
            "--api-key",
            "cli-key",
            "--show-date",
        ])
        .unwrap();

        let settings = resolve_settings(&args).unwrap();
        assert_eq!(settings.server.url, "http://file:8001");
        assert_eq!(settings.server.api_key().as_deref(), Some("cli-key"));
        assert_eq!(settings.polling.interval_ms, 2000);
        assert!(settings.display.show_date);
        assert!(!settings.display.use_local_time);
    }

    #[test]
    #[serial]
    fn test_resolve_settings_missing_explicit_config() {
        let args = Args::try_parse_from([
            "proclog",
            "0b9f7c1e-5f0a-4a4e-9a47-3c1d2e4f5a6b",
            "--config",
            "/definitely/not/here/config.toml",
        ])
        .unwrap();

        assert!(matches!(
            resolve_settings(&args),
            Err(Error::ConfigNotFound { .. })
        ));
    }

    #[tokio::test]
    #[serial]
    async fn test_run_follow_rejects_bad_server_url() {
        let args = Args::try_parse_from([
            "proclog",
            "0b9f7c1e-5f0a-4a4e-9a47-3c1d2e4f5a6b",
            "--server",
            "not a url",
        ])
        .unwrap();

        let err = run_follow(args).await.unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_outcome_success() {
        assert!(FollowOutcome::default().is_success());
        let failed = FollowOutcome {
            status: Some(ProcessStatus::Running),
            error: Some(RequestError::new("boom")),
        };
        assert!(!failed.is_success());
    }
}
