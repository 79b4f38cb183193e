//! Integration tests for command-line parsing and option merging

use clap::Parser;

use proclog::Args;
use proclog_app::Settings;

const ID: &str = "0b9f7c1e-5f0a-4a4e-9a47-3c1d2e4f5a6b";

#[test]
fn test_minimal_args() {
    let args = Args::try_parse_from(["proclog", ID]).unwrap();
    assert_eq!(args.instance_id.to_string(), ID);
    assert!(args.server.is_none());
    assert!(args.config.is_none());
    assert!(!args.whole);
    assert!(!args.json);
}

#[test]
fn test_instance_id_is_required() {
    assert!(Args::try_parse_from(["proclog"]).is_err());
}

#[test]
fn test_invalid_instance_id_rejected() {
    let err = Args::try_parse_from(["proclog", "not-a-uuid"]).unwrap_err();
    assert!(err.to_string().contains("not-a-uuid"));
}

#[test]
fn test_zero_tail_rejected() {
    assert!(Args::try_parse_from(["proclog", ID, "--tail", "0"]).is_err());
}

#[test]
fn test_flags_override_settings() {
    let args = Args::try_parse_from([
        "proclog",
        ID,
        "--server",
        "https://concord.example.com",
        "--api-key",
        "k",
        "--tail",
        "4096",
        "--interval-ms",
        "1000",
        "--local-time",
        "--show-date",
        "--whole",
        "--json",
    ])
    .unwrap();

    let mut settings = Settings::default();
    args.apply_to(&mut settings);

    assert_eq!(settings.server.url, "https://concord.example.com");
    assert_eq!(settings.server.api_key().as_deref(), Some("k"));
    assert_eq!(settings.polling.initial_tail_bytes, 4096);
    assert_eq!(settings.polling.interval_ms, 1000);
    assert!(settings.display.use_local_time);
    assert!(settings.display.show_date);
    assert!(args.whole);
    assert!(args.json);
}

#[test]
fn test_absent_flags_keep_settings() {
    let args = Args::try_parse_from(["proclog", ID]).unwrap();

    let mut settings = Settings::default();
    settings.server.url = "http://from-file".to_string();
    settings.display.use_local_time = true;
    settings.polling.interval_ms = 1234;
    args.apply_to(&mut settings);

    assert_eq!(settings.server.url, "http://from-file");
    assert!(settings.display.use_local_time);
    assert_eq!(settings.polling.interval_ms, 1234);
}
