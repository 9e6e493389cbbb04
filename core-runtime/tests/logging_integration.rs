//! Integration tests for logging system

use bridge_traits::time::{LogLevel, StderrLogger};
use core_runtime::logging::{init_logging, redact_url, LogFormat, LoggingConfig};
use std::sync::Arc;

#[test]
fn test_init_logging_only_once() {
    // The global subscriber can be installed once per process
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug)
        .with_logger_sink(Arc::new(StderrLogger::default()));

    init_logging(config.clone()).unwrap();
    tracing::info!(target: "core_playback", "logging online");

    assert!(init_logging(config).is_err());
}

#[test]
fn test_invalid_filter_is_rejected_before_install() {
    let config = LoggingConfig::default().with_filter("core_playback=notalevel");
    assert!(init_logging(config).is_err());
}

#[test]
fn test_format_selection() {
    #[cfg(debug_assertions)]
    assert_eq!(LoggingConfig::default().format, LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(LoggingConfig::default().format, LogFormat::Json);
}

#[test]
fn test_signed_url_is_redacted() {
    let url = "https://alerts.example.com/audio/siren.mp3?X-Amz-Signature=deadbeef";
    let redacted = redact_url(url);

    assert!(!redacted.contains("deadbeef"));
    assert!(redacted.starts_with("https://alerts.example.com/audio/siren.mp3"));
}
