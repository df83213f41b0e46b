//! Integration tests for logging system

use bridge_traits::time::LogLevel;
use core_runtime::logging::{init_logging, redact_if_sensitive, LogFormat, LoggingConfig};

#[test]
fn test_logging_initialization_only_once() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug);

    assert!(init_logging(config.clone()).is_ok());

    // A global subscriber is already installed
    let second = init_logging(config);
    assert!(second.is_err());
}

#[test]
fn test_invalid_filter_is_rejected() {
    let config = LoggingConfig::default().with_filter("core_sync=notalevel");
    let error = init_logging(config).unwrap_err();
    assert!(error.to_string().contains("Invalid log filter"));
}

#[test]
fn test_pii_redaction_credentials() {
    assert_eq!(
        redact_if_sensitive("access_token", "pat-na1-abc"),
        "[REDACTED]"
    );
    assert_eq!(redact_if_sensitive("api_key", "tte-key"), "[REDACTED]");
    assert_eq!(
        redact_if_sensitive("Authorization", "token tte-key"),
        "[REDACTED]"
    );
}

#[test]
fn test_pii_redaction_emails() {
    let redacted = redact_if_sensitive("email", "ada@example.com");

    assert!(redacted.starts_with('a'));
    assert!(redacted.contains("[REDACTED]"));
    assert!(!redacted.contains("example.com"));
}

#[test]
fn test_pii_redaction_normal_values() {
    assert_eq!(redact_if_sensitive("record", "501"), "501");
    assert_eq!(
        redact_if_sensitive("status", "Last synced: 2024-03-01T09:30:00+00:00"),
        "Last synced: 2024-03-01T09:30:00+00:00"
    );
}

#[test]
fn test_format_selection() {
    #[cfg(debug_assertions)]
    {
        let config = LoggingConfig::default();
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[cfg(not(debug_assertions))]
    {
        let config = LoggingConfig::default();
        assert_eq!(config.format, LogFormat::Json);
    }
}

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn)
        .with_pii_redaction(false)
        .with_spans(false)
        .with_target(false)
        .with_thread_info(true);

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(!config.redact_pii);
    assert!(!config.enable_spans);
    assert!(!config.display_target);
    assert!(config.display_thread_info);
}
