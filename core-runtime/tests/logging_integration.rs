//! Integration tests for logging system

use core_runtime::logging::{
    init_logging, mask_email, redact_if_sensitive, LogFormat, LogLevel, LoggingConfig,
};

#[test]
fn test_logging_initializes_once() {
    // A process gets one global subscriber; the second call must fail cleanly.
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug);

    assert!(init_logging(config.clone()).is_ok());
    tracing::info!(target: "core_auth", "logging initialized for integration test");
    assert!(init_logging(config).is_err());
}

#[test]
fn test_credentials_are_redacted() {
    assert_eq!(redact_if_sensitive("accessToken", "T1"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("refresh_token", "R1"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("password", "hunter2"), "[REDACTED]");
    assert_eq!(
        redact_if_sensitive("Authorization", "Bearer T1"),
        "[REDACTED]"
    );
}

#[test]
fn test_emails_are_masked() {
    let redacted = redact_if_sensitive("email", "admin@example.com");
    assert_eq!(redacted, mask_email("admin@example.com"));
    assert!(redacted.starts_with('a'));
    assert!(!redacted.contains("example.com"));
}

#[test]
fn test_normal_values_pass_through() {
    assert_eq!(redact_if_sensitive("path", "/exercise/5"), "/exercise/5");
    assert_eq!(redact_if_sensitive("status", "401"), "401");
    assert_eq!(redact_if_sensitive("user_id", "user_123"), "user_123");
}

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Json)
        .with_level(LogLevel::Warn)
        .with_filter("core_auth=debug,core_api=trace")
        .with_spans(false)
        .with_target(false)
        .with_thread_info(true);

    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.level, LogLevel::Warn);
    assert_eq!(
        config.filter.as_deref(),
        Some("core_auth=debug,core_api=trace")
    );
    assert!(!config.enable_spans);
    assert!(!config.display_target);
    assert!(config.display_thread_info);
}
