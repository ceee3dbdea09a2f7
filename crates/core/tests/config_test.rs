use postie_core::config::*;
use postie_core::models::Status;
use std::fs;
use std::time::Duration;
use tempfile::NamedTempFile;

#[test]
fn test_default_config() {
    let config = AppConfig::default();
    assert!(config.validate().is_ok());

    // 验证默认值
    assert_eq!(config.mailer.default_service.as_deref(), Some("default"));
    assert!(config.mailer.services.contains_key("template"));
    assert_eq!(config.message_status_cache.key_prefix, "message_status_");
    assert_eq!(config.cache.backend, "memory");
    assert_eq!(config.observability.log_level, "info");
}

#[test]
fn test_config_from_toml() {
    let toml_content = r#"
[mailer]
default_service = "primary"

[mailer.services.primary]
driver = "memory"

[mailer.services.template]
driver = "mock"
options = { should_succeed = false, latency_ms = 5 }

[message_status_cache]
key_prefix = "status:"

[message_status_cache.ttl]
pending_seconds = 60
sent_seconds = 120
failed_seconds = 600

[cache]
backend = "redis"
redis_url = "redis://cache:6379"

[observability]
log_level = "debug"
log_format = "json"
"#;

    let config = AppConfig::from_toml(toml_content).unwrap();

    assert_eq!(config.mailer.default_service.as_deref(), Some("primary"));
    assert_eq!(config.mailer.services.len(), 2);
    assert_eq!(config.mailer.services["template"].driver, "mock");
    assert_eq!(
        config.mailer.services["template"].option_bool("should_succeed"),
        Some(false)
    );
    assert_eq!(config.message_status_cache.key_prefix, "status:");
    assert_eq!(
        config.message_status_cache.ttl(Status::Failed),
        Duration::from_secs(600)
    );
    assert_eq!(config.cache.backend, "redis");
    assert_eq!(config.observability.log_format, "json");
}

#[test]
fn test_partial_toml_uses_defaults() {
    let config = AppConfig::from_toml(
        r#"
[message_status_cache.ttl]
sent_seconds = 30
"#,
    )
    .unwrap();

    assert_eq!(
        config.message_status_cache.ttl(Status::Sent),
        Duration::from_secs(30)
    );
    assert_eq!(
        config.message_status_cache.ttl(Status::Pending),
        Duration::from_secs(3600)
    );
    assert_eq!(config.mailer.default_service.as_deref(), Some("default"));
}

#[test]
fn test_invalid_toml_config() {
    let result = AppConfig::from_toml(
        r#"
[mailer.services.default]
driver = "carrier-pigeon"
"#,
    );
    assert!(result.is_err());

    let result = AppConfig::from_toml(
        r#"
[observability]
log_level = "verbose"
"#,
    );
    assert!(result.is_err());
}

#[test]
fn test_config_load_from_file() {
    let temp_file = NamedTempFile::new().unwrap();
    fs::write(
        temp_file.path(),
        r#"
[mailer]
default_service = "default"

[mailer.services.default]
driver = "memory"

[cache]
backend = "memory"
purge_interval_seconds = 0
"#,
    )
    .unwrap();

    let path = temp_file.path().to_str().unwrap();
    let config = AppConfig::load(Some(path)).unwrap();

    assert_eq!(config.mailer.services["default"].driver, "memory");
    assert_eq!(config.cache.purge_interval_seconds, 0);
}

#[test]
fn test_config_load_missing_file() {
    let result = AppConfig::load(Some("/definitely/not/here/postie.toml"));
    assert!(result.is_err());
}

#[test]
fn test_config_toml_roundtrip() {
    let config = AppConfig::default();
    let toml_str = config.to_toml().unwrap();
    let restored = AppConfig::from_toml(&toml_str).unwrap();

    assert_eq!(restored.mailer.services, config.mailer.services);
    assert_eq!(
        restored.message_status_cache.key_prefix,
        config.message_status_cache.key_prefix
    );
}

#[test]
fn test_oversized_status_ttl_rejected() {
    let result = AppConfig::from_toml(
        r#"
[message_status_cache.ttl]
pending_seconds = 9223372036854775807
"#,
    );
    assert!(result.is_err());

    let config = AppConfig::from_toml(&format!(
        "[message_status_cache.ttl]\nsent_seconds = {MAX_STATUS_TTL_SECONDS}\n"
    ))
    .unwrap();
    assert_eq!(
        config.message_status_cache.ttl(Status::Sent),
        Duration::from_secs(MAX_STATUS_TTL_SECONDS)
    );
}
