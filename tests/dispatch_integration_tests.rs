use std::fs;
use std::sync::{Arc, Mutex};

use postie::Application;
use postie_core::{AppConfig, EmailSendRequest, ExceptionReporter, Status, TemplateEmailSendRequest};
use postie_errors::PostieError;
use tempfile::NamedTempFile;

const CONFIG: &str = r#"
[mailer]
default_service = "default"

[mailer.services.default]
driver = "memory"

[mailer.services.template]
driver = "mock"
options = { should_succeed = true }

[mailer.services.broken]
driver = "mock"
options = { should_succeed = false, latency_ms = 1 }

[cache]
backend = "memory"
purge_interval_seconds = 0
"#;

#[derive(Default)]
struct CollectingReporter {
    errors: Mutex<Vec<String>>,
}

impl ExceptionReporter for CollectingReporter {
    fn report(&self, error: &PostieError) {
        self.errors.lock().unwrap().push(error.to_string());
    }
}

async fn app_with_reporter() -> (Application, Arc<CollectingReporter>) {
    let config = AppConfig::from_toml(CONFIG).unwrap();
    let reporter = Arc::new(CollectingReporter::default());
    let app = Application::with_reporter(config, reporter.clone())
        .await
        .unwrap();
    (app, reporter)
}

#[tokio::test]
async fn test_template_dispatch_end_to_end() {
    let (app, reporter) = app_with_reporter().await;

    let request = TemplateEmailSendRequest::new("welcome", vec!["user@example.com".to_string()]);
    let status = app.email_service().send_template_email(request).await.unwrap();

    assert_eq!(status.status, Status::Sent);
    let stored = app
        .email_service()
        .message_status(&status.message_id)
        .await
        .unwrap();
    assert_eq!(stored.status, Status::Sent);
    assert!(reporter.errors.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_dispatch_end_to_end() {
    let (app, reporter) = app_with_reporter().await;

    let request = EmailSendRequest::new("Hi", "Body", vec!["user@example.com".to_string()]);
    let status = app
        .email_service()
        .send_email(request, Some("broken"))
        .await
        .unwrap();

    assert_eq!(status.status, Status::Failed);
    assert!(status.error_message.is_some());
    assert_eq!(reporter.errors.lock().unwrap().len(), 1);

    let stored = app
        .email_service()
        .message_status(&status.message_id)
        .await
        .unwrap();
    assert_eq!(stored.error_message, status.error_message);
}

#[tokio::test]
async fn test_unregistered_alias_end_to_end() {
    let (app, reporter) = app_with_reporter().await;

    let request = EmailSendRequest::new("Hi", "Body", vec!["user@example.com".to_string()]);
    let result = app.email_service().send_email(request, Some("sms")).await;

    let err = result.unwrap_err();
    assert_eq!(err.error_code(), "INTERNAL_MAILER_SERVICE_NOT_REGISTERED");
    assert!(reporter.errors.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_mailer_health() {
    let (app, _) = app_with_reporter().await;

    let health = app.mailer_health().await.unwrap();
    assert_eq!(
        health.keys().cloned().collect::<Vec<_>>(),
        vec!["broken", "default", "template"]
    );
    assert!(health.values().all(|healthy| *healthy));
}

#[tokio::test]
async fn test_application_from_config_file() {
    let temp_file = NamedTempFile::new().unwrap();
    fs::write(temp_file.path(), CONFIG).unwrap();

    let config = AppConfig::load(temp_file.path().to_str()).unwrap();
    let app = Application::new(config).await.unwrap();

    assert_eq!(app.config().mailer.services.len(), 3);
    assert_eq!(app.config().cache.backend, "memory");
}

#[tokio::test]
async fn test_invalid_default_mailer_is_rejected() {
    let mut config = AppConfig::from_toml(CONFIG).unwrap();
    config.mailer.default_service = Some("missing".to_string());

    assert!(Application::new(config).await.is_err());
}
