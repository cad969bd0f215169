//! Unit tests for loading and rendering email templates

use std::io::Write;
use streamx_alert::config::AlertConfig;
use streamx_alert::error::RenderError;
use streamx_alert::models::{
    AlertDuration, AlertKind, CheckpointInfo, DurationUnit, NotificationRecord,
};
use streamx_alert::services::{ChannelRenderer, EmailRenderer};
use tempfile::NamedTempFile;

fn create_checkpoint_record() -> NotificationRecord {
    NotificationRecord {
        entity_id: 5,
        kind: AlertKind::CheckpointFailure,
        kind_code: 2,
        job_name: "clicks".to_string(),
        status: "RUNNING".to_string(),
        title: "Notify: clicks checkpoint FAILED".to_string(),
        subject: "Alert: clicks, checkPoint is Failed".to_string(),
        start_time: "2024-01-09 12:00:00".to_string(),
        end_time: "2024-01-09 12:01:30".to_string(),
        duration: AlertDuration {
            value: 90,
            unit: DurationUnit::Seconds,
        },
        link: String::new(),
        restart: None,
        checkpoint: Some(CheckpointInfo {
            failure_rate_interval: "10m".to_string(),
            max_failure_interval: 3,
        }),
    }
}

#[test]
fn test_default_template_checkpoint_section() {
    let html = EmailRenderer::builtin()
        .unwrap()
        .render(&create_checkpoint_record())
        .unwrap();

    assert!(html.contains("Notify: clicks checkpoint FAILED"));
    assert!(html.contains("90s"));
    assert!(html.contains("Checkpoint Failure Rate Interval"));
    assert!(html.contains("10m"));
}

#[test]
fn test_template_loaded_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "<p>{{{{ mail.job_name }}}} / {{{{ mail.type }}}}</p>").unwrap();

    let config = AlertConfig {
        email_template: Some(file.path().to_string_lossy().to_string()),
        ..AlertConfig::default()
    };

    let renderer = EmailRenderer::from_config(&config).unwrap();
    let html = renderer.render(&create_checkpoint_record()).unwrap();

    assert_eq!(html, "<p>clicks / 2</p>");
}

#[test]
fn test_template_is_parsed_once_at_load() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "<p>{{{{ mail.title }}}}</p>").unwrap();

    let config = AlertConfig {
        email_template: Some(file.path().to_string_lossy().to_string()),
        ..AlertConfig::default()
    };
    let renderer = EmailRenderer::from_config(&config).unwrap();
    file.close().unwrap();

    let record = create_checkpoint_record();
    let first = renderer.render(&record).unwrap();
    let second = renderer.render(&record).unwrap();

    assert_eq!(first, "<p>Notify: clicks checkpoint FAILED</p>");
    assert_eq!(first, second);
}

#[test]
fn test_syntax_error_rejected_at_load() {
    assert!(matches!(
        EmailRenderer::new("{% if mail.restart %}unterminated"),
        Err(RenderError::Template(_))
    ));
}

#[test]
fn test_missing_template_file_is_config_error() {
    let config = AlertConfig {
        email_template: Some("/nonexistent/alert_email.html".to_string()),
        ..AlertConfig::default()
    };

    assert!(EmailRenderer::from_config(&config).is_err());
}

#[test]
fn test_render_error_on_undefined_field() {
    let renderer = EmailRenderer::new("{{ mail.cluster }}").unwrap();

    assert!(matches!(
        renderer.render(&create_checkpoint_record()),
        Err(RenderError::Template(_))
    ));
}
