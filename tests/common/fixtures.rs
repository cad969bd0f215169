//! Test fixtures and data builders
//!
//! Provides reusable state-change events with sensible defaults.

use chrono::{DateTime, TimeZone, Utc};
use streamx_alert::models::{AppState, CheckpointStatus, ExecutionMode, StateChangeEvent};

/// Fixed reference instant for tests (2023-11-14T22:13:20Z)
pub const BASE_MILLIS: i64 = 1_700_000_000_000;

pub fn at_millis(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).unwrap()
}

/// Builds test events
pub struct EventBuilder {
    event: StateChangeEvent,
}

impl Default for EventBuilder {
    fn default() -> Self {
        Self {
            event: StateChangeEvent {
                entity_id: 1,
                job_name: "orders-etl".to_string(),
                state: AppState::Failed,
                execution_mode: ExecutionMode::YarnPerJob,
                app_id: Some("application_1700000000000_0001".to_string()),
                checkpoint_status: None,
                start_time: Some(at_millis(BASE_MILLIS)),
                end_time: None,
                need_restart_on_failure: false,
                restart_count: 0,
                restart_size: 0,
                cp_failure_rate_interval: 0,
                cp_max_failure_interval: 0,
                alert_emails: vec!["ops@example.com".to_string()],
                webhooks: vec!["https://open.feishu.cn/open-apis/bot/v2/hook/test".to_string()],
            },
        }
    }
}

impl EventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity_id(mut self, id: i64) -> Self {
        self.event.entity_id = id;
        self
    }

    pub fn with_job_name(mut self, name: &str) -> Self {
        self.event.job_name = name.to_string();
        self
    }

    pub fn with_state(mut self, state: AppState) -> Self {
        self.event.state = state;
        self
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.event.execution_mode = mode;
        self
    }

    pub fn with_app_id(mut self, app_id: Option<&str>) -> Self {
        self.event.app_id = app_id.map(str::to_string);
        self
    }

    pub fn checkpoint_failed(mut self) -> Self {
        self.event.checkpoint_status = Some(CheckpointStatus::Failed);
        self
    }

    pub fn with_start_millis(mut self, millis: Option<i64>) -> Self {
        self.event.start_time = millis.map(at_millis);
        self
    }

    pub fn with_end_millis(mut self, millis: Option<i64>) -> Self {
        self.event.end_time = millis.map(at_millis);
        self
    }

    pub fn with_restart(mut self, need_restart: bool, count: u32, size: u32) -> Self {
        self.event.need_restart_on_failure = need_restart;
        self.event.restart_count = count;
        self.event.restart_size = size;
        self
    }

    pub fn with_emails(mut self, emails: &[&str]) -> Self {
        self.event.alert_emails = emails.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn with_webhooks(mut self, urls: &[&str]) -> Self {
        self.event.webhooks = urls.iter().map(|u| u.to_string()).collect();
        self
    }

    pub fn build(self) -> StateChangeEvent {
        self.event
    }
}
