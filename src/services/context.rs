//! Builds the channel-agnostic [`NotificationRecord`] from a state-change event.

use chrono::{DateTime, Local, Utc};

use crate::config::AlertConfig;
use crate::error::{AlertError, AppResult};
use crate::models::{
    rich_minutes, AlertDuration, AlertKind, CheckpointInfo, DurationUnit, NotificationRecord,
    RestartInfo, StateChangeEvent,
};

/// Timestamp layout used in every rendered alert
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct AlertContextBuilder {
    resource_manager_url: Option<String>,
}

impl AlertContextBuilder {
    pub fn new(resource_manager_url: Option<String>) -> Self {
        Self {
            resource_manager_url: resource_manager_url
                .map(|url| url.trim_end_matches('/').to_string()),
        }
    }

    pub fn from_config(config: &AlertConfig) -> Self {
        Self::new(config.resource_manager_url.clone())
    }

    /// Derives the notification record for `event` as of `now`
    ///
    /// Fails with [`AlertError::MalformedEvent`] when the start time is
    /// missing or the resulting duration would be negative.
    pub fn build(
        &self,
        event: &StateChangeEvent,
        now: DateTime<Utc>,
    ) -> AppResult<NotificationRecord> {
        let start = event
            .start_time
            .ok_or_else(|| AlertError::malformed(event.entity_id, "start time is missing"))?;
        let end = event.end_time.unwrap_or(now);

        let elapsed_ms = (end - start).num_milliseconds();
        if elapsed_ms < 0 {
            return Err(AlertError::malformed(
                event.entity_id,
                format!("end time {} precedes start time {}", end, start),
            ));
        }

        let kind = if event.is_checkpoint_failure() {
            AlertKind::CheckpointFailure
        } else {
            AlertKind::StateChange
        };

        let status = event.state.as_str().to_string();
        let (title, subject, unit) = match kind {
            AlertKind::StateChange => (
                format!("Notify: {} {}", event.job_name, status),
                format!("Alert: {} {}", event.job_name, status),
                DurationUnit::Minutes,
            ),
            AlertKind::CheckpointFailure => (
                format!("Notify: {} checkpoint FAILED", event.job_name),
                format!("Alert: {}, checkPoint is Failed", event.job_name),
                DurationUnit::Seconds,
            ),
        };

        let restart = (event.need_restart_on_failure && event.restart_count > 0).then(|| {
            RestartInfo {
                index: event.restart_count,
                total: event.restart_size,
            }
        });

        let checkpoint = (kind == AlertKind::CheckpointFailure).then(|| CheckpointInfo {
            failure_rate_interval: rich_minutes(event.cp_failure_rate_interval),
            max_failure_interval: event.cp_max_failure_interval,
        });

        Ok(NotificationRecord {
            entity_id: event.entity_id,
            kind,
            kind_code: kind.code(),
            job_name: event.job_name.clone(),
            status,
            title,
            subject,
            start_time: format_local(start),
            end_time: format_local(end),
            duration: AlertDuration::from_millis(elapsed_ms, unit),
            link: self.deep_link(event),
            restart,
            checkpoint,
        })
    }

    /// `{rm}/proxy/{app_id}/` for YARN jobs, empty otherwise
    fn deep_link(&self, event: &StateChangeEvent) -> String {
        if !event.execution_mode.is_yarn() {
            return String::new();
        }

        match (&self.resource_manager_url, &event.app_id) {
            (Some(rm), Some(app_id)) if !app_id.is_empty() => {
                format!("{}/proxy/{}/", rm, app_id)
            }
            _ => String::new(),
        }
    }
}

fn format_local(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format(TIME_FORMAT).to_string()
}
