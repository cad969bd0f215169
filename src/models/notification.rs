//! Channel-agnostic notification record built once per dispatch.

use serde::{Serialize, Serializer};

/// What triggered the alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    StateChange,
    CheckpointFailure,
}

impl AlertKind {
    /// Numeric kind used by email templates
    pub fn code(&self) -> u8 {
        match self {
            AlertKind::StateChange => 1,
            AlertKind::CheckpointFailure => 2,
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertKind::StateChange => write!(f, "state_change"),
            AlertKind::CheckpointFailure => write!(f, "checkpoint_failure"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Seconds,
    Minutes,
}

impl DurationUnit {
    fn suffix(&self) -> &'static str {
        match self {
            DurationUnit::Seconds => "s",
            DurationUnit::Minutes => "m",
        }
    }
}

/// Elapsed job time, truncated to whole units
///
/// Minutes display in days/hours/minutes form (`2h 5m`), seconds as `90s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertDuration {
    pub value: i64,
    pub unit: DurationUnit,
}

impl AlertDuration {
    pub fn from_millis(millis: i64, unit: DurationUnit) -> Self {
        let value = match unit {
            DurationUnit::Seconds => millis / 1000,
            DurationUnit::Minutes => millis / 1000 / 60,
        };
        Self { value, unit }
    }
}

impl std::fmt::Display for AlertDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.unit, u32::try_from(self.value)) {
            (DurationUnit::Minutes, Ok(minutes)) => f.write_str(&rich_minutes(minutes)),
            _ => write!(f, "{}{}", self.value, self.unit.suffix()),
        }
    }
}

impl Serialize for AlertDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RestartInfo {
    pub index: u32,
    pub total: u32,
}

/// Checkpoint policy details, present on checkpoint-failure alerts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckpointInfo {
    pub failure_rate_interval: String,
    pub max_failure_interval: u32,
}

/// Rendered alert content shared by every channel
#[derive(Debug, Clone, Serialize)]
pub struct NotificationRecord {
    pub entity_id: i64,
    pub kind: AlertKind,
    #[serde(rename = "type")]
    pub kind_code: u8,
    pub job_name: String,
    pub status: String,
    /// Heading shown inside the message
    pub title: String,
    /// Email subject line
    pub subject: String,
    pub start_time: String,
    pub end_time: String,
    pub duration: AlertDuration,
    /// Deep link to the cluster UI, empty when none applies
    pub link: String,
    pub restart: Option<RestartInfo>,
    pub checkpoint: Option<CheckpointInfo>,
}

/// Formats whole minutes as e.g. `1h 5m`, `2d 3h`
pub fn rich_minutes(minutes: u32) -> String {
    let days = minutes / (60 * 24);
    let hours = (minutes / 60) % 24;
    let mins = minutes % 60;

    let parts: Vec<String> = [(days, "d"), (hours, "h"), (mins, "m")]
        .iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, unit)| format!("{}{}", n, unit))
        .collect();

    if parts.is_empty() {
        "0m".to_string()
    } else {
        parts.join(" ")
    }
}
