//! Job state-change events as delivered by the job-management layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Lifecycle State
// =============================================================================

/// Lifecycle state of a monitored job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppState {
    Added,
    Initializing,
    Created,
    Starting,
    Restarting,
    Running,
    Failing,
    Failed,
    Cancelling,
    Canceled,
    Finished,
    Suspended,
    Reconciling,
    Lost,
    Mapping,
    Other,
    Revoked,
    Launched,
}

impl AppState {
    /// States that end the current alert episode and reset the cool-down
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppState::Canceled | AppState::Failed | AppState::Lost)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppState::Added => "ADDED",
            AppState::Initializing => "INITIALIZING",
            AppState::Created => "CREATED",
            AppState::Starting => "STARTING",
            AppState::Restarting => "RESTARTING",
            AppState::Running => "RUNNING",
            AppState::Failing => "FAILING",
            AppState::Failed => "FAILED",
            AppState::Cancelling => "CANCELLING",
            AppState::Canceled => "CANCELED",
            AppState::Finished => "FINISHED",
            AppState::Suspended => "SUSPENDED",
            AppState::Reconciling => "RECONCILING",
            AppState::Lost => "LOST",
            AppState::Mapping => "MAPPING",
            AppState::Other => "OTHER",
            AppState::Revoked => "REVOKED",
            AppState::Launched => "LAUNCHED",
        }
    }
}

impl std::fmt::Display for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Execution Mode
// =============================================================================

/// How the job is deployed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionMode {
    Local,
    Remote,
    YarnPerJob,
    YarnSession,
    YarnApplication,
    KubernetesNativeSession,
    KubernetesNativeApplication,
}

impl ExecutionMode {
    /// True for modes managed by a YARN resource manager
    pub fn is_yarn(&self) -> bool {
        matches!(
            self,
            ExecutionMode::YarnPerJob | ExecutionMode::YarnSession | ExecutionMode::YarnApplication
        )
    }
}

/// Checkpoint health reported alongside a state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckpointStatus {
    Success,
    Failed,
}

// =============================================================================
// State Change Event
// =============================================================================

/// A job state change, read-only input to the dispatcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateChangeEvent {
    /// Stable identifier of the monitored job
    pub entity_id: i64,
    pub job_name: String,
    pub state: AppState,
    pub execution_mode: ExecutionMode,
    /// Cluster application id (e.g. `application_1700000000000_0001`)
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub checkpoint_status: Option<CheckpointStatus>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub need_restart_on_failure: bool,
    #[serde(default)]
    pub restart_count: u32,
    #[serde(default)]
    pub restart_size: u32,
    /// Checkpoint failure-rate window in minutes
    #[serde(default)]
    pub cp_failure_rate_interval: u32,
    #[serde(default)]
    pub cp_max_failure_interval: u32,
    #[serde(default, deserialize_with = "deserialize_addresses")]
    pub alert_emails: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_addresses")]
    pub webhooks: Vec<String>,
}

impl StateChangeEvent {
    pub fn is_checkpoint_failure(&self) -> bool {
        self.checkpoint_status == Some(CheckpointStatus::Failed)
    }

    /// True when at least one email or webhook destination is configured
    pub fn has_destinations(&self) -> bool {
        !self.alert_emails.is_empty() || !self.webhooks.is_empty()
    }
}

/// Splits a comma-separated address list, dropping blanks
pub fn split_addresses(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AddressList {
    Joined(String),
    List(Vec<String>),
}

fn deserialize_addresses<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let addresses = match Option::<AddressList>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(AddressList::Joined(raw)) => split_addresses(&raw),
        Some(AddressList::List(list)) => list
            .iter()
            .flat_map(|entry| split_addresses(entry))
            .collect(),
    };
    Ok(addresses)
}
