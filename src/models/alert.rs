//! Alert delivery models.
//!
//! This module contains the channel taxonomy, the SMTP sender settings
//! and the per-dispatch outcome report.

use serde::Serialize;
use std::time::Duration;

use crate::error::{ChannelSendError, RenderError};

// =============================================================================
// Channel Type Enum
// =============================================================================

/// Type of notification channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    Email,
    Webhook,
}

impl std::fmt::Display for ChannelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelType::Email => write!(f, "email"),
            ChannelType::Webhook => write!(f, "webhook"),
        }
    }
}

// =============================================================================
// Sender Configuration
// =============================================================================

/// SMTP account used to send alert emails
#[derive(Clone)]
pub struct SenderConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: String,
    /// Implicit TLS on connect
    pub ssl: bool,
    pub timeout: Duration,
}

impl std::fmt::Debug for SenderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SenderConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("from_address", &self.from_address)
            .field("ssl", &self.ssl)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// =============================================================================
// Dispatch Report
// =============================================================================

/// Result of one channel delivery attempt
#[derive(Debug)]
pub enum DeliveryStatus {
    Sent { http_status: Option<u16> },
    Skipped(String),
    RenderFailed(RenderError),
    SendFailed(ChannelSendError),
}

#[derive(Debug)]
pub struct ChannelOutcome {
    pub channel: ChannelType,
    /// Webhook URL, or recipient count for email
    pub target: String,
    pub status: DeliveryStatus,
}

impl ChannelOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self.status, DeliveryStatus::Sent { .. })
    }
}

/// Whether a dispatch went out at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    /// Blocked by an active cool-down
    Suppressed,
    /// Nothing configured to send to
    NoDestinations,
    /// Channels were attempted; see the outcomes
    Attempted,
}

/// What the dispatcher did to the throttle entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleUpdate {
    Unchanged,
    Recorded,
    Cleared,
}

/// Aggregated outcome of a single dispatch
#[derive(Debug)]
pub struct DispatchReport {
    pub entity_id: i64,
    pub status: DispatchStatus,
    pub throttle: ThrottleUpdate,
    pub outcomes: Vec<ChannelOutcome>,
}

impl DispatchReport {
    pub fn skipped(entity_id: i64, status: DispatchStatus) -> Self {
        Self {
            entity_id,
            status,
            throttle: ThrottleUpdate::Unchanged,
            outcomes: Vec::new(),
        }
    }

    pub fn sent_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_sent()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| {
                matches!(
                    o.status,
                    DeliveryStatus::RenderFailed(_) | DeliveryStatus::SendFailed(_)
                )
            })
            .count()
    }

    /// Outcomes for one channel type
    pub fn channel(&self, channel: ChannelType) -> impl Iterator<Item = &ChannelOutcome> {
        self.outcomes.iter().filter(move |o| o.channel == channel)
    }
}
