use std::env;
use std::time::Duration;

use crate::models::SenderConfig;

/// Default cool-down between two alerts for the same job (5 minutes)
pub const DEFAULT_COOLDOWN_MS: u64 = 300_000;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub alert: AlertConfig,
    /// Absent when no SMTP host is configured; email is then skipped
    pub sender: Option<SenderConfig>,
}

/// Dispatch and rendering settings
#[derive(Debug, Clone)]
pub struct AlertConfig {
    pub cooldown: Duration,
    /// Tag prefixed to card titles, e.g. `[StreamX]`
    pub category: String,
    /// YARN resource manager web UI, used for deep links
    pub resource_manager_url: Option<String>,
    /// Path to a custom email template
    pub email_template: Option<String>,
    pub webhook_timeout: Duration,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_millis(DEFAULT_COOLDOWN_MS),
            category: "StreamX".to_string(),
            resource_manager_url: None,
            email_template: None,
            webhook_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            alert: AlertConfig::from_env(),
            sender: sender_from_env()?,
        })
    }
}

impl AlertConfig {
    /// Load alert configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            cooldown: Duration::from_millis(
                env::var("ALERT_COOLDOWN_MS")
                    .unwrap_or_else(|_| DEFAULT_COOLDOWN_MS.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_COOLDOWN_MS),
            ),
            category: env::var("ALERT_CATEGORY")
                .ok()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| "StreamX".to_string()),
            resource_manager_url: env::var("YARN_RM_WEBAPP_URL")
                .ok()
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
            email_template: env::var("ALERT_EMAIL_TEMPLATE").ok(),
            webhook_timeout: Duration::from_secs(
                env::var("WEBHOOK_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .unwrap_or(30),
            ),
        }
    }
}

/// Load the SMTP sender from environment variables
///
/// Returns `Ok(None)` when `SMTP_HOST` is not set.
pub fn sender_from_env() -> Result<Option<SenderConfig>, ConfigError> {
    let smtp_host = match env::var("SMTP_HOST") {
        Ok(host) if !host.trim().is_empty() => host,
        _ => return Ok(None),
    };

    let ssl = env::var("SMTP_SSL")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    let smtp_port = match env::var("SMTP_PORT") {
        Ok(port) => port.parse().map_err(|_| ConfigError::InvalidSmtpPort)?,
        Err(_) if ssl => 465,
        Err(_) => 25,
    };

    Ok(Some(SenderConfig {
        smtp_host,
        smtp_port,
        username: env::var("SMTP_USERNAME").ok(),
        password: env::var("SMTP_PASSWORD").ok(),
        from_address: env::var("SMTP_FROM").unwrap_or_else(|_| "streamx@localhost".to_string()),
        ssl,
        timeout: Duration::from_secs(
            env::var("SMTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
        ),
    }))
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidSmtpPort,
    TemplateUnreadable(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidSmtpPort => write!(f, "SMTP_PORT must be a valid number"),
            ConfigError::TemplateUnreadable(reason) => {
                write!(f, "ALERT_EMAIL_TEMPLATE could not be loaded: {}", reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
