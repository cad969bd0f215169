//! Notification rendering and delivery.
//!
//! Each channel is split into a renderer, which turns a
//! [`NotificationRecord`] into the channel's payload, and a transport, which
//! ships that payload. Transports are traits so the host can swap the real
//! SMTP/HTTP clients for its own.

pub mod email;
pub mod lark;
pub mod webhook;

use async_trait::async_trait;

use crate::error::{ChannelSendError, RenderError};
use crate::models::{NotificationRecord, SenderConfig};

pub use email::{EmailRenderer, SmtpMailer};
pub use lark::{CardBuilder, LarkMessage, WebhookRenderer};
pub use webhook::{validate_webhook_url, HttpWebhookClient};

// =============================================================================
// Rendering
// =============================================================================

/// Turns a notification record into a channel-specific payload
pub trait ChannelRenderer: Send + Sync {
    type Payload;

    fn render(&self, record: &NotificationRecord) -> Result<Self::Payload, RenderError>;
}

// =============================================================================
// Transports
// =============================================================================

/// A fully rendered alert email
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub subject: String,
    pub html_body: String,
    pub recipients: Vec<String>,
}

/// Sends alert emails
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(
        &self,
        message: &EmailMessage,
        sender: &SenderConfig,
    ) -> Result<(), ChannelSendError>;
}

/// Raw HTTP answer from a webhook endpoint
#[derive(Debug, Clone)]
pub struct WebhookResponse {
    pub status: u16,
    pub body: String,
}

/// Posts JSON documents to webhook URLs
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<WebhookResponse, ChannelSendError>;
}
