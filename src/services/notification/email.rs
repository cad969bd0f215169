//! Email notification channel.
//!
//! Renders alerts through an HTML template (minijinja) and sends them over
//! SMTP using the lettre crate.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde_json::json;

use super::{ChannelRenderer, EmailMessage, MailTransport};
use crate::config::{AlertConfig, ConfigError};
use crate::error::{ChannelSendError, RenderError};
use crate::models::{NotificationRecord, SenderConfig};

/// Template shipped with the crate, used when no custom one is configured
pub const DEFAULT_TEMPLATE: &str = include_str!("../../../templates/alert_email.html");

const TEMPLATE_NAME: &str = "alert_email.html";

// =============================================================================
// Renderer
// =============================================================================

/// Renders the HTML email body
///
/// The template is parsed once at construction. The record is exposed to it
/// as `mail`.
pub struct EmailRenderer {
    env: Environment<'static>,
}

impl EmailRenderer {
    /// Creates a renderer for `source`, rejecting templates that do not parse
    pub fn new(source: impl Into<String>) -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.add_template_owned(TEMPLATE_NAME, source.into())?;

        Ok(Self { env })
    }

    /// Renderer for the template shipped with the crate
    pub fn builtin() -> Result<Self, RenderError> {
        Self::new(DEFAULT_TEMPLATE)
    }

    /// Uses `ALERT_EMAIL_TEMPLATE` when set, the built-in template otherwise
    pub fn from_config(config: &AlertConfig) -> Result<Self, ConfigError> {
        let source = match &config.email_template {
            Some(path) => std::fs::read_to_string(path)
                .map_err(|e| ConfigError::TemplateUnreadable(format!("{}: {}", path, e)))?,
            None => DEFAULT_TEMPLATE.to_string(),
        };

        Self::new(source).map_err(|e| ConfigError::TemplateUnreadable(e.to_string()))
    }
}

impl ChannelRenderer for EmailRenderer {
    type Payload = String;

    fn render(&self, record: &NotificationRecord) -> Result<String, RenderError> {
        let template = self.env.get_template(TEMPLATE_NAME)?;
        let html = template.render(json!({ "mail": record }))?;
        Ok(html)
    }
}

// =============================================================================
// SMTP Transport
// =============================================================================

/// Sends alert emails through the configured SMTP account
#[derive(Default)]
pub struct SmtpMailer;

impl SmtpMailer {
    pub fn new() -> Self {
        Self
    }

    fn build_message(
        message: &EmailMessage,
        sender: &SenderConfig,
    ) -> Result<Message, ChannelSendError> {
        let from: Mailbox = sender.from_address.parse().map_err(|_| {
            ChannelSendError::InvalidAddress(format!("from address {}", sender.from_address))
        })?;

        let mut builder = Message::builder()
            .from(from)
            .subject(&message.subject)
            .header(ContentType::TEXT_HTML);

        let mut valid = 0;
        for recipient in &message.recipients {
            match recipient.parse::<Mailbox>() {
                Ok(mailbox) => {
                    builder = builder.to(mailbox);
                    valid += 1;
                }
                Err(_) => log::warn!("Invalid email recipient: {}", recipient),
            }
        }

        if valid == 0 {
            return Err(ChannelSendError::InvalidAddress(
                "no valid email recipients".to_string(),
            ));
        }

        builder
            .body(message.html_body.clone())
            .map_err(|e| ChannelSendError::Smtp(format!("Failed to build email: {}", e)))
    }

    fn build_transport(
        sender: &SenderConfig,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, ChannelSendError> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(sender.smtp_host.as_str())
                .port(sender.smtp_port)
                .timeout(Some(sender.timeout));

        if sender.ssl {
            let tls_params = TlsParameters::new(sender.smtp_host.clone()).map_err(|e| {
                ChannelSendError::Smtp(format!("Invalid TLS parameters for SMTP host: {}", e))
            })?;
            builder = builder.tls(Tls::Wrapper(tls_params));
        }

        if let (Some(username), Some(password)) = (&sender.username, &sender.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(builder.build())
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(
        &self,
        message: &EmailMessage,
        sender: &SenderConfig,
    ) -> Result<(), ChannelSendError> {
        let email = Self::build_message(message, sender)?;
        let mailer = Self::build_transport(sender)?;

        mailer
            .send(email)
            .await
            .map_err(|e| ChannelSendError::Smtp(e.to_string()))?;

        log::debug!(
            "Email '{}' sent to {} recipients",
            message.subject,
            message.recipients.len()
        );
        Ok(())
    }
}
