//! Alert dispatcher.
//!
//! Ties the pieces together for one state-change event:
//! throttle check, record building, per-channel render and send, then the
//! throttle update. Channels are attempted concurrently and a failure on one
//! never affects another. The cool-down is updated once channels have been
//! attempted, whatever their outcome.
//!
//! Dispatches for the same job run one at a time, so the cool-down check and
//! its update are never interleaved with another alert for that job.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures_util::future::{join, join_all};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::AlertConfig;
use crate::error::{AlertError, AppResult};
use crate::models::{
    ChannelOutcome, ChannelType, DeliveryStatus, DispatchReport, DispatchStatus,
    NotificationRecord, SenderConfig, StateChangeEvent, ThrottleUpdate,
};
use crate::services::context::AlertContextBuilder;
use crate::services::notification::{
    lark, validate_webhook_url, ChannelRenderer, EmailMessage, EmailRenderer, HttpWebhookClient,
    MailTransport, SmtpMailer, WebhookRenderer, WebhookTransport,
};
use crate::services::throttle::{InMemoryThrottleStore, ThrottleStore};

pub type EmailRendererRef = Arc<dyn ChannelRenderer<Payload = String>>;
pub type WebhookRendererRef = Arc<dyn ChannelRenderer<Payload = serde_json::Value>>;

pub struct AlertDispatcher {
    throttle: Arc<dyn ThrottleStore>,
    context: AlertContextBuilder,
    email_renderer: EmailRendererRef,
    webhook_renderer: WebhookRendererRef,
    mailer: Arc<dyn MailTransport>,
    webhook: Arc<dyn WebhookTransport>,
    sender: Option<SenderConfig>,
    /// Per-job locks serializing dispatches for one entity
    entity_locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl AlertDispatcher {
    pub fn builder(config: AlertConfig) -> AlertDispatcherBuilder {
        AlertDispatcherBuilder::new(config)
    }

    /// Dispatches `event` using the current wall-clock time
    pub async fn dispatch_now(&self, event: &StateChangeEvent) -> AppResult<DispatchReport> {
        self.dispatch(event, Utc::now()).await
    }

    /// Dispatches `event` as of `now`
    ///
    /// Only a malformed event is returned as an error; channel failures are
    /// reported in the [`DispatchReport`].
    pub async fn dispatch(
        &self,
        event: &StateChangeEvent,
        now: DateTime<Utc>,
    ) -> AppResult<DispatchReport> {
        let entity_id = event.entity_id;
        let now_ms = now.timestamp_millis();

        let lock = self.entity_lock(entity_id);
        let _guard = lock.lock().await;

        if !self.throttle.allow(entity_id, now_ms).await {
            log::debug!(
                "Alert for entity_id={} ({}) suppressed by cool-down",
                entity_id,
                event.job_name
            );
            return Ok(DispatchReport::skipped(entity_id, DispatchStatus::Suppressed));
        }

        if !event.has_destinations() {
            log::debug!("No alert destinations for entity_id={}", entity_id);
            return Ok(DispatchReport::skipped(entity_id, DispatchStatus::NoDestinations));
        }

        let record = self.context.build(event, now).map_err(|e| {
            log::error!("Cannot build alert for entity_id={}: {}", entity_id, e);
            e
        })?;

        log::info!(
            "Dispatching {} alert for entity_id={} ({}): {}",
            record.kind,
            entity_id,
            record.job_name,
            record.subject
        );

        let (email, webhooks) = join(
            self.deliver_email(&record, &event.alert_emails),
            join_all(
                event
                    .webhooks
                    .iter()
                    .map(|url| self.deliver_webhook(&record, url)),
            ),
        )
        .await;

        let mut outcomes: Vec<ChannelOutcome> = email.into_iter().collect();
        outcomes.extend(webhooks);

        let throttle = if event.state.is_terminal() {
            self.throttle.clear(entity_id).await;
            ThrottleUpdate::Cleared
        } else {
            self.throttle.record(entity_id, now_ms).await;
            ThrottleUpdate::Recorded
        };

        let report = DispatchReport {
            entity_id,
            status: DispatchStatus::Attempted,
            throttle,
            outcomes,
        };

        if report.sent_count() == 0 {
            log::warn!(
                "No channel delivered the alert for entity_id={}; cool-down still {:?}",
                entity_id,
                throttle
            );
        }

        Ok(report)
    }

    fn entity_lock(&self, entity_id: i64) -> Arc<Mutex<()>> {
        self.entity_locks
            .entry(entity_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn deliver_email(
        &self,
        record: &NotificationRecord,
        recipients: &[String],
    ) -> Option<ChannelOutcome> {
        if recipients.is_empty() {
            return None;
        }

        let target = format!("{} recipients", recipients.len());
        let outcome = |status| {
            Some(ChannelOutcome {
                channel: ChannelType::Email,
                target: target.clone(),
                status,
            })
        };

        let sender = match &self.sender {
            Some(sender) => sender,
            None => {
                log::debug!(
                    "Skipping email for entity_id={}: no sender configured",
                    record.entity_id
                );
                return outcome(DeliveryStatus::Skipped(
                    "no sender email configured".to_string(),
                ));
            }
        };

        let html_body = match self.email_renderer.render(record) {
            Ok(html) => html,
            Err(e) => {
                log::warn!(
                    "Email render failed for entity_id={} channel=email: {}",
                    record.entity_id,
                    e
                );
                return outcome(DeliveryStatus::RenderFailed(e));
            }
        };

        let message = EmailMessage {
            subject: record.subject.clone(),
            html_body,
            recipients: recipients.to_vec(),
        };

        match self.mailer.send(&message, sender).await {
            Ok(()) => {
                log::info!(
                    "Alert email sent for entity_id={} to {}",
                    record.entity_id,
                    target
                );
                outcome(DeliveryStatus::Sent { http_status: None })
            }
            Err(e) => {
                log::warn!(
                    "Alert email failed for entity_id={} channel=email target={}: {}",
                    record.entity_id,
                    target,
                    e
                );
                outcome(DeliveryStatus::SendFailed(e))
            }
        }
    }

    async fn deliver_webhook(&self, record: &NotificationRecord, url: &str) -> ChannelOutcome {
        let outcome = |status| ChannelOutcome {
            channel: ChannelType::Webhook,
            target: url.to_string(),
            status,
        };

        if let Err(e) = validate_webhook_url(url) {
            log::warn!(
                "Skipping webhook for entity_id={} target={}: {}",
                record.entity_id,
                url,
                e
            );
            return outcome(DeliveryStatus::SendFailed(e));
        }

        let payload = match self.webhook_renderer.render(record) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!(
                    "Webhook render failed for entity_id={} channel=webhook target={}: {}",
                    record.entity_id,
                    url,
                    e
                );
                return outcome(DeliveryStatus::RenderFailed(e));
            }
        };

        let result = self
            .webhook
            .post(url, &payload)
            .await
            .and_then(|response| lark::check_response(&response));

        match result {
            Ok(status) => {
                log::info!(
                    "Alert webhook sent for entity_id={} target={} (HTTP {})",
                    record.entity_id,
                    url,
                    status
                );
                outcome(DeliveryStatus::Sent {
                    http_status: Some(status),
                })
            }
            Err(e) => {
                log::warn!(
                    "Alert webhook failed for entity_id={} channel=webhook target={}: {}",
                    record.entity_id,
                    url,
                    e
                );
                outcome(DeliveryStatus::SendFailed(e))
            }
        }
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Wires an [`AlertDispatcher`], defaulting every part not supplied
pub struct AlertDispatcherBuilder {
    config: AlertConfig,
    sender: Option<SenderConfig>,
    throttle: Option<Arc<dyn ThrottleStore>>,
    email_renderer: Option<EmailRendererRef>,
    webhook_renderer: Option<WebhookRendererRef>,
    mailer: Option<Arc<dyn MailTransport>>,
    webhook: Option<Arc<dyn WebhookTransport>>,
}

impl AlertDispatcherBuilder {
    pub fn new(config: AlertConfig) -> Self {
        Self {
            config,
            sender: None,
            throttle: None,
            email_renderer: None,
            webhook_renderer: None,
            mailer: None,
            webhook: None,
        }
    }

    pub fn sender(mut self, sender: Option<SenderConfig>) -> Self {
        self.sender = sender;
        self
    }

    pub fn throttle(mut self, throttle: Arc<dyn ThrottleStore>) -> Self {
        self.throttle = Some(throttle);
        self
    }

    pub fn email_renderer(mut self, renderer: EmailRendererRef) -> Self {
        self.email_renderer = Some(renderer);
        self
    }

    pub fn webhook_renderer(mut self, renderer: WebhookRendererRef) -> Self {
        self.webhook_renderer = Some(renderer);
        self
    }

    pub fn mailer(mut self, mailer: Arc<dyn MailTransport>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn webhook(mut self, webhook: Arc<dyn WebhookTransport>) -> Self {
        self.webhook = Some(webhook);
        self
    }

    pub fn build(self) -> AppResult<AlertDispatcher> {
        let config = self.config;

        let email_renderer: EmailRendererRef = match self.email_renderer {
            Some(renderer) => renderer,
            None => Arc::new(
                EmailRenderer::from_config(&config)
                    .map_err(|e| AlertError::Config(e.to_string()))?,
            ),
        };

        let webhook: Arc<dyn WebhookTransport> = match self.webhook {
            Some(webhook) => webhook,
            None => Arc::new(HttpWebhookClient::new(config.webhook_timeout)?),
        };

        Ok(AlertDispatcher {
            throttle: self
                .throttle
                .unwrap_or_else(|| Arc::new(InMemoryThrottleStore::new(config.cooldown))),
            context: AlertContextBuilder::from_config(&config),
            email_renderer,
            webhook_renderer: self
                .webhook_renderer
                .unwrap_or_else(|| Arc::new(WebhookRenderer::new(config.category.clone()))),
            mailer: self.mailer.unwrap_or_else(|| Arc::new(SmtpMailer::new())),
            webhook,
            sender: self.sender,
            entity_locks: DashMap::new(),
        })
    }
}
