//! Webhook transport.
//!
//! Posts JSON payloads to chat-bot webhook URLs over HTTP.

use async_trait::async_trait;
use std::time::Duration;

use super::{WebhookResponse, WebhookTransport};
use crate::error::{AlertError, AppResult, ChannelSendError};

/// HTTP webhook client
pub struct HttpWebhookClient {
    client: reqwest::Client,
}

impl HttpWebhookClient {
    /// Creates a client whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AlertError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

/// Checks that `url` is an absolute HTTP(S) URL
pub fn validate_webhook_url(url: &str) -> Result<(), ChannelSendError> {
    let parsed = url::Url::parse(url)
        .map_err(|_| ChannelSendError::InvalidAddress(format!("invalid webhook URL {}", url)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ChannelSendError::InvalidAddress(format!(
            "webhook URL must use HTTP or HTTPS: {}",
            url
        )));
    }

    Ok(())
}

#[async_trait]
impl WebhookTransport for HttpWebhookClient {
    async fn post(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<WebhookResponse, ChannelSendError> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json; charset=utf-8")
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        Ok(WebhookResponse { status, body })
    }
}
