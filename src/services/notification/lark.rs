//! Lark/Feishu interactive card payloads.
//!
//! The card layout is a wire contract with the chat platform: a colored
//! header, one `div` per label/value line, a divider and a footer note.
//! Payloads are assembled through [`CardBuilder`] so every message follows
//! that shape.

use serde::Serialize;

use super::{ChannelRenderer, WebhookResponse};
use crate::error::{ChannelSendError, RenderError};
use crate::models::NotificationRecord;

// =============================================================================
// Card Schema
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LarkMessage {
    pub msg_type: &'static str,
    pub card: Card,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub config: CardConfig,
    pub header: CardHeader,
    pub elements: Vec<CardElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardConfig {
    pub wide_screen_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardHeader {
    /// Accent color
    pub template: String,
    pub title: PlainText,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlainText {
    pub tag: &'static str,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkdownText {
    pub tag: &'static str,
    pub content: String,
}

impl MarkdownText {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            tag: "lark_md",
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardField {
    pub is_short: bool,
    pub text: MarkdownText,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tag", rename_all = "lowercase")]
pub enum CardElement {
    Div { fields: Vec<CardField> },
    Hr,
    Note { elements: Vec<MarkdownText> },
}

// =============================================================================
// Builder
// =============================================================================

const HEADER_COLOR: &str = "red";

/// Assembles a card: header, line items, then divider and footer on `build`
pub struct CardBuilder {
    title: String,
    lines: Vec<CardElement>,
}

impl CardBuilder {
    pub fn new(category: &str, title: &str) -> Self {
        Self {
            title: format!("[{}] {}", category, title),
            lines: Vec::new(),
        }
    }

    /// Adds a `**label:** value` row
    pub fn line(mut self, label: &str, value: impl std::fmt::Display) -> Self {
        self.lines.push(CardElement::Div {
            fields: vec![CardField {
                is_short: true,
                text: MarkdownText::new(format!("**{}:** {}", label, value)),
            }],
        });
        self
    }

    pub fn build(self, footer: &str) -> LarkMessage {
        let mut elements = self.lines;
        elements.push(CardElement::Hr);
        elements.push(CardElement::Note {
            elements: vec![MarkdownText::new(footer)],
        });

        LarkMessage {
            msg_type: "interactive",
            card: Card {
                config: CardConfig {
                    wide_screen_mode: true,
                },
                header: CardHeader {
                    template: HEADER_COLOR.to_string(),
                    title: PlainText {
                        tag: "plain_text",
                        content: self.title,
                    },
                },
                elements,
            },
        }
    }
}

// =============================================================================
// Renderer
// =============================================================================

/// Renders notification records as interactive cards
pub struct WebhookRenderer {
    category: String,
}

impl WebhookRenderer {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
        }
    }

    pub fn card(&self, record: &NotificationRecord) -> LarkMessage {
        let mut builder = CardBuilder::new(&self.category, &record.title)
            .line("Job Name", &record.job_name)
            .line("Status", &record.status)
            .line("Start Time", &record.start_time)
            .line("End Time", &record.end_time)
            .line("Duration", record.duration)
            .line("Link", &record.link);

        if let Some(restart) = record.restart {
            builder = builder.line("Restart", format!("{}/{}", restart.index, restart.total));
        }

        let footer = format!("Sent by **{}** | job id {}", self.category, record.entity_id);
        builder.build(&footer)
    }
}

impl ChannelRenderer for WebhookRenderer {
    type Payload = serde_json::Value;

    fn render(&self, record: &NotificationRecord) -> Result<serde_json::Value, RenderError> {
        Ok(serde_json::to_value(self.card(record))?)
    }
}

// =============================================================================
// Response Handling
// =============================================================================

/// Interprets a webhook answer, returning the HTTP status on success
///
/// Lark answers HTTP 200 even for rejected messages and reports the error
/// through `code`/`msg` (or `StatusCode`/`StatusMessage`) in the body.
pub fn check_response(response: &WebhookResponse) -> Result<u16, ChannelSendError> {
    if !(200..300).contains(&response.status) {
        return Err(ChannelSendError::Status {
            status: response.status,
            body: response.body.clone(),
        });
    }

    let body: serde_json::Value = match serde_json::from_str(&response.body) {
        Ok(v) => v,
        Err(_) => return Ok(response.status),
    };

    let code = body
        .get("code")
        .or_else(|| body.get("StatusCode"))
        .and_then(|c| c.as_i64())
        .unwrap_or(0);

    if code != 0 {
        let message = body
            .get("msg")
            .or_else(|| body.get("StatusMessage"))
            .and_then(|m| m.as_str())
            .unwrap_or_default()
            .to_string();
        return Err(ChannelSendError::Rejected { code, message });
    }

    Ok(response.status)
}
