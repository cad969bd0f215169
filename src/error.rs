/// Failures while turning a notification record into a channel payload
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Template rendering failed: {0}")]
    Template(String),

    #[error("Failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<minijinja::Error> for RenderError {
    fn from(e: minijinja::Error) -> Self {
        RenderError::Template(e.to_string())
    }
}

/// Transport-level delivery failures
#[derive(Debug, thiserror::Error)]
pub enum ChannelSendError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed")]
    Connect,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Rejected by receiver (code {code}): {message}")]
    Rejected { code: i64, message: String },

    #[error("SMTP error: {0}")]
    Smtp(String),

    #[error("Request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for ChannelSendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ChannelSendError::Timeout
        } else if e.is_connect() {
            ChannelSendError::Connect
        } else {
            ChannelSendError::Request(e.to_string())
        }
    }
}

/// Alert dispatch errors
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("Malformed event for entity {entity_id}: {reason}")]
    MalformedEvent { entity_id: i64, reason: String },

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Channel send error: {0}")]
    ChannelSend(#[from] ChannelSendError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AlertError {
    pub fn malformed(entity_id: i64, reason: impl Into<String>) -> Self {
        AlertError::MalformedEvent {
            entity_id,
            reason: reason.into(),
        }
    }
}

/// Result type alias for dispatch operations
pub type AppResult<T> = Result<T, AlertError>;
