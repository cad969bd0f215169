pub mod context;
pub mod dispatcher;
pub mod notification;
pub mod throttle;

pub use context::AlertContextBuilder;
pub use dispatcher::{AlertDispatcher, AlertDispatcherBuilder};
pub use notification::{
    ChannelRenderer, EmailMessage, EmailRenderer, HttpWebhookClient, MailTransport, SmtpMailer,
    WebhookRenderer, WebhookResponse, WebhookTransport,
};
pub use throttle::{InMemoryThrottleStore, ThrottleStore};
