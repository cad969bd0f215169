pub mod alert;
pub mod event;
pub mod notification;

pub use alert::{
    ChannelOutcome, ChannelType, DeliveryStatus, DispatchReport, DispatchStatus, SenderConfig,
    ThrottleUpdate,
};
pub use event::{split_addresses, AppState, CheckpointStatus, ExecutionMode, StateChangeEvent};
pub use notification::{
    rich_minutes, AlertDuration, AlertKind, CheckpointInfo, DurationUnit, NotificationRecord,
    RestartInfo,
};
