//! Common test utilities and helpers
//!
//! This module provides shared functionality for all tests.

#![allow(dead_code)]

pub mod fixtures;

pub use fixtures::{at_millis, EventBuilder, BASE_MILLIS};
pub use mocks::{
    FailingEmailRenderer, FailingRenderer, RecordingMailer, RecordingWebhook, SlowMailer,
};
