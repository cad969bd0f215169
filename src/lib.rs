//! StreamX alert dispatcher
//!
//! Turns job state changes into throttled email and chat-webhook alerts.
//! This module exposes the components for embedding and testing.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
