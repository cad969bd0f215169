//! Unit tests module
//!
//! Contains tests for individual components in isolation.

#[path = "../common/mod.rs"]
mod common;

mod context_test;
mod email_template_test;
