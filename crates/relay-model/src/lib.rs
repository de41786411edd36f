//! Shared data model for the alert relay.
//!
//! This crate provides the types that flow between the webhook receiver, the
//! state store, the message transformer, and the sender:
//! - [`WebhookEnvelope`] / [`Alert`]: the Alertmanager webhook wire format
//! - [`AlertRecord`]: the per-fingerprint state tracked across deliveries
//! - [`Platform`]: the supported chat-robot platforms and their URL rules

#![forbid(unsafe_code)]

mod alert;
mod error;
mod platform;
mod record;

pub use alert::{Alert, AlertStatus, WebhookEnvelope};
pub use error::{ModelError, Result};
pub use platform::Platform;
pub use record::AlertRecord;
