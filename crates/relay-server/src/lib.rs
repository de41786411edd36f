//! HTTP surface of the alert relay.
//!
//! Receives Alertmanager webhook notifications on `POST /{platform}`,
//! updates per-fingerprint state, renders each alert into the platform's
//! message format, and forwards it to the resolved robot webhook.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{AppConfig, StorageKind};
pub use error::{RelayError, RelayResult};
pub use routes::create_router;
pub use server::RelayServer;
pub use state::AppState;
