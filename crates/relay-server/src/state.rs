//! Shared application state.

use std::collections::HashMap;
use std::sync::Arc;

use relay_dispatch::{PlatformCredentials, RobotSender};
use relay_model::Platform;
use relay_render::Transformer;
use relay_store::AlertStateStore;

use crate::config::AppConfig;

/// Everything the request handlers need, shared behind an `Arc`.
pub struct AppState {
    store: Arc<dyn AlertStateStore>,
    transformer: Transformer,
    sender: RobotSender,
    credentials: HashMap<Platform, PlatformCredentials>,
}

impl AppState {
    /// Assembles the state with per-platform credentials taken from `config`.
    #[must_use]
    pub fn new(
        store: Arc<dyn AlertStateStore>,
        transformer: Transformer,
        sender: RobotSender,
        config: &AppConfig,
    ) -> Self {
        let credentials = Platform::ALL
            .iter()
            .map(|&platform| (platform, config.credentials(platform)))
            .collect();
        Self {
            store,
            transformer,
            sender,
            credentials,
        }
    }

    /// The alert state store.
    #[must_use]
    pub fn store(&self) -> &dyn AlertStateStore {
        self.store.as_ref()
    }

    /// The message transformer.
    #[must_use]
    pub const fn transformer(&self) -> &Transformer {
        &self.transformer
    }

    /// The outbound sender.
    #[must_use]
    pub const fn sender(&self) -> &RobotSender {
        &self.sender
    }

    /// Configured fallback credentials for `platform`.
    #[must_use]
    pub fn credentials(&self, platform: Platform) -> PlatformCredentials {
        self.credentials.get(&platform).cloned().unwrap_or_default()
    }
}
