//! Error types for outbound delivery.

use relay_model::Platform;
use thiserror::Error;

/// Errors that can occur while resolving destinations or building the sender.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Neither the request nor the configuration carries a robot credential.
    #[error("no robot credential for {platform}: pass url/key or configure a default")]
    NoCredential {
        /// The platform the request targeted.
        platform: Platform,
    },

    /// An explicit destination URL did not parse.
    #[error("invalid destination url: {reason}")]
    InvalidUrl {
        /// Why the URL was rejected.
        reason: String,
    },

    /// The HTTP client could not be constructed.
    #[error("http client setup failed: {0}")]
    ClientSetup(#[from] reqwest::Error),
}

/// Result type for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;
