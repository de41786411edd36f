//! Destination resolution.
//!
//! A request may carry its robot credential three ways in the query string,
//! and the relay may carry a configured fallback. The chain is strict:
//!
//! 1. `url`: a complete webhook URL, used verbatim
//! 2. `baseUrl` + `key`: joined per the platform's convention
//! 3. `key`: joined onto the configured (or default) platform base URL
//! 4. configured key + configured (or default) base URL
//!
//! If no tier matches, the request is a client error: the relay never sends
//! anywhere it was not told to.

use std::fmt;

use relay_model::Platform;
use serde::Deserialize;
use url::Url;

use crate::error::{DispatchError, Result};

/// Credential-bearing query parameters of a webhook request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendParams {
    /// Complete destination URL (tier 1).
    #[serde(default)]
    pub url: Option<String>,
    /// Base URL to combine with `key` (tier 2).
    #[serde(default)]
    pub base_url: Option<String>,
    /// Robot credential (tiers 2 and 3).
    #[serde(default)]
    pub key: Option<String>,
}

/// Credentials configured for one platform.
#[derive(Debug, Clone, Default)]
pub struct PlatformCredentials {
    /// Configured robot key (tier 4).
    pub key: Option<String>,
    /// Configured base URL, overriding the platform default origin.
    pub base_url: Option<String>,
}

/// Which tier of the priority chain produced a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialTier {
    /// Tier 1: complete URL from the request.
    RequestUrl,
    /// Tier 2: base URL and key from the request.
    RequestBaseAndKey,
    /// Tier 3: key from the request, base from config or default.
    RequestKey,
    /// Tier 4: everything from configuration.
    Configured,
}

impl CredentialTier {
    /// Returns the tier as a string for logging.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RequestUrl => "request-url",
            Self::RequestBaseAndKey => "request-base-and-key",
            Self::RequestKey => "request-key",
            Self::Configured => "configured",
        }
    }
}

impl fmt::Display for CredentialTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resolved webhook destination.
///
/// `Display` redacts the query string, so the credential does not leak into
/// logs; use [`Destination::url`] for the actual request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    url: String,
    tier: CredentialTier,
}

impl Destination {
    /// The full destination URL, credential included.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Which tier of the priority chain produced this destination.
    #[must_use]
    pub const fn tier(&self) -> CredentialTier {
        self.tier
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Url::parse(&self.url) {
            Ok(mut url) => {
                if url.query().is_some() {
                    url.set_query(Some("<redacted>"));
                }
                write!(f, "{url}")
            }
            Err(_) => write!(f, "<unparseable destination>"),
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

/// Resolves the destination for a request, per the priority chain.
pub fn resolve(
    platform: Platform,
    params: &SendParams,
    configured: &PlatformCredentials,
) -> Result<Destination> {
    let url = non_empty(params.url.as_ref());
    let base_url = non_empty(params.base_url.as_ref());
    let key = non_empty(params.key.as_ref());

    if let Some(url) = url {
        Url::parse(url).map_err(|e| DispatchError::InvalidUrl {
            reason: e.to_string(),
        })?;
        return Ok(Destination {
            url: url.to_string(),
            tier: CredentialTier::RequestUrl,
        });
    }

    if let (Some(base), Some(key)) = (base_url, key) {
        return Ok(Destination {
            url: platform.join_key(base, key),
            tier: CredentialTier::RequestBaseAndKey,
        });
    }

    let configured_base = non_empty(configured.base_url.as_ref());

    if let Some(key) = key {
        let base = configured_base.unwrap_or_else(|| platform.default_origin());
        return Ok(Destination {
            url: platform.join_key(base, key),
            tier: CredentialTier::RequestKey,
        });
    }

    if let Some(key) = non_empty(configured.key.as_ref()) {
        let base = configured_base.unwrap_or_else(|| platform.default_origin());
        return Ok(Destination {
            url: platform.join_key(base, key),
            tier: CredentialTier::Configured,
        });
    }

    Err(DispatchError::NoCredential { platform })
}
