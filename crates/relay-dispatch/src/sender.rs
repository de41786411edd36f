//! Single-attempt message delivery.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::Result;
use crate::resolver::Destination;

/// Hard ceiling on one delivery attempt. Alertmanager re-notifies on its own
/// schedule, so the relay never retries or queues.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// How much of a rejection body to keep for logs and responses.
const BODY_SNIPPET_LEN: usize = 256;

/// The result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The destination answered 2xx.
    Delivered {
        /// The HTTP status code.
        status: u16,
    },
    /// The destination answered outside 2xx.
    Rejected {
        /// The HTTP status code.
        status: u16,
        /// Leading snippet of the response body.
        body: String,
    },
    /// The request never completed (connect failure, timeout, ...).
    Transport {
        /// Description of the failure.
        reason: String,
    },
}

impl SendOutcome {
    /// Returns true if the message was delivered.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// Posts rendered messages to robot webhooks.
#[derive(Debug, Clone)]
pub struct RobotSender {
    client: reqwest::Client,
}

impl RobotSender {
    /// Builds the sender with its shared HTTP client.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().timeout(SEND_TIMEOUT).build()?;
        Ok(Self { client })
    }

    /// Posts `body` to the destination, once. Failures are reported, never
    /// retried.
    pub async fn send(&self, destination: &Destination, body: &serde_json::Value) -> SendOutcome {
        let response = match self
            .client
            .post(destination.url())
            .json(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(destination = %destination, error = %err, "delivery failed in transport");
                return SendOutcome::Transport {
                    reason: err.to_string(),
                };
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!(destination = %destination, status = status.as_u16(), "message delivered");
            return SendOutcome::Delivered {
                status: status.as_u16(),
            };
        }

        let body = response.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(BODY_SNIPPET_LEN).collect();
        warn!(
            destination = %destination,
            status = status.as_u16(),
            body = %snippet,
            "destination rejected message"
        );
        SendOutcome::Rejected {
            status: status.as_u16(),
            body: snippet,
        }
    }
}
