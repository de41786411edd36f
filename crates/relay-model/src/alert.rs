//! Alertmanager webhook wire types.
//!
//! Field names follow the Alertmanager v4 webhook JSON (camelCase). Only the
//! fields the relay acts on are modelled strictly; envelope metadata is kept
//! optional so payloads from older Alertmanager versions still parse.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// The delivery status of an alert inside a webhook payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// The alert condition currently holds.
    Firing,
    /// The alert condition has cleared.
    Resolved,
}

impl AlertStatus {
    /// Returns the status as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Firing => "firing",
            Self::Resolved => "resolved",
        }
    }

    /// Parses a status string as it appears on the wire.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "firing" => Ok(Self::Firing),
            "resolved" => Ok(Self::Resolved),
            other => Err(ModelError::InvalidStatus {
                value: other.to_string(),
            }),
        }
    }

    /// Returns true if the alert is still firing.
    #[must_use]
    pub const fn is_firing(&self) -> bool {
        matches!(self, Self::Firing)
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single alert inside an Alertmanager webhook payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Stable identity of the alert's label set.
    pub fingerprint: String,
    /// Whether the alert is firing or resolved.
    pub status: AlertStatus,
    /// Identifying labels (`alertname`, `instance`, `severity`, ...).
    #[serde(default)]
    pub labels: HashMap<String, String>,
    /// Descriptive annotations (`summary`, `description`, ...).
    #[serde(default)]
    pub annotations: HashMap<String, String>,
    /// When the alert started firing.
    pub starts_at: DateTime<Utc>,
    /// When the alert ended. Alertmanager sends the zero time while firing.
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    /// Link back to the originating rule, if any.
    #[serde(default, rename = "generatorURL")]
    pub generator_url: Option<String>,
}

impl Alert {
    /// Returns the `alertname` label, if present.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.labels.get("alertname").map(String::as_str)
    }

    /// Returns `ends_at` with Alertmanager's zero-time placeholder
    /// (`0001-01-01T00:00:00Z`) treated as absent.
    #[must_use]
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.ends_at.filter(|ts| ts.year() > 1)
    }
}

/// The Alertmanager webhook envelope: a batch of alerts plus group metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEnvelope {
    /// The alerts in this notification, in Alertmanager order.
    pub alerts: Vec<Alert>,
    /// Webhook payload version (currently "4").
    #[serde(default)]
    pub version: Option<String>,
    /// Key identifying the alert group.
    #[serde(default)]
    pub group_key: Option<String>,
    /// Aggregate status of the group.
    #[serde(default)]
    pub status: Option<AlertStatus>,
    /// Name of the receiver that matched.
    #[serde(default)]
    pub receiver: Option<String>,
    /// Labels common to the whole group.
    #[serde(default)]
    pub group_labels: HashMap<String, String>,
    /// Labels common to all alerts in the payload.
    #[serde(default)]
    pub common_labels: HashMap<String, String>,
    /// Annotations common to all alerts in the payload.
    #[serde(default)]
    pub common_annotations: HashMap<String, String>,
    /// Address of the sending Alertmanager.
    #[serde(default, rename = "externalURL")]
    pub external_url: Option<String>,
}

impl WebhookEnvelope {
    /// Number of firing alerts in the payload.
    #[must_use]
    pub fn firing_count(&self) -> usize {
        self.alerts.iter().filter(|a| a.status.is_firing()).count()
    }

    /// Number of resolved alerts in the payload.
    #[must_use]
    pub fn resolved_count(&self) -> usize {
        self.alerts.len() - self.firing_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload() -> &'static str {
        r#"{
            "version": "4",
            "groupKey": "{}:{alertname=\"HighCpu\"}",
            "status": "firing",
            "receiver": "relay",
            "groupLabels": {"alertname": "HighCpu"},
            "commonLabels": {"alertname": "HighCpu", "severity": "critical"},
            "commonAnnotations": {"summary": "CPU above 90%"},
            "externalURL": "http://alertmanager:9093",
            "alerts": [
                {
                    "status": "firing",
                    "labels": {"alertname": "HighCpu", "instance": "node-1:9100", "severity": "critical"},
                    "annotations": {"summary": "CPU above 90%", "description": "cpu busy"},
                    "startsAt": "2024-05-01T09:30:00Z",
                    "endsAt": "0001-01-01T00:00:00Z",
                    "generatorURL": "http://prometheus/graph",
                    "fingerprint": "02f13394997e5211"
                },
                {
                    "status": "resolved",
                    "labels": {"alertname": "HighCpu", "instance": "node-2:9100"},
                    "annotations": {},
                    "startsAt": "2024-05-01T08:00:00Z",
                    "endsAt": "2024-05-01T09:00:00Z",
                    "fingerprint": "7bd1b3e544c1a7f0"
                }
            ]
        }"#
    }

    #[test]
    fn status_as_str() {
        assert_eq!(AlertStatus::Firing.as_str(), "firing");
        assert_eq!(AlertStatus::Resolved.as_str(), "resolved");
    }

    #[test]
    fn status_parse() {
        assert_eq!(AlertStatus::parse("firing").unwrap(), AlertStatus::Firing);
        assert_eq!(
            AlertStatus::parse("resolved").unwrap(),
            AlertStatus::Resolved
        );
        assert!(matches!(
            AlertStatus::parse("pending"),
            Err(ModelError::InvalidStatus { .. })
        ));
    }

    #[test]
    fn envelope_parses_full_payload() {
        let envelope: WebhookEnvelope = serde_json::from_str(sample_payload()).unwrap();

        assert_eq!(envelope.version.as_deref(), Some("4"));
        assert_eq!(envelope.receiver.as_deref(), Some("relay"));
        assert_eq!(envelope.alerts.len(), 2);
        assert_eq!(envelope.firing_count(), 1);
        assert_eq!(envelope.resolved_count(), 1);

        let firing = &envelope.alerts[0];
        assert_eq!(firing.fingerprint, "02f13394997e5211");
        assert_eq!(firing.name(), Some("HighCpu"));
        assert_eq!(
            firing.generator_url.as_deref(),
            Some("http://prometheus/graph")
        );
    }

    #[test]
    fn envelope_parses_minimal_payload() {
        let envelope: WebhookEnvelope = serde_json::from_str(
            r#"{"alerts": [{"status": "firing", "startsAt": "2024-05-01T09:30:00Z", "fingerprint": "ab"}]}"#,
        )
        .unwrap();

        assert_eq!(envelope.alerts.len(), 1);
        assert!(envelope.version.is_none());
        assert!(envelope.alerts[0].labels.is_empty());
        assert!(envelope.alerts[0].ends_at.is_none());
    }

    #[test]
    fn zero_ends_at_is_absent() {
        let envelope: WebhookEnvelope = serde_json::from_str(sample_payload()).unwrap();

        let firing = &envelope.alerts[0];
        assert!(firing.ends_at.is_some());
        assert!(firing.end_time().is_none());

        let resolved = &envelope.alerts[1];
        assert!(resolved.end_time().is_some());
    }

    #[test]
    fn envelope_rejects_missing_alerts() {
        let result: serde_json::Result<WebhookEnvelope> =
            serde_json::from_str(r#"{"version": "4"}"#);
        assert!(result.is_err());
    }
}
