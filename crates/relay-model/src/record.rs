//! Per-fingerprint alert state tracked across webhook deliveries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alert::AlertStatus;

/// The state stored for one alert fingerprint.
///
/// A record describes the current *episode* of an alert: the window from the
/// first firing delivery until it resolves. A firing delivery after a resolve
/// starts a fresh episode with the count reset to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    /// The fingerprint this record belongs to.
    pub fingerprint: String,
    /// How many firing deliveries this episode has seen (>= 1).
    pub count: i64,
    /// When the current episode first fired.
    pub first_seen: DateTime<Utc>,
    /// Last observed status.
    pub last_status: AlertStatus,
    /// When the episode resolved, if it has.
    pub resolved_at: Option<DateTime<Utc>>,
}

impl AlertRecord {
    /// A fresh record for the first firing delivery of an episode.
    #[must_use]
    pub fn new_firing(fingerprint: impl Into<String>, ts: DateTime<Utc>) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            count: 1,
            first_seen: ts,
            last_status: AlertStatus::Firing,
            resolved_at: None,
        }
    }

    /// A synthesised record for a resolve whose fingerprint was never stored
    /// (e.g. the relay restarted with a fresh store mid-episode).
    #[must_use]
    pub fn synthetic_resolved(
        fingerprint: impl Into<String>,
        started: DateTime<Utc>,
        resolved: DateTime<Utc>,
    ) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            count: 1,
            first_seen: started,
            last_status: AlertStatus::Resolved,
            resolved_at: Some(resolved),
        }
    }

    /// Returns true if the episode has resolved.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self.last_status, AlertStatus::Resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn new_firing_starts_at_one() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let record = AlertRecord::new_firing("02f13394997e5211", ts);

        assert_eq!(record.count, 1);
        assert_eq!(record.first_seen, ts);
        assert_eq!(record.last_status, AlertStatus::Firing);
        assert!(record.resolved_at.is_none());
        assert!(!record.is_resolved());
    }

    #[test]
    fn synthetic_resolved_is_resolved() {
        let started = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let resolved = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let record = AlertRecord::synthetic_resolved("ab", started, resolved);

        assert_eq!(record.count, 1);
        assert!(record.is_resolved());
        assert_eq!(record.resolved_at, Some(resolved));
    }
}
