//! Daily retention sweep for resolved alert records.
//!
//! The cleaner runs once per day at a configured wall-clock time in a
//! configured IANA timezone. Scheduling is done in local time (not by
//! sleeping a fixed 24 hours), so the sweep stays at the same local hour
//! across DST transitions.

use std::sync::Arc;

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::store::AlertStateStore;

/// When and how much to prune.
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    /// Resolved records older than this many days are deleted. Zero means
    /// every resolved record is deleted on each sweep.
    pub days: u32,
    /// Local wall-clock time of the daily sweep.
    pub cleanup_time: NaiveTime,
    /// Timezone the wall-clock time is interpreted in.
    pub timezone: Tz,
}

impl RetentionPolicy {
    /// Builds a policy from configuration strings, e.g. `("7", "04:00",
    /// "Asia/Shanghai")`.
    pub fn new(days: u32, cleanup_time: &str, timezone: &str) -> Result<Self> {
        let cleanup_time = NaiveTime::parse_from_str(cleanup_time, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(cleanup_time, "%H:%M:%S"))
            .map_err(|_| StoreError::InvalidPolicy {
                reason: format!("cleanup time {cleanup_time:?} is not HH:MM"),
            })?;
        let timezone: Tz = timezone.parse().map_err(|_| StoreError::InvalidPolicy {
            reason: format!("unknown timezone {timezone:?}"),
        })?;
        Ok(Self {
            days,
            cleanup_time,
            timezone,
        })
    }

    /// The next sweep instant strictly after `now`.
    #[must_use]
    pub fn next_run_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.with_timezone(&self.timezone).date_naive();
        for offset in 0..=2 {
            if let Some(candidate) = self.resolve_local(today + Duration::days(offset)) {
                if candidate > now {
                    return candidate;
                }
            }
        }
        // Unreachable with a valid timezone; keeps the scheduler alive anyway.
        now + Duration::days(1)
    }

    /// The deletion cutoff for a sweep at `now`, or `None` when `days` is
    /// zero (delete all resolved records).
    #[must_use]
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        (self.days > 0).then(|| now - Duration::days(i64::from(self.days)))
    }

    fn resolve_local(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        let local = date.and_time(self.cleanup_time);
        let resolved = match self.timezone.from_local_datetime(&local) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt),
            // The wall-clock time fell in a DST gap; run an hour later.
            LocalResult::None => self
                .timezone
                .from_local_datetime(&(local + Duration::hours(1)))
                .earliest(),
        };
        resolved.map(|dt| dt.with_timezone(&Utc))
    }
}

/// Background task that applies a [`RetentionPolicy`] to a store.
pub struct RetentionCleaner;

impl RetentionCleaner {
    /// Spawns the daily sweep loop. The task exits when `shutdown` changes.
    pub fn spawn(
        store: Arc<dyn AlertStateStore>,
        policy: RetentionPolicy,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let now = Utc::now();
                let next = policy.next_run_after(now);
                let wait = (next - now).to_std().unwrap_or_default();
                info!(next_run = %next, days = policy.days, "retention sweep scheduled");

                tokio::select! {
                    () = tokio::time::sleep(wait) => {
                        let cutoff = policy.cutoff(Utc::now());
                        match store.delete_resolved_older_than(cutoff).await {
                            Ok(deleted) => info!(deleted, "retention sweep complete"),
                            // A failed sweep keeps its next daily slot.
                            Err(err) => warn!(error = %err, "retention sweep failed"),
                        }
                    }
                    _ = shutdown.changed() => {
                        debug!("retention cleaner stopping");
                        return;
                    }
                }
            }
        })
    }
}
