//! The storage capability interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use relay_model::AlertRecord;

use crate::error::Result;

/// Per-fingerprint alert state, independent of the backing store.
///
/// Implementations must keep the episode invariants: `upsert_firing`
/// increments the count by exactly one per call within an episode and resets
/// to a fresh single-count record when the prior episode had resolved, and
/// `mark_resolved` flips a firing episode exactly once (re-resolving is a
/// no-op).
#[async_trait]
pub trait AlertStateStore: Send + Sync {
    /// Fetches the record for a fingerprint, if one exists.
    async fn get_record(&self, fingerprint: &str) -> Result<Option<AlertRecord>>;

    /// Registers a firing delivery and returns the record after the update.
    ///
    /// Creates a single-count record when the fingerprint is unknown or its
    /// previous episode resolved; otherwise increments the count. The update
    /// is atomic with respect to concurrent calls for the same fingerprint.
    async fn upsert_firing(&self, fingerprint: &str, ts: DateTime<Utc>) -> Result<AlertRecord>;

    /// Marks a firing episode resolved at `ts`.
    ///
    /// Returns the stored record, or `None` when the fingerprint is unknown.
    /// Calling this on an already-resolved record changes nothing.
    async fn mark_resolved(
        &self,
        fingerprint: &str,
        ts: DateTime<Utc>,
    ) -> Result<Option<AlertRecord>>;

    /// Deletes resolved records older than `cutoff`, or every resolved
    /// record when `cutoff` is `None`. Returns the number deleted.
    ///
    /// Backends without retention sweeps return 0.
    async fn delete_resolved_older_than(&self, cutoff: Option<DateTime<Utc>>) -> Result<u64>;

    /// Records the outcome of the latest delivery attempt for audit.
    ///
    /// Backends without send history keep this a no-op.
    async fn record_send_outcome(
        &self,
        _fingerprint: &str,
        _delivered: bool,
        _ts: DateTime<Utc>,
    ) -> Result<()> {
        Ok(())
    }

    /// Whether this backend prunes via [`Self::delete_resolved_older_than`].
    fn supports_retention(&self) -> bool {
        false
    }
}
