//! Embedded SQLite backend.
//!
//! One row per fingerprint. Timestamps are stored as RFC 3339 UTC text with
//! whole-second precision, so lexicographic comparison in SQL matches
//! chronological order. The firing upsert is a single
//! `INSERT ... ON CONFLICT ... RETURNING` statement, which makes the
//! increment-or-reset step atomic without an explicit transaction.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use parking_lot::Mutex;
use relay_model::{AlertRecord, AlertStatus};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::store::AlertStateStore;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS alert_records (
    fingerprint TEXT PRIMARY KEY,
    count       INTEGER NOT NULL CHECK (count >= 1),
    first_seen  TEXT NOT NULL,
    last_status TEXT NOT NULL CHECK (last_status IN ('firing', 'resolved')),
    resolved_at TEXT,
    send_status TEXT CHECK (send_status IN ('success', 'failed')),
    last_sent_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_alert_records_resolved
    ON alert_records (last_status, resolved_at);
";

const UPSERT_FIRING: &str = "
INSERT INTO alert_records (fingerprint, count, first_seen, last_status, resolved_at)
VALUES (?1, 1, ?2, 'firing', NULL)
ON CONFLICT (fingerprint) DO UPDATE SET
    count       = CASE WHEN last_status = 'resolved' THEN 1 ELSE count + 1 END,
    first_seen  = CASE WHEN last_status = 'resolved' THEN excluded.first_seen ELSE first_seen END,
    last_status = 'firing',
    resolved_at = NULL
RETURNING count, first_seen
";

/// Alert state in a local SQLite database.
pub struct SqliteStateStore {
    conn: Mutex<Connection>,
}

impl SqliteStateStore {
    /// Opens (or creates) the database at `path` and applies the schema.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self::init(conn)?;
        info!(path = %path.display(), "sqlite state store opened");
        Ok(store)
    }

    /// Opens an in-memory database. State is lost when the store drops.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        // DELETE journal mode keeps the database a single file, which also
        // works on network filesystems where WAL does not.
        conn.pragma_update(None, "journal_mode", "DELETE")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn fetch_record(conn: &Connection, fingerprint: &str) -> Result<Option<AlertRecord>> {
        let row = conn
            .query_row(
                "SELECT count, first_seen, last_status, resolved_at
                 FROM alert_records WHERE fingerprint = ?1",
                params![fingerprint],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(count, first_seen, last_status, resolved_at)| {
            Self::row_to_record(
                fingerprint,
                count,
                &first_seen,
                &last_status,
                resolved_at.as_deref(),
            )
        })
        .transpose()
    }

    fn row_to_record(
        fingerprint: &str,
        count: i64,
        first_seen: &str,
        last_status: &str,
        resolved_at: Option<&str>,
    ) -> Result<AlertRecord> {
        let last_status =
            AlertStatus::parse(last_status).map_err(|e| StoreError::CorruptRecord {
                fingerprint: fingerprint.to_string(),
                reason: e.to_string(),
            })?;
        let resolved_at = resolved_at
            .map(|s| parse_ts(fingerprint, s))
            .transpose()?;
        Ok(AlertRecord {
            fingerprint: fingerprint.to_string(),
            count,
            first_seen: parse_ts(fingerprint, first_seen)?,
            last_status,
            resolved_at,
        })
    }
}

fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_ts(fingerprint: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::CorruptRecord {
            fingerprint: fingerprint.to_string(),
            reason: format!("bad timestamp {raw:?}: {e}"),
        })
}

#[async_trait]
impl AlertStateStore for SqliteStateStore {
    async fn get_record(&self, fingerprint: &str) -> Result<Option<AlertRecord>> {
        let conn = self.conn.lock();
        Self::fetch_record(&conn, fingerprint)
    }

    async fn upsert_firing(&self, fingerprint: &str, ts: DateTime<Utc>) -> Result<AlertRecord> {
        let conn = self.conn.lock();
        let (count, first_seen) = conn.query_row(
            UPSERT_FIRING,
            params![fingerprint, fmt_ts(ts)],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
        )?;
        debug!(fingerprint, count, "firing delivery recorded");

        Ok(AlertRecord {
            fingerprint: fingerprint.to_string(),
            count,
            first_seen: parse_ts(fingerprint, &first_seen)?,
            last_status: AlertStatus::Firing,
            resolved_at: None,
        })
    }

    async fn mark_resolved(
        &self,
        fingerprint: &str,
        ts: DateTime<Utc>,
    ) -> Result<Option<AlertRecord>> {
        let conn = self.conn.lock();
        // Single statement, so the returned row is exactly the row the
        // update produced and cannot interleave with a concurrent firing.
        let updated = conn
            .query_row(
                "UPDATE alert_records
                 SET last_status = 'resolved', resolved_at = ?2
                 WHERE fingerprint = ?1 AND last_status = 'firing'
                 RETURNING count, first_seen",
                params![fingerprint, fmt_ts(ts)],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        if let Some((count, first_seen)) = updated {
            debug!(fingerprint, "episode resolved");
            return Ok(Some(AlertRecord {
                fingerprint: fingerprint.to_string(),
                count,
                first_seen: parse_ts(fingerprint, &first_seen)?,
                last_status: AlertStatus::Resolved,
                resolved_at: Some(ts.trunc_subsecs(0)),
            }));
        }
        // No firing row matched: the fingerprint is unknown or already
        // resolved. Same lock, so this read cannot see an interleaved write.
        Self::fetch_record(&conn, fingerprint)
    }

    async fn record_send_outcome(
        &self,
        fingerprint: &str,
        delivered: bool,
        ts: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE alert_records SET send_status = ?2, last_sent_at = ?3
             WHERE fingerprint = ?1",
            params![
                fingerprint,
                if delivered { "success" } else { "failed" },
                fmt_ts(ts)
            ],
        )?;
        Ok(())
    }

    async fn delete_resolved_older_than(&self, cutoff: Option<DateTime<Utc>>) -> Result<u64> {
        let conn = self.conn.lock();
        let deleted = match cutoff {
            Some(cutoff) => conn.execute(
                "DELETE FROM alert_records
                 WHERE last_status = 'resolved' AND resolved_at < ?1",
                params![fmt_ts(cutoff)],
            )?,
            None => conn.execute(
                "DELETE FROM alert_records WHERE last_status = 'resolved'",
                [],
            )?,
        };
        Ok(deleted as u64)
    }

    fn supports_retention(&self) -> bool {
        true
    }
}
