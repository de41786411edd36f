//! Remote Redis backend.
//!
//! Each fingerprint maps to a hash at `alert-relay:alert:{fingerprint}` with
//! fields `count`, `first_seen`, `last_status`, `resolved_at`. The firing
//! upsert runs as a Lua script so the increment-or-reset decision is atomic
//! even with several relay replicas sharing the keyspace.
//!
//! Redis does not take part in retention sweeps; instead every key carries a
//! TTL that is refreshed on each firing delivery, so the keyspace stays
//! bounded without a sweeper.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use relay_model::{AlertRecord, AlertStatus};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::store::AlertStateStore;

const KEY_PREFIX: &str = "alert-relay:alert:";

/// Keys expire a week after the last firing delivery, so episodes that never
/// resolve (or whose resolve notification was lost) do not accumulate.
const FIRING_TTL_SECS: u64 = 7 * 24 * 60 * 60;

const UPSERT_SCRIPT: &str = r"
local status = redis.call('HGET', KEYS[1], 'last_status')
if status == false or status == 'resolved' then
    redis.call('DEL', KEYS[1])
    redis.call('HSET', KEYS[1], 'count', 1, 'first_seen', ARGV[1], 'last_status', 'firing')
else
    redis.call('HINCRBY', KEYS[1], 'count', 1)
end
redis.call('EXPIRE', KEYS[1], ARGV[2])
return {redis.call('HGET', KEYS[1], 'count'), redis.call('HGET', KEYS[1], 'first_seen')}
";

const RESOLVE_SCRIPT: &str = r"
local status = redis.call('HGET', KEYS[1], 'last_status')
if status == false then
    return nil
end
if status == 'firing' then
    redis.call('HSET', KEYS[1], 'last_status', 'resolved', 'resolved_at', ARGV[1])
end
return {redis.call('HGET', KEYS[1], 'count'),
        redis.call('HGET', KEYS[1], 'first_seen'),
        redis.call('HGET', KEYS[1], 'last_status'),
        redis.call('HGET', KEYS[1], 'resolved_at')}
";

/// Alert state in a shared Redis keyspace.
pub struct RedisStateStore {
    conn: ConnectionManager,
    upsert: Script,
    resolve: Script,
}

impl RedisStateStore {
    /// Connects to Redis at `url` (e.g. `redis://:pass@host:6379/0`) and
    /// verifies the server is reachable.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let mut conn = ConnectionManager::new(client).await?;
        redis::cmd("PING").query_async::<()>(&mut conn).await?;
        info!("redis state store connected");
        Ok(Self {
            conn,
            upsert: Script::new(UPSERT_SCRIPT),
            resolve: Script::new(RESOLVE_SCRIPT),
        })
    }

    fn key(fingerprint: &str) -> String {
        format!("{KEY_PREFIX}{fingerprint}")
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

fn parse_record(fingerprint: &str, fields: &HashMap<String, String>) -> Result<AlertRecord> {
    let corrupt = |reason: String| StoreError::CorruptRecord {
        fingerprint: fingerprint.to_string(),
        reason,
    };

    let count = fields
        .get("count")
        .ok_or_else(|| corrupt("missing count".to_string()))?
        .parse::<i64>()
        .map_err(|e| corrupt(format!("bad count: {e}")))?;
    let first_seen = fields
        .get("first_seen")
        .ok_or_else(|| corrupt("missing first_seen".to_string()))?;
    let last_status = fields
        .get("last_status")
        .ok_or_else(|| corrupt("missing last_status".to_string()))?;
    let last_status = AlertStatus::parse(last_status).map_err(|e| corrupt(e.to_string()))?;
    let resolved_at = fields
        .get("resolved_at")
        .filter(|s| !s.is_empty())
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

#[async_trait]
impl AlertStateStore for RedisStateStore {
    async fn get_record(&self, fingerprint: &str) -> Result<Option<AlertRecord>> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> = conn.hgetall(Self::key(fingerprint)).await?;
        if fields.is_empty() {
            return Ok(None);
        }
        parse_record(fingerprint, &fields).map(Some)
    }

    async fn upsert_firing(&self, fingerprint: &str, ts: DateTime<Utc>) -> Result<AlertRecord> {
        let mut conn = self.conn.clone();
        let (count, first_seen): (i64, String) = self
            .upsert
            .key(Self::key(fingerprint))
            .arg(fmt_ts(ts))
            .arg(FIRING_TTL_SECS)
            .invoke_async(&mut conn)
            .await?;
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
        // The status check and the writes run inside one script, so a firing
        // that lands concurrently cannot end up marked resolved.
        let mut conn = self.conn.clone();
        let reply: Option<(i64, String, String, Option<String>)> = self
            .resolve
            .key(Self::key(fingerprint))
            .arg(fmt_ts(ts))
            .invoke_async(&mut conn)
            .await?;
        let Some((count, first_seen, last_status, resolved_at)) = reply else {
            return Ok(None);
        };
        debug!(fingerprint, "resolve recorded");

        let corrupt = |reason: String| StoreError::CorruptRecord {
            fingerprint: fingerprint.to_string(),
            reason,
        };
        Ok(Some(AlertRecord {
            fingerprint: fingerprint.to_string(),
            count,
            first_seen: parse_ts(fingerprint, &first_seen)?,
            last_status: AlertStatus::parse(&last_status).map_err(|e| corrupt(e.to_string()))?,
            resolved_at: resolved_at
                .filter(|s| !s.is_empty())
                .map(|s| parse_ts(fingerprint, &s))
                .transpose()?,
        }))
    }

    async fn delete_resolved_older_than(&self, _cutoff: Option<DateTime<Utc>>) -> Result<u64> {
        // Redis keys age out via TTL instead.
        debug!("retention sweep skipped: redis backend prunes via key TTL");
        Ok(0)
    }
}
