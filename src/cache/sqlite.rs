//! SQLite durable cache tier.
//!
//! One table keyed by content hash, with secondary indexes on `created_at`
//! and `expires_at` to support range cleanup. Thread-safe via an internal
//! mutex on the connection; every operation is a single statement, so
//! last-writer-wins semantics hold without further locking.

use super::{CacheEntry, CacheError};
use crate::provider::AnalysisResult;
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

pub struct DurableTier {
    conn: Mutex<Connection>,
}

impl DurableTier {
    /// Open (or create) the durable store at `path`.
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory store; used when no path is configured and in tests.
    pub fn open_in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), CacheError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS analysis_cache (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                expires_at INTEGER NOT NULL,
                access_count INTEGER NOT NULL,
                last_accessed_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_cache_created_at
                ON analysis_cache(created_at);
            CREATE INDEX IF NOT EXISTS idx_cache_expires_at
                ON analysis_cache(expires_at);

            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    /// Write an entry, replacing any previous row for the key.
    pub fn set(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        let value = serde_json::to_string(&entry.value)?;
        let conn = self.conn.lock().expect("cache connection poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO analysis_cache
                 (key, value, created_at, expires_at, access_count, last_accessed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.key,
                value,
                entry.created_at.timestamp_millis(),
                entry.expires_at.timestamp_millis(),
                entry.access_count as i64,
                entry.last_accessed_at.timestamp_millis(),
            ],
        )?;
        Ok(())
    }

    /// Read a live entry, bumping its access counters.
    ///
    /// An expired row is deleted and reported as absent.
    pub fn get(&self, key: &str, now: DateTime<Utc>) -> Result<Option<CacheEntry>, CacheError> {
        let conn = self.conn.lock().expect("cache connection poisoned");
        let row = conn
            .query_row(
                "SELECT value, created_at, expires_at, access_count
                 FROM analysis_cache WHERE key = ?1",
                params![key],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((value, created_ms, expires_ms, access_count)) = row else {
            return Ok(None);
        };

        if expires_ms <= now.timestamp_millis() {
            conn.execute("DELETE FROM analysis_cache WHERE key = ?1", params![key])?;
            return Ok(None);
        }

        let access_count = (access_count as u64) + 1;
        conn.execute(
            "UPDATE analysis_cache SET access_count = ?2, last_accessed_at = ?3 WHERE key = ?1",
            params![key, access_count as i64, now.timestamp_millis()],
        )?;

        let value: AnalysisResult = serde_json::from_str(&value)?;
        Ok(Some(CacheEntry {
            key: key.to_string(),
            value,
            created_at: millis_to_datetime(created_ms)?,
            expires_at: millis_to_datetime(expires_ms)?,
            access_count,
            last_accessed_at: now,
        }))
    }

    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        let conn = self.conn.lock().expect("cache connection poisoned");
        conn.execute("DELETE FROM analysis_cache WHERE key = ?1", params![key])?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), CacheError> {
        let conn = self.conn.lock().expect("cache connection poisoned");
        conn.execute("DELETE FROM analysis_cache", [])?;
        Ok(())
    }

    /// Range-delete everything already expired; returns how many rows went.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, CacheError> {
        let conn = self.conn.lock().expect("cache connection poisoned");
        let removed = conn.execute(
            "DELETE FROM analysis_cache WHERE expires_at < ?1",
            params![now.timestamp_millis()],
        )?;
        Ok(removed)
    }

    /// Number of live (unexpired) rows.
    pub fn live_len(&self, now: DateTime<Utc>) -> Result<usize, CacheError> {
        let conn = self.conn.lock().expect("cache connection poisoned");
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM analysis_cache WHERE expires_at > ?1",
            params![now.timestamp_millis()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

fn millis_to_datetime(ms: i64) -> Result<DateTime<Utc>, CacheError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| CacheError::Corrupt(format!("timestamp out of range: {ms}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Complexity, ProviderId};
    use chrono::Duration;

    fn result(text: &str) -> AnalysisResult {
        AnalysisResult {
            explanation_text: text.to_string(),
            confidence: 0.8,
            source: ProviderId::BuiltIn,
            complexity: Complexity::Intermediate,
            sentiment: None,
            topics: vec!["Interest Rates".to_string()],
            entities: vec![],
            cached: false,
            processing_time_ms: 5,
        }
    }

    fn entry(key: &str, now: DateTime<Utc>, ttl_secs: i64) -> CacheEntry {
        CacheEntry {
            key: key.to_string(),
            value: result(key),
            created_at: now,
            expires_at: now + Duration::seconds(ttl_secs),
            access_count: 1,
            last_accessed_at: now,
        }
    }

    #[test]
    fn set_then_get_round_trips() {
        let tier = DurableTier::open_in_memory().unwrap();
        let now = Utc::now();
        tier.set(&entry("k1", now, 60)).unwrap();

        let loaded = tier.get("k1", now).unwrap().unwrap();
        assert_eq!(loaded.value, result("k1"));
        assert_eq!(loaded.access_count, 2);
    }

    #[test]
    fn expired_row_is_deleted_on_read() {
        let tier = DurableTier::open_in_memory().unwrap();
        let now = Utc::now();
        tier.set(&entry("k1", now - Duration::seconds(120), 60)).unwrap();

        assert!(tier.get("k1", now).unwrap().is_none());
        assert_eq!(tier.live_len(now).unwrap(), 0);
    }

    #[test]
    fn expired_rows_do_not_count_as_live() {
        let tier = DurableTier::open_in_memory().unwrap();
        let now = Utc::now();
        tier.set(&entry("live", now, 600)).unwrap();
        tier.set(&entry("dead", now - Duration::seconds(120), 60)).unwrap();

        assert_eq!(tier.live_len(now).unwrap(), 1);
        assert_eq!(tier.purge_expired(now).unwrap(), 1);
    }

    #[test]
    fn set_overwrites_existing_row() {
        let tier = DurableTier::open_in_memory().unwrap();
        let now = Utc::now();
        tier.set(&entry("k1", now, 60)).unwrap();
        let mut updated = entry("k1", now, 60);
        updated.value.explanation_text = "newer".to_string();
        tier.set(&updated).unwrap();

        let loaded = tier.get("k1", now).unwrap().unwrap();
        assert_eq!(loaded.value.explanation_text, "newer");
    }
}
