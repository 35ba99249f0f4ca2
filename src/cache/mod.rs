//! Two-tier analysis result cache.
//!
//! The read path checks the memory tier, then the durable store, then
//! reports a miss. Durable hits are promoted back into the memory tier.
//! Storage failures never propagate; they are logged and degrade to a miss.

mod error;
mod memory;
mod sqlite;

pub use error::CacheError;
pub use memory::MemoryTier;
pub use sqlite::DurableTier;

use crate::config::CacheConfig;
use crate::provider::{AnalysisLevel, AnalysisResult};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// One cached analysis result with its bookkeeping fields.
///
/// Invariant: `expires_at > created_at`. An entry read after `expires_at`
/// is treated as absent and removed.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub value: AnalysisResult,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub access_count: u64,
    pub last_accessed_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Build a fresh entry expiring `ttl` from `now`. A zero TTL is clamped
    /// to one second to preserve the `expires_at > created_at` invariant.
    pub fn new(key: String, value: AnalysisResult, ttl: Duration, now: DateTime<Utc>) -> Self {
        let ttl = ChronoDuration::from_std(ttl.max(Duration::from_secs(1)))
            .unwrap_or_else(|_| ChronoDuration::seconds(1));
        Self {
            key,
            value,
            created_at: now,
            expires_at: now + ttl,
            access_count: 1,
            last_accessed_at: now,
        }
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Stable cache key: SHA-256 of the normalized text plus the analysis level.
pub fn cache_key(text: &str, level: AnalysisLevel) -> String {
    let normalized = normalize(text);
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hasher.update(b"\n");
    hasher.update(level.as_str().as_bytes());
    let digest = hasher.finalize();

    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Lowercase and collapse whitespace so trivially reformatted selections
/// share a key.
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Observable cache state.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub memory_size: usize,
    pub persistent_size: usize,
    /// Reuse intensity derived from per-entry access counts, not a global
    /// hit/miss counter: `(total accesses - live entries) / total accesses`.
    pub hit_rate: f64,
}

/// The two-tier cache owned by the analysis host.
pub struct AnalysisCache {
    memory: MemoryTier,
    durable: DurableTier,
}

impl AnalysisCache {
    /// Build both tiers from configuration. With no `db_path` the durable
    /// tier lives in memory, which still exercises the full read path.
    pub fn new(config: &CacheConfig) -> Result<Self, CacheError> {
        let durable = match &config.db_path {
            Some(path) => DurableTier::open(path)?,
            None => DurableTier::open_in_memory()?,
        };
        Ok(Self {
            memory: MemoryTier::new(config.memory_capacity),
            durable,
        })
    }

    /// Look up a result. Never errors: durable-tier failures are logged and
    /// treated as a miss.
    pub fn get(&self, key: &str) -> Option<AnalysisResult> {
        let now = Utc::now();
        if let Some(value) = self.memory.get(key, now) {
            return Some(value);
        }

        match self.durable.get(key, now) {
            Ok(Some(entry)) => {
                let value = entry.value.clone();
                self.memory.insert(entry);
                Some(value)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "durable cache read failed, treating as miss");
                None
            }
        }
    }

    /// Store a result in both tiers.
    pub fn set(&self, key: &str, value: AnalysisResult, ttl: Duration) {
        let entry = CacheEntry::new(key.to_string(), value, ttl, Utc::now());
        if let Err(e) = self.durable.set(&entry) {
            tracing::warn!(key = %key, error = %e, "durable cache write failed");
        }
        self.memory.insert(entry);
    }

    pub fn delete(&self, key: &str) {
        self.memory.delete(key);
        if let Err(e) = self.durable.delete(key) {
            tracing::warn!(key = %key, error = %e, "durable cache delete failed");
        }
    }

    pub fn clear(&self) {
        self.memory.clear();
        if let Err(e) = self.durable.clear() {
            tracing::warn!(error = %e, "durable cache clear failed");
        }
    }

    /// Current sizes and reuse intensity.
    pub fn stats(&self) -> CacheStats {
        let now = Utc::now();
        let (entries, accesses) = self.memory.access_totals();
        let hit_rate = if accesses == 0 {
            0.0
        } else {
            (accesses - entries as u64) as f64 / accesses as f64
        };
        let persistent_size = match self.durable.live_len(now) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, "durable cache size query failed");
                0
            }
        };
        CacheStats {
            memory_size: self.memory.len(),
            persistent_size,
            hit_rate,
        }
    }

    /// Drop expired entries from both tiers once.
    pub fn sweep(&self) {
        let now = Utc::now();
        let from_memory = self.memory.purge_expired(now);
        let from_durable = match self.durable.purge_expired(now) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, "durable cache sweep failed");
                0
            }
        };
        if from_memory + from_durable > 0 {
            tracing::debug!(
                memory = from_memory,
                durable = from_durable,
                "swept expired cache entries"
            );
        }
    }

    /// Periodic cleanup loop; runs until `cancel` fires.
    pub async fn run_sweeper(&self, period: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick completes immediately; skip it so a fresh cache
        // is not swept at startup.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("cache sweeper shutting down");
                    break;
                }
                _ = ticker.tick() => self.sweep(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Complexity, ProviderId};

    fn result(text: &str) -> AnalysisResult {
        AnalysisResult {
            explanation_text: text.to_string(),
            confidence: 0.5,
            source: ProviderId::Local,
            complexity: Complexity::Beginner,
            sentiment: None,
            topics: vec![],
            entities: vec![],
            cached: false,
            processing_time_ms: 3,
        }
    }

    fn test_cache() -> AnalysisCache {
        AnalysisCache::new(&CacheConfig::default()).unwrap()
    }

    #[test]
    fn key_is_stable_across_formatting() {
        let a = cache_key("The  Federal Reserve\n raised rates", AnalysisLevel::Standard);
        let b = cache_key("the federal reserve raised rates", AnalysisLevel::Standard);
        assert_eq!(a, b);
    }

    #[test]
    fn key_differs_by_level() {
        let a = cache_key("the federal reserve", AnalysisLevel::Brief);
        let b = cache_key("the federal reserve", AnalysisLevel::Detailed);
        assert_ne!(a, b);
    }

    #[test]
    fn set_then_get_returns_equal_value() {
        let cache = test_cache();
        cache.set("k1", result("hello"), Duration::from_secs(60));
        assert_eq!(cache.get("k1"), Some(result("hello")));
    }

    #[test]
    fn miss_returns_none() {
        let cache = test_cache();
        assert!(cache.get("absent").is_none());
    }

    #[test]
    fn durable_hit_promotes_to_memory() {
        let cache = test_cache();
        cache.set("k1", result("promoted"), Duration::from_secs(60));
        cache.memory.clear();
        assert_eq!(cache.memory.len(), 0);

        assert!(cache.get("k1").is_some());
        assert_eq!(cache.memory.len(), 1);
    }

    #[test]
    fn delete_removes_from_both_tiers() {
        let cache = test_cache();
        cache.set("k1", result("gone"), Duration::from_secs(60));
        cache.delete("k1");
        assert!(cache.get("k1").is_none());
        assert_eq!(cache.stats().persistent_size, 0);
    }

    #[test]
    fn stats_reflect_reuse_intensity() {
        let cache = test_cache();
        let stats = cache.stats();
        assert_eq!(stats.hit_rate, 0.0);

        cache.set("k1", result("v"), Duration::from_secs(60));
        cache.get("k1");
        cache.get("k1");
        let stats = cache.stats();
        assert_eq!(stats.memory_size, 1);
        assert_eq!(stats.persistent_size, 1);
        // 3 accesses over 1 entry: 2 reuses out of 3.
        assert!((stats.hit_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn entry_invariant_holds_for_zero_ttl() {
        let now = Utc::now();
        let entry = CacheEntry::new("k".into(), result("v"), Duration::ZERO, now);
        assert!(entry.expires_at > entry.created_at);
    }
}
