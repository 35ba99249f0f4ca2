//! Bounded in-memory cache tier with least-recently-accessed eviction.

use super::CacheEntry;
use crate::provider::AnalysisResult;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Fast key-to-entry map bounded by a fixed capacity.
///
/// On overflow the single entry with the oldest `last_accessed_at` is
/// evicted. Every read that finds a live entry bumps its access counters.
pub struct MemoryTier {
    entries: DashMap<String, CacheEntry>,
    capacity: usize,
}

impl MemoryTier {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Look up a live entry, updating its access counters.
    ///
    /// Expired entries are removed and reported as absent.
    pub fn get(&self, key: &str, now: DateTime<Utc>) -> Option<AnalysisResult> {
        {
            let entry = self.entries.get(key)?;
            if !entry.is_valid(now) {
                drop(entry);
                self.entries.remove(key);
                return None;
            }
        }
        let mut entry = self.entries.get_mut(key)?;
        entry.access_count += 1;
        entry.last_accessed_at = now;
        Some(entry.value.clone())
    }

    /// Insert an entry, evicting the least-recently-accessed one first if
    /// the tier is full. Re-inserting an existing key overwrites in place.
    pub fn insert(&self, entry: CacheEntry) {
        if !self.entries.contains_key(&entry.key) && self.entries.len() >= self.capacity {
            self.evict_lru();
        }
        self.entries.insert(entry.key.clone(), entry);
    }

    fn evict_lru(&self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|e| e.value().last_accessed_at)
            .map(|e| e.key().clone());
        if let Some(key) = victim {
            tracing::debug!(key = %key, "evicting least-recently-accessed cache entry");
            self.entries.remove(&key);
        }
    }

    pub fn delete(&self, key: &str) {
        self.entries.remove(key);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired entry; returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_valid(now));
        before - self.entries.len()
    }

    /// Live entry count and the sum of their access counts, for the
    /// reuse-intensity hit rate.
    pub fn access_totals(&self) -> (usize, u64) {
        let mut entries = 0usize;
        let mut accesses = 0u64;
        for e in self.entries.iter() {
            entries += 1;
            accesses += e.value().access_count;
        }
        (entries, accesses)
    }
}
