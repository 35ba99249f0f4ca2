//! Cache configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Two-tier cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries held in the memory tier.
    pub memory_capacity: usize,
    /// Baseline TTL in seconds; scaled by `1 + confidence` per entry.
    pub base_ttl_secs: u64,
    /// Interval between proactive expiry sweeps, in seconds.
    pub sweep_interval_secs: u64,
    /// Path of the durable store. None uses an in-memory database.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_capacity: 64,
            base_ttl_secs: 30 * 60,
            sweep_interval_secs: 5 * 60,
            db_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.memory_capacity, 64);
        assert_eq!(config.base_ttl_secs, 1800);
        assert!(config.db_path.is_none());
    }
}
