//! Transport configuration

use serde::{Deserialize, Serialize};

/// Caller-side transport tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Per-request correlation timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Reconnect backoff floor in milliseconds.
    pub backoff_floor_ms: u64,
    /// Reconnect backoff ceiling in milliseconds.
    pub backoff_ceiling_ms: u64,
    /// Delay before the single one-shot retry after a context-invalidated
    /// failure, in milliseconds.
    pub invalidated_retry_delay_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 15_000,
            backoff_floor_ms: 250,
            backoff_ceiling_ms: 4_000,
            invalidated_retry_delay_ms: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TransportConfig::default();
        assert_eq!(config.request_timeout_ms, 15_000);
        assert_eq!(config.backoff_floor_ms, 250);
        assert_eq!(config.backoff_ceiling_ms, 4_000);
        assert!(config.backoff_floor_ms <= config.backoff_ceiling_ms);
    }
}
