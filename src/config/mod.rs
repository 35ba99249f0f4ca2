//! Configuration module for Finlens
//!
//! Provides layered configuration loading from files, environment variables,
//! and defaults.
//!
//! # Configuration Precedence
//!
//! 1. Environment variables (`FINLENS_*`)
//! 2. Configuration file (TOML)
//! 3. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use finlens::config::FinlensConfig;
//!
//! // Load defaults
//! let config = FinlensConfig::default();
//! assert!(config.providers.cloud_enabled);
//!
//! // Parse from TOML
//! let toml = r#"
//! [cache]
//! memory_capacity = 16
//! "#;
//! let config: FinlensConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.cache.memory_capacity, 16);
//! ```

pub mod cache;
pub mod error;
pub mod logging;
pub mod providers;
pub mod transport;

pub use cache::CacheConfig;
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use providers::{ProvidersConfig, RemoteProviderConfig};
pub use transport::TransportConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified configuration for the Finlens pipeline.
///
/// Aggregates the provider chain, cache, transport, and logging sections.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FinlensConfig {
    /// Provider chain: credentials, endpoints, confidence constants
    pub providers: ProvidersConfig,
    /// Two-tier result cache settings
    pub cache: CacheConfig,
    /// Caller-side transport tuning
    pub transport: TransportConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl FinlensConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports FINLENS_* environment variables for credentials and common
    /// settings. Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(enabled) = std::env::var("FINLENS_CLOUD_ENABLED") {
            self.providers.cloud_enabled = enabled.to_lowercase() == "true";
        }
        if let Ok(key) = std::env::var("FINLENS_OPENAI_API_KEY") {
            self.providers.openai.api_key = Some(key);
        }
        if let Ok(key) = std::env::var("FINLENS_ANTHROPIC_API_KEY") {
            self.providers.anthropic.api_key = Some(key);
        }
        if let Ok(key) = std::env::var("FINLENS_GEMINI_API_KEY") {
            self.providers.gemini.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("FINLENS_BUILTIN_URL") {
            self.providers.builtin_url = url;
        }

        if let Ok(path) = std::env::var("FINLENS_CACHE_DB") {
            self.cache.db_path = Some(path.into());
        }

        if let Ok(level) = std::env::var("FINLENS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("FINLENS_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.memory_capacity == 0 {
            return Err(ConfigError::Validation {
                field: "cache.memory_capacity".to_string(),
                message: "memory tier must hold at least one entry".to_string(),
            });
        }
        if self.cache.base_ttl_secs == 0 {
            return Err(ConfigError::Validation {
                field: "cache.base_ttl_secs".to_string(),
                message: "baseline TTL must be non-zero".to_string(),
            });
        }

        if self.transport.backoff_floor_ms == 0 {
            return Err(ConfigError::Validation {
                field: "transport.backoff_floor_ms".to_string(),
                message: "backoff floor must be non-zero".to_string(),
            });
        }
        if self.transport.backoff_floor_ms > self.transport.backoff_ceiling_ms {
            return Err(ConfigError::Validation {
                field: "transport.backoff_ceiling_ms".to_string(),
                message: "ceiling must be >= floor".to_string(),
            });
        }

        for (field, confidence) in [
            (
                "providers.builtin_confidence",
                self.providers.builtin_confidence,
            ),
            ("providers.openai.confidence", self.providers.openai.confidence),
            (
                "providers.anthropic.confidence",
                self.providers.anthropic.confidence,
            ),
            ("providers.gemini.confidence", self.providers.gemini.confidence),
        ] {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(ConfigError::Validation {
                    field: field.to_string(),
                    message: format!("confidence {confidence} outside [0, 1]"),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = FinlensConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let result = FinlensConfig::load(Some(Path::new("/nonexistent/finlens.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn zero_capacity_rejected() {
        let mut config = FinlensConfig::default();
        config.cache.memory_capacity = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. }
            if field == "cache.memory_capacity"));
    }

    #[test]
    fn inverted_backoff_bounds_rejected() {
        let mut config = FinlensConfig::default();
        config.transport.backoff_floor_ms = 8_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn confidence_out_of_range_rejected() {
        let mut config = FinlensConfig::default();
        config.providers.openai.confidence = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_full_toml() {
        let toml = r#"
            [providers]
            cloud_enabled = false
            preferred = "anthropic"

            [providers.anthropic]
            api_key = "key"

            [cache]
            memory_capacity = 8
            base_ttl_secs = 60

            [transport]
            request_timeout_ms = 500

            [logging]
            level = "debug"
        "#;
        let config: FinlensConfig = toml::from_str(toml).unwrap();
        assert!(!config.providers.cloud_enabled);
        assert_eq!(config.cache.memory_capacity, 8);
        assert_eq!(config.transport.request_timeout_ms, 500);
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());
    }
}
