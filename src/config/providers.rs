//! Provider configuration: credentials, endpoints, and confidence constants.

use crate::provider::ProviderId;
use serde::{Deserialize, Serialize};

/// Configuration for one credentialed remote explanation provider.
///
/// A remote provider is available iff `api_key` is set. Confidence values
/// are fixed per provider and treated as configuration, not derived truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteProviderConfig {
    /// Base URL of the provider API.
    pub endpoint: String,
    /// Model identifier sent with each request.
    pub model: String,
    /// Credential string. None means the provider is unavailable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Fixed confidence tagged onto results from this provider.
    pub confidence: f64,
}

impl Default for RemoteProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            model: String::new(),
            api_key: None,
            confidence: 0.9,
        }
    }
}

/// Provider-chain configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Provider tried first, ahead of the default priority order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred: Option<ProviderId>,
    /// Global flag: when false, all credentialed remote providers are skipped.
    pub cloud_enabled: bool,
    /// Base URL of the host-exposed built-in runtime (probed for availability).
    pub builtin_url: String,
    /// Model served by the built-in runtime.
    pub builtin_model: String,
    /// Fixed confidence for built-in results.
    pub builtin_confidence: f64,
    pub openai: RemoteProviderConfig,
    pub anthropic: RemoteProviderConfig,
    pub gemini: RemoteProviderConfig,
    /// Per-candidate invocation timeout in milliseconds.
    pub provider_timeout_ms: u64,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            preferred: None,
            cloud_enabled: true,
            builtin_url: "http://localhost:11434".to_string(),
            builtin_model: "llama3:8b".to_string(),
            builtin_confidence: 0.90,
            openai: RemoteProviderConfig {
                endpoint: "https://api.openai.com".to_string(),
                model: "gpt-4o-mini".to_string(),
                api_key: None,
                confidence: 0.95,
            },
            anthropic: RemoteProviderConfig {
                endpoint: "https://api.anthropic.com".to_string(),
                model: "claude-3-haiku-20240307".to_string(),
                api_key: None,
                confidence: 0.93,
            },
            gemini: RemoteProviderConfig {
                endpoint: "https://generativelanguage.googleapis.com".to_string(),
                model: "gemini-1.5-flash".to_string(),
                api_key: None,
                confidence: 0.91,
            },
            provider_timeout_ms: 10_000,
        }
    }
}

impl ProvidersConfig {
    /// Fixed confidence for a provider, per the configured constants.
    ///
    /// `Local` has no fixed constant; its confidence is computed dynamically
    /// by the analyzer, so this returns the analyzer floor as a fallback.
    pub fn confidence_for(&self, id: ProviderId) -> f64 {
        match id {
            ProviderId::BuiltIn => self.builtin_confidence,
            ProviderId::OpenAi => self.openai.confidence,
            ProviderId::Anthropic => self.anthropic.confidence,
            ProviderId::Gemini => self.gemini.confidence,
            ProviderId::Local => 0.6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_no_credentials() {
        let config = ProvidersConfig::default();
        assert!(config.openai.api_key.is_none());
        assert!(config.anthropic.api_key.is_none());
        assert!(config.gemini.api_key.is_none());
        assert!(config.cloud_enabled);
    }

    #[test]
    fn confidence_constants_within_unit_interval() {
        let config = ProvidersConfig::default();
        for id in [
            ProviderId::BuiltIn,
            ProviderId::OpenAi,
            ProviderId::Anthropic,
            ProviderId::Gemini,
            ProviderId::Local,
        ] {
            let c = config.confidence_for(id);
            assert!((0.0..=1.0).contains(&c), "{id:?} confidence {c}");
        }
    }

    #[test]
    fn parses_from_toml_section() {
        let toml = r#"
            cloud_enabled = false
            [openai]
            api_key = "sk-test"
            confidence = 0.92
        "#;
        let config: ProvidersConfig = toml::from_str(toml).unwrap();
        assert!(!config.cloud_enabled);
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.openai.confidence, 0.92);
        // Untouched sections keep defaults
        assert_eq!(config.anthropic.confidence, 0.93);
    }
}
