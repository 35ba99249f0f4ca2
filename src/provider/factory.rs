//! Provider factory: builds the fixed provider set from configuration.

use super::builtin::BuiltinProvider;
use super::local::LocalProvider;
use super::remote::{RemoteDialect, RemoteProvider};
use super::ExplanationProvider;
use crate::config::ProvidersConfig;
use reqwest::Client;
use std::sync::Arc;

/// Build one instance of every provider in the fixed set, probing the
/// built-in runtime for availability.
///
/// Remote providers without a credential are still constructed; they report
/// themselves unavailable and the orchestrator filters them out. All remote
/// providers share the pooled HTTP client.
pub async fn build_providers(
    config: &ProvidersConfig,
    client: Arc<Client>,
) -> Vec<Arc<dyn ExplanationProvider>> {
    let builtin = BuiltinProvider::new(
        config.builtin_url.clone(),
        config.builtin_model.clone(),
        Arc::clone(&client),
    );
    let reachable = builtin.probe().await;
    tracing::debug!(reachable, url = %config.builtin_url, "built-in runtime probed");

    let providers: Vec<Arc<dyn ExplanationProvider>> = vec![
        Arc::new(builtin),
        Arc::new(RemoteProvider::new(
            RemoteDialect::OpenAi,
            &config.openai,
            Arc::clone(&client),
        )),
        Arc::new(RemoteProvider::new(
            RemoteDialect::Anthropic,
            &config.anthropic,
            Arc::clone(&client),
        )),
        Arc::new(RemoteProvider::new(
            RemoteDialect::Gemini,
            &config.gemini,
            Arc::clone(&client),
        )),
        Arc::new(LocalProvider::new()),
    ];
    providers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderId;

    #[tokio::test]
    async fn builds_the_full_fixed_set() {
        let config = ProvidersConfig {
            // Point the probe somewhere that cannot answer quickly.
            builtin_url: "http://127.0.0.1:1".to_string(),
            ..ProvidersConfig::default()
        };
        let providers = build_providers(&config, Arc::new(Client::new())).await;
        let ids: Vec<ProviderId> = providers.iter().map(|p| p.id()).collect();
        assert_eq!(
            ids,
            vec![
                ProviderId::BuiltIn,
                ProviderId::OpenAi,
                ProviderId::Anthropic,
                ProviderId::Gemini,
                ProviderId::Local,
            ]
        );
    }

    #[tokio::test]
    async fn only_local_available_without_credentials_or_runtime() {
        let config = ProvidersConfig {
            builtin_url: "http://127.0.0.1:1".to_string(),
            ..ProvidersConfig::default()
        };
        let providers = build_providers(&config, Arc::new(Client::new())).await;
        let available: Vec<ProviderId> = providers
            .iter()
            .filter(|p| p.descriptor().available)
            .map(|p| p.id())
            .collect();
        assert_eq!(available, vec![ProviderId::Local]);
    }
}
