//! Integration tests for the provider chain over real HTTP mocks.
//!
//! Remote providers are exercised end-to-end against wiremock servers; the
//! chain must degrade across failing providers and never surface an error.

use finlens::config::ProvidersConfig;
use finlens::orchestrator::{AnalysisError, Orchestrator};
use finlens::provider::{AnalysisLevel, ProviderId};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEXT: &str = "The Federal Reserve raised interest rates by 0.25%";

fn client() -> Arc<reqwest::Client> {
    Arc::new(reqwest::Client::new())
}

/// Providers config with the built-in runtime pointed at a dead port so
/// only the explicitly mocked remotes are reachable.
fn base_config() -> ProvidersConfig {
    let mut config = ProvidersConfig::default();
    config.builtin_url = "http://127.0.0.1:1".to_string();
    config.provider_timeout_ms = 2_000;
    config
}

fn anthropic_success_body() -> serde_json::Value {
    serde_json::json!({
        "content": [{"type": "text", "text": "A plain-language explanation from the mock."}]
    })
}

#[tokio::test]
async fn failing_remote_advances_to_next_remote() {
    let openai = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&openai)
        .await;

    let anthropic = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(anthropic_success_body()))
        .expect(1)
        .mount(&anthropic)
        .await;

    let mut config = base_config();
    config.openai.endpoint = openai.uri();
    config.openai.api_key = Some("sk-test".to_string());
    config.anthropic.endpoint = anthropic.uri();
    config.anthropic.api_key = Some("key-test".to_string());

    let orchestrator = Orchestrator::from_config(&config, client()).await;
    let result = orchestrator
        .explain(TEXT, None, AnalysisLevel::Standard)
        .await
        .unwrap();

    assert_eq!(result.source, ProviderId::Anthropic);
    assert_eq!(
        result.explanation_text,
        "A plain-language explanation from the mock."
    );
    assert_eq!(result.confidence, config.anthropic.confidence);
    assert!(!result.cached);
}

#[tokio::test]
async fn malformed_remote_response_degrades_to_local() {
    let openai = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "unexpected": "shape"
        })))
        .expect(1)
        .mount(&openai)
        .await;

    let mut config = base_config();
    config.openai.endpoint = openai.uri();
    config.openai.api_key = Some("sk-test".to_string());

    let orchestrator = Orchestrator::from_config(&config, client()).await;
    let result = orchestrator
        .explain(TEXT, None, AnalysisLevel::Standard)
        .await
        .unwrap();

    assert_eq!(result.source, ProviderId::Local);
    assert!(!result.explanation_text.is_empty());
}

#[tokio::test]
async fn too_short_input_contacts_no_provider() {
    let openai = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&openai)
        .await;

    let mut config = base_config();
    config.openai.endpoint = openai.uri();
    config.openai.api_key = Some("sk-test".to_string());

    let orchestrator = Orchestrator::from_config(&config, client()).await;
    let err = orchestrator
        .explain("tiny", None, AnalysisLevel::Standard)
        .await
        .unwrap_err();

    assert!(matches!(err, AnalysisError::InputTooShort { len: 4, .. }));
}

#[tokio::test]
async fn cloud_disabled_never_calls_credentialed_remotes() {
    let openai = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&openai)
        .await;

    let mut config = base_config();
    config.cloud_enabled = false;
    config.openai.endpoint = openai.uri();
    config.openai.api_key = Some("sk-test".to_string());

    let orchestrator = Orchestrator::from_config(&config, client()).await;
    let result = orchestrator
        .explain(TEXT, None, AnalysisLevel::Standard)
        .await
        .unwrap();

    // Never a remote source when cloud is disabled.
    assert_eq!(result.source, ProviderId::Local);
}

#[tokio::test]
async fn no_credentials_still_produces_a_result() {
    let orchestrator = Orchestrator::from_config(&base_config(), client()).await;
    let result = orchestrator
        .explain(TEXT, None, AnalysisLevel::Standard)
        .await
        .unwrap();

    assert_eq!(result.source, ProviderId::Local);
    assert!(result
        .entities
        .iter()
        .any(|e| e.text == "0.25%" && e.value == Some(0.25)));
    assert!(result.topics.iter().any(|t| t == "Interest Rates"));
}

#[tokio::test]
async fn preferred_remote_wins_over_default_order() {
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "Gemini explanation."}]}}]
        })))
        .expect(1)
        .mount(&gemini)
        .await;

    let openai = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&openai)
        .await;

    let mut config = base_config();
    config.preferred = Some(ProviderId::Gemini);
    config.gemini.endpoint = gemini.uri();
    config.gemini.api_key = Some("g-test".to_string());
    config.openai.endpoint = openai.uri();
    config.openai.api_key = Some("sk-test".to_string());

    let orchestrator = Orchestrator::from_config(&config, client()).await;
    let result = orchestrator
        .explain(TEXT, None, AnalysisLevel::Standard)
        .await
        .unwrap();

    assert_eq!(result.source, ProviderId::Gemini);
    assert_eq!(result.explanation_text, "Gemini explanation.");
}
