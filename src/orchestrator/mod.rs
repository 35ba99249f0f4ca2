//! Provider orchestrator.
//!
//! Walks a prioritized provider chain with graceful degradation: each
//! candidate gets one bounded attempt, failures advance to the next
//! candidate, and the local heuristic analyzer terminates the chain so a
//! result is always produced.

pub mod error;

pub use error::AnalysisError;

use crate::analyzer;
use crate::config::ProvidersConfig;
use crate::provider::factory::build_providers;
use crate::provider::{
    AnalysisLevel, AnalysisResult, Complexity, ExplanationProvider, ProviderDescriptor,
    ProviderId, ProviderOutput,
};
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Inputs shorter than this are rejected before any provider is invoked.
pub const MIN_TEXT_LEN: usize = 10;

/// Default priority order before the preferred provider is applied.
const DEFAULT_ORDER: [ProviderId; 5] = [
    ProviderId::BuiltIn,
    ProviderId::OpenAi,
    ProviderId::Anthropic,
    ProviderId::Gemini,
    ProviderId::Local,
];

/// TTL for a cached result scales with its confidence: baseline times
/// `1 + confidence`.
pub fn ttl_for_confidence(base: Duration, confidence: f64) -> Duration {
    base.mul_f64(1.0 + confidence.clamp(0.0, 1.0))
}

/// Tries providers in priority order and normalizes their output.
///
/// Constructed once per host lifetime and injected into request handlers;
/// there are no module-level singletons.
pub struct Orchestrator {
    providers: Vec<Arc<dyn ExplanationProvider>>,
    config: ProvidersConfig,
}

impl Orchestrator {
    pub fn new(providers: Vec<Arc<dyn ExplanationProvider>>, config: ProvidersConfig) -> Self {
        Self { providers, config }
    }

    /// Build the orchestrator with the standard provider set, probing the
    /// built-in runtime.
    pub async fn from_config(config: &ProvidersConfig, client: Arc<Client>) -> Self {
        let providers = build_providers(config, client).await;
        Self::new(providers, config.clone())
    }

    /// Rebuild the provider set after credentials changed.
    ///
    /// The availability table is derived from the new provider set; nothing
    /// about availability is ever persisted.
    pub async fn refresh_credentials(&mut self, config: &ProvidersConfig, client: Arc<Client>) {
        self.providers = build_providers(config, client).await;
        self.config = config.clone();
        tracing::info!("provider availability refreshed after credential change");
    }

    fn provider(&self, id: ProviderId) -> Option<&Arc<dyn ExplanationProvider>> {
        self.providers.iter().find(|p| p.id() == id)
    }

    /// Current availability snapshot for every provider in the fixed set.
    pub fn available_providers(&self) -> Vec<ProviderDescriptor> {
        self.providers.iter().map(|p| p.descriptor()).collect()
    }

    /// Compute the candidate chain: preferred provider first, then the
    /// default order, deduplicated, filtered to available providers, and
    /// with credentialed remotes dropped when cloud access is disabled.
    pub fn priority_order(&self) -> Vec<ProviderId> {
        let mut order: Vec<ProviderId> = Vec::new();
        let candidates = self.config.preferred.into_iter().chain(DEFAULT_ORDER);
        for id in candidates {
            if order.contains(&id) {
                continue;
            }
            let Some(provider) = self.provider(id) else {
                continue;
            };
            let descriptor = provider.descriptor();
            if !descriptor.available {
                continue;
            }
            if !self.config.cloud_enabled && descriptor.requires_credential {
                continue;
            }
            order.push(id);
        }
        order
    }

    /// Produce an explanation for `text`.
    ///
    /// Never fails beyond the too-short rejection: every provider error is
    /// logged and the chain advances, and the local analyzer terminates the
    /// chain unconditionally.
    pub async fn explain(
        &self,
        text: &str,
        context: Option<&str>,
        level: AnalysisLevel,
    ) -> Result<AnalysisResult, AnalysisError> {
        let len = text.trim().chars().count();
        if len < MIN_TEXT_LEN {
            return Err(AnalysisError::InputTooShort {
                len,
                min: MIN_TEXT_LEN,
            });
        }

        let started = Instant::now();
        let complexity = analyzer::classify_complexity(text);
        let timeout = Duration::from_millis(self.config.provider_timeout_ms);

        for id in self.priority_order() {
            let Some(provider) = self.provider(id) else {
                continue;
            };
            match tokio::time::timeout(timeout, provider.explain(text, context, level)).await {
                Ok(Ok(output)) if !output.text.trim().is_empty() => {
                    tracing::debug!(
                        provider = %id,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "provider produced explanation"
                    );
                    return Ok(self.assemble(id, output, complexity, started));
                }
                Ok(Ok(_)) => {
                    tracing::warn!(provider = %id, "provider returned empty output, advancing");
                }
                Ok(Err(e)) => {
                    tracing::warn!(provider = %id, error = %e, "provider failed, advancing");
                }
                Err(_) => {
                    tracing::warn!(
                        provider = %id,
                        timeout_ms = self.config.provider_timeout_ms,
                        "provider timed out, advancing"
                    );
                }
            }
        }

        // The local analyzer is always in the chain and cannot fail; this
        // terminal path exists so the type system agrees.
        let analysis = analyzer::analyze(text, level);
        Ok(AnalysisResult {
            explanation_text: analysis.explanation,
            confidence: analysis.confidence,
            source: ProviderId::Local,
            complexity,
            sentiment: Some(analysis.sentiment),
            topics: analysis.topics,
            entities: analysis.entities,
            cached: false,
            processing_time_ms: started.elapsed().as_millis() as u64,
        })
    }

    fn assemble(
        &self,
        id: ProviderId,
        output: ProviderOutput,
        complexity: Complexity,
        started: Instant,
    ) -> AnalysisResult {
        let confidence = output
            .confidence
            .unwrap_or_else(|| self.config.confidence_for(id));
        AnalysisResult {
            explanation_text: output.text,
            confidence,
            source: id,
            complexity,
            sentiment: output.sentiment,
            topics: output.topics,
            entities: output.entities,
            cached: false,
            processing_time_ms: started.elapsed().as_millis() as u64,
        }
    }
}
