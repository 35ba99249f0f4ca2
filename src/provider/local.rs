//! Local heuristic provider: the always-available chain terminator.

use super::{
    AnalysisLevel, ExplanationProvider, ProviderDescriptor, ProviderError, ProviderId,
    ProviderOutput,
};
use crate::analyzer;
use async_trait::async_trait;

/// Wraps the deterministic heuristic analyzer as a provider.
///
/// Always available, never fails, so the orchestrator's chain can never be
/// exhausted.
pub struct LocalProvider;

impl LocalProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExplanationProvider for LocalProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Local
    }

    fn name(&self) -> &str {
        "Local heuristic analyzer"
    }

    fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor {
            id: ProviderId::Local,
            available: true,
            requires_credential: false,
        }
    }

    async fn explain(
        &self,
        text: &str,
        _context: Option<&str>,
        level: AnalysisLevel,
    ) -> Result<ProviderOutput, ProviderError> {
        let analysis = analyzer::analyze(text, level);
        Ok(ProviderOutput {
            text: analysis.explanation,
            confidence: Some(analysis.confidence),
            sentiment: Some(analysis.sentiment),
            topics: analysis.topics,
            entities: analysis.entities,
        })
    }
}
