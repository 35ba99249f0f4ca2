//! Explanation provider abstraction layer.
//!
//! This module provides the `ExplanationProvider` trait and supporting types
//! that abstract provider-specific logic behind a uniform contract, so the
//! orchestrator can walk its priority chain without type branching.

use async_trait::async_trait;

pub mod builtin;
pub mod error;
pub mod factory;
pub mod local;
pub mod remote;
pub mod types;

// Re-export key types for convenience
pub use error::ProviderError;
pub use types::{
    AnalysisLevel, AnalysisOptions, AnalysisResult, Complexity, Entity, EntityKind,
    ProviderDescriptor, ProviderId, ProviderOutput, Sentiment,
};

/// Unified interface for all explanation sources.
///
/// Encapsulates provider-specific request construction, response parsing,
/// and availability reporting.
///
/// # Object Safety
///
/// This trait is object-safe and designed to be used as
/// `Arc<dyn ExplanationProvider>`.
#[async_trait]
pub trait ExplanationProvider: Send + Sync + 'static {
    /// Which fixed provider this instance is.
    fn id(&self) -> ProviderId;

    /// Human-readable name for logging (e.g., "OpenAI explanation API").
    fn name(&self) -> &str;

    /// Current availability snapshot.
    ///
    /// A remote provider is available iff a credential is configured; the
    /// built-in provider is available iff the host runtime answered its
    /// probe; the local analyzer is always available.
    fn descriptor(&self) -> ProviderDescriptor;

    /// Produce a plain-language explanation of `text`.
    ///
    /// # Returns
    ///
    /// - `Ok(ProviderOutput)` on success; the orchestrator treats empty
    ///   explanation text as a failure and advances.
    /// - `Err(ProviderError)` on any network, auth, or shape failure.
    ///   Failures are never retried against the same provider.
    async fn explain(
        &self,
        text: &str,
        context: Option<&str>,
        level: AnalysisLevel,
    ) -> Result<ProviderOutput, ProviderError>;
}
