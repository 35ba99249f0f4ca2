//! Analysis host: the long-lived context that owns the orchestrator and
//! the cache.
//!
//! One orchestrator and one cache are constructed per process lifetime and
//! injected into the request handler; every entry point (persistent links
//! and one-shot calls) routes through that single handler, so there is
//! exactly one fallback chain.

use crate::cache::{cache_key, AnalysisCache, CacheError, CacheStats};
use crate::config::FinlensConfig;
use crate::orchestrator::{ttl_for_confidence, AnalysisError, Orchestrator};
use crate::provider::ProviderDescriptor;
use crate::transport::channel::{HostEndpoint, Link};
use crate::transport::protocol::{Envelope, ErrorCode, ExplainPayload, ResponseBody};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors during host construction.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("cache initialization failed: {0}")]
    Cache(#[from] CacheError),
}

/// Request handler shared by every host entry point.
pub struct AnalysisService {
    orchestrator: Orchestrator,
    cache: AnalysisCache,
    base_ttl: Duration,
}

impl AnalysisService {
    pub fn new(orchestrator: Orchestrator, cache: AnalysisCache, base_ttl: Duration) -> Self {
        Self {
            orchestrator,
            cache,
            base_ttl,
        }
    }

    /// Cache-aside explanation: consult the cache, run the provider chain
    /// on a miss, store every successful result with a confidence-scaled
    /// TTL.
    pub async fn handle_explain(&self, payload: ExplainPayload) -> ResponseBody {
        let started = Instant::now();
        let level = payload.options.analysis_level;
        let key = cache_key(&payload.text, level);

        if !payload.options.force_refresh {
            if let Some(mut value) = self.cache.get(&key) {
                value.cached = true;
                value.processing_time_ms = started.elapsed().as_millis() as u64;
                tracing::debug!(key = %key, "served from cache");
                return ResponseBody::success(value);
            }
        }

        match self
            .orchestrator
            .explain(&payload.text, payload.context.as_deref(), level)
            .await
        {
            Ok(result) => {
                let ttl = ttl_for_confidence(self.base_ttl, result.confidence);
                self.cache.set(&key, result.clone(), ttl);
                tracing::debug!(
                    source = %result.source,
                    elapsed_ms = result.processing_time_ms,
                    "explanation produced"
                );
                ResponseBody::success(result)
            }
            Err(error @ AnalysisError::InputTooShort { .. }) => {
                ResponseBody::failure(ErrorCode::InputTooShort, error.to_string())
            }
        }
    }

    /// Route one envelope; both channel paths share this.
    pub async fn handle_envelope(&self, envelope: Envelope) -> Option<Envelope> {
        match envelope {
            Envelope::ExplainText {
                correlation_id,
                payload,
            } => {
                tracing::debug!(%correlation_id, chars = payload.text.len(), "explain request");
                let body = self.handle_explain(payload).await;
                Some(Envelope::response(correlation_id, body))
            }
            Envelope::Ping { correlation_id } => Some(Envelope::Pong { correlation_id }),
            // The host never receives responses or pongs.
            Envelope::Pong { .. } | Envelope::Response { .. } => None,
        }
    }

    /// Availability snapshot of the provider set.
    pub fn available_providers(&self) -> Vec<ProviderDescriptor> {
        self.orchestrator.available_providers()
    }

    /// Cache sizes and reuse intensity.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    async fn run_cache_sweeper(&self, period: Duration, cancel: CancellationToken) {
        self.cache.run_sweeper(period, cancel).await;
    }
}

/// The analysis host: constructs its collaborators once, then serves
/// envelopes until cancelled.
pub struct AnalysisHost {
    service: Arc<AnalysisService>,
    sweep_period: Duration,
}

impl AnalysisHost {
    /// Build the host from configuration: pooled HTTP client, probed
    /// provider set, both cache tiers.
    pub async fn new(config: &FinlensConfig) -> Result<Self, HostError> {
        let client = Arc::new(reqwest::Client::new());
        let orchestrator = Orchestrator::from_config(&config.providers, client).await;
        let cache = AnalysisCache::new(&config.cache)?;
        let base_ttl = Duration::from_secs(config.cache.base_ttl_secs);

        Ok(Self {
            service: Arc::new(AnalysisService::new(orchestrator, cache, base_ttl)),
            sweep_period: Duration::from_secs(config.cache.sweep_interval_secs),
        })
    }

    /// Build a host around an existing service; used by tests that inject
    /// scripted providers.
    pub fn with_service(service: AnalysisService, sweep_period: Duration) -> Self {
        Self {
            service: Arc::new(service),
            sweep_period,
        }
    }

    pub fn service(&self) -> Arc<AnalysisService> {
        Arc::clone(&self.service)
    }

    /// Serve both channel paths until `cancel` fires.
    ///
    /// Every accepted link and every one-shot call is handled on its own
    /// task, so responses may complete out of order relative to send order;
    /// callers match them by correlation ID.
    pub async fn serve(&self, mut endpoint: HostEndpoint, cancel: CancellationToken) {
        tracing::info!("analysis host serving");
        let sweeper = {
            let service = self.service();
            let period = self.sweep_period;
            let cancel = cancel.clone();
            tokio::spawn(async move { service.run_cache_sweeper(period, cancel).await })
        };

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                maybe_link = endpoint.links.recv() => match maybe_link {
                    Some(link) => {
                        tokio::spawn(handle_link(self.service(), link));
                    }
                    None => break,
                },
                maybe_call = endpoint.one_shots.recv() => match maybe_call {
                    Some((envelope, reply)) => {
                        let service = self.service();
                        tokio::spawn(async move {
                            if let Some(response) = service.handle_envelope(envelope).await {
                                let _ = reply.send(response);
                            }
                        });
                    }
                    None => break,
                },
            }
        }

        sweeper.abort();
        tracing::info!("analysis host stopped");
    }
}

/// Drain one persistent link, spawning a task per request so slow
/// explanations never block later ones on the same link.
async fn handle_link(service: Arc<AnalysisService>, mut link: Link) {
    while let Some(envelope) = link.rx.recv().await {
        let service = Arc::clone(&service);
        let tx = link.tx.clone();
        tokio::spawn(async move {
            if let Some(response) = service.handle_envelope(envelope).await {
                let _ = tx.send(response).await;
            }
        });
    }
    tracing::debug!("persistent link closed by caller");
}
