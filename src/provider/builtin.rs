//! Built-in provider: a host-exposed local model runtime.
//!
//! Availability is probed against the runtime rather than assumed: the host
//! either exposes a working generation endpoint or this provider reports
//! itself unavailable.

use super::{
    AnalysisLevel, ExplanationProvider, ProviderDescriptor, ProviderError, ProviderId,
    ProviderOutput,
};
use super::remote::explanation_prompt;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);
const GENERATE_TIMEOUT: Duration = Duration::from_secs(15);

pub struct BuiltinProvider {
    name: String,
    base_url: String,
    model: String,
    client: Arc<Client>,
    available: AtomicBool,
}

impl BuiltinProvider {
    pub fn new(base_url: String, model: String, client: Arc<Client>) -> Self {
        Self {
            name: format!("Built-in runtime at {base_url}"),
            base_url,
            model,
            client,
            available: AtomicBool::new(false),
        }
    }

    /// Probe the runtime's model listing endpoint and record availability.
    pub async fn probe(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        let reachable = match self
            .client
            .get(&url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "built-in runtime probe failed");
                false
            }
        };
        self.available.store(reachable, Ordering::SeqCst);
        reachable
    }
}

#[async_trait]
impl ExplanationProvider for BuiltinProvider {
    fn id(&self) -> ProviderId {
        ProviderId::BuiltIn
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor {
            id: ProviderId::BuiltIn,
            available: self.available.load(Ordering::SeqCst),
            requires_credential: false,
        }
    }

    async fn explain(
        &self,
        text: &str,
        context: Option<&str>,
        level: AnalysisLevel,
    ) -> Result<ProviderOutput, ProviderError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable("built-in runtime not reachable"));
        }

        let url = format!("{}/api/generate", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "prompt": explanation_prompt(text, context, level),
            "stream": false,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .timeout(GENERATE_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(GENERATE_TIMEOUT.as_millis() as u64)
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        let explanation = value
            .get("response")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                ProviderError::InvalidResponse("missing 'response' field".to_string())
            })?;

        Ok(ProviderOutput::text_only(explanation.to_string()))
    }
}
