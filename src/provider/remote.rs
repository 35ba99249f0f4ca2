//! Remote explanation providers.
//!
//! One implementation covers the three credentialed cloud services; they
//! differ only in URL layout, auth header, and response shape, captured by
//! [`RemoteDialect`]. The call contract is deliberately thin: one POST,
//! error on any non-2xx or unexpected shape, no retry and no backoff at
//! this boundary.

use super::{
    AnalysisLevel, ExplanationProvider, ProviderDescriptor, ProviderError, ProviderId,
    ProviderOutput,
};
use crate::config::RemoteProviderConfig;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// HTTP deadline for one remote call; the orchestrator applies its own
/// tighter bound on top.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the plain-language instruction sent to generative providers.
pub(crate) fn explanation_prompt(text: &str, context: Option<&str>, level: AnalysisLevel) -> String {
    let depth = match level {
        AnalysisLevel::Brief => "in one or two short sentences",
        AnalysisLevel::Standard => "in a short paragraph",
        AnalysisLevel::Detailed => "thoroughly, defining each financial term you encounter",
    };
    let mut prompt = format!(
        "Explain the following financial text in plain language {depth}, \
         for a reader with no finance background:\n\n{text}"
    );
    if let Some(context) = context {
        prompt.push_str(&format!("\n\nSurrounding page context:\n{context}"));
    }
    prompt
}

/// Wire dialect of one remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteDialect {
    OpenAi,
    Anthropic,
    Gemini,
}

impl RemoteDialect {
    fn provider_id(&self) -> ProviderId {
        match self {
            RemoteDialect::OpenAi => ProviderId::OpenAi,
            RemoteDialect::Anthropic => ProviderId::Anthropic,
            RemoteDialect::Gemini => ProviderId::Gemini,
        }
    }

    fn url(&self, endpoint: &str, model: &str, api_key: &str) -> String {
        match self {
            RemoteDialect::OpenAi => format!("{endpoint}/v1/chat/completions"),
            RemoteDialect::Anthropic => format!("{endpoint}/v1/messages"),
            RemoteDialect::Gemini => {
                format!("{endpoint}/v1beta/models/{model}:generateContent?key={api_key}")
            }
        }
    }

    fn request_body(&self, model: &str, prompt: &str) -> Value {
        match self {
            RemoteDialect::OpenAi => json!({
                "model": model,
                "messages": [{"role": "user", "content": prompt}],
            }),
            RemoteDialect::Anthropic => json!({
                "model": model,
                "max_tokens": 512,
                "messages": [{"role": "user", "content": prompt}],
            }),
            RemoteDialect::Gemini => json!({
                "contents": [{"parts": [{"text": prompt}]}],
            }),
        }
    }

    fn authorize(&self, request: RequestBuilder, api_key: &str) -> RequestBuilder {
        match self {
            RemoteDialect::OpenAi => request.bearer_auth(api_key),
            RemoteDialect::Anthropic => request
                .header("x-api-key", api_key)
                .header("anthropic-version", "2023-06-01"),
            // Gemini carries the key as a URL query parameter.
            RemoteDialect::Gemini => request,
        }
    }

    fn extract_text(&self, value: &Value) -> Option<String> {
        let text = match self {
            RemoteDialect::OpenAi => value
                .get("choices")?
                .get(0)?
                .get("message")?
                .get("content")?
                .as_str()?,
            RemoteDialect::Anthropic => {
                value.get("content")?.get(0)?.get("text")?.as_str()?
            }
            RemoteDialect::Gemini => value
                .get("candidates")?
                .get(0)?
                .get("content")?
                .get("parts")?
                .get(0)?
                .get("text")?
                .as_str()?,
        };
        Some(text.to_string())
    }
}

/// A credentialed remote explanation service.
///
/// Constructed with or without a credential; without one it reports itself
/// unavailable rather than erroring, so a configured-but-unloaded key is
/// not treated as a failure.
pub struct RemoteProvider {
    dialect: RemoteDialect,
    name: String,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    client: Arc<Client>,
}

impl RemoteProvider {
    pub fn new(dialect: RemoteDialect, config: &RemoteProviderConfig, client: Arc<Client>) -> Self {
        Self {
            dialect,
            name: format!("{} explanation API", dialect.provider_id()),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            client,
        }
    }
}

#[async_trait]
impl ExplanationProvider for RemoteProvider {
    fn id(&self) -> ProviderId {
        self.dialect.provider_id()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor {
            id: self.id(),
            available: self.api_key.is_some(),
            requires_credential: true,
        }
    }

    async fn explain(
        &self,
        text: &str,
        context: Option<&str>,
        level: AnalysisLevel,
    ) -> Result<ProviderOutput, ProviderError> {
        let Some(api_key) = &self.api_key else {
            return Err(ProviderError::Unavailable("no credential configured"));
        };

        let url = self.dialect.url(&self.endpoint, &self.model, api_key);
        let body = self
            .dialect
            .request_body(&self.model, &explanation_prompt(text, context, level));

        let request = self.dialect.authorize(self.client.post(&url), api_key);
        let response = request
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(REQUEST_TIMEOUT.as_millis() as u64)
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

        let value: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        let explanation = self.dialect.extract_text(&value).ok_or_else(|| {
            ProviderError::InvalidResponse(format!(
                "unexpected {} response shape",
                self.dialect.provider_id()
            ))
        })?;

        Ok(ProviderOutput::text_only(explanation))
    }
}
