//! Message envelope shared by the persistent and one-shot channels.
//!
//! Both paths carry the same shapes, so the caller logic is agnostic to
//! which path served a request.

use crate::provider::{AnalysisOptions, AnalysisResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload of an explanation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainPayload {
    pub text: String,
    /// Optional surrounding page context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default)]
    pub options: AnalysisOptions,
}

/// Machine-readable failure category carried in a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InputTooShort,
    Internal,
}

/// Response body shared by both channel paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponseBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,
}

impl ResponseBody {
    pub fn success(result: AnalysisResult) -> Self {
        Self {
            explanation: Some(result.explanation_text.clone()),
            terms: if result.topics.is_empty() {
                None
            } else {
                Some(result.topics.clone())
            },
            cached: Some(result.cached),
            processing_time_ms: Some(result.processing_time_ms),
            analysis: Some(result),
            error: None,
            error_code: None,
        }
    }

    pub fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            error_code: Some(code),
            ..Self::default()
        }
    }
}

/// One message on either channel.
///
/// Requests carry `EXPLAIN_TEXT` (or `PING` for the liveness probe);
/// responses echo the correlation ID so the caller can match them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Envelope {
    #[serde(rename_all = "camelCase")]
    ExplainText {
        correlation_id: Uuid,
        payload: ExplainPayload,
    },
    #[serde(rename_all = "camelCase")]
    Ping { correlation_id: Uuid },
    #[serde(rename_all = "camelCase")]
    Pong { correlation_id: Uuid },
    #[serde(rename_all = "camelCase")]
    Response {
        correlation_id: Uuid,
        #[serde(flatten)]
        body: Box<ResponseBody>,
    },
}

impl Envelope {
    pub fn correlation_id(&self) -> Uuid {
        match self {
            Envelope::ExplainText { correlation_id, .. }
            | Envelope::Ping { correlation_id }
            | Envelope::Pong { correlation_id }
            | Envelope::Response { correlation_id, .. } => *correlation_id,
        }
    }

    pub fn response(correlation_id: Uuid, body: ResponseBody) -> Self {
        Envelope::Response {
            correlation_id,
            body: Box::new(body),
        }
    }
}
