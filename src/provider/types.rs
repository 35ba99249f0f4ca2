//! Supporting types for explanation providers.

use serde::{Deserialize, Serialize};

/// Identifier for an explanation source.
///
/// The set of providers is fixed: a host-exposed built-in runtime, three
/// credentialed remote services, and the local heuristic analyzer that can
/// never fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    #[serde(rename = "builtin")]
    BuiltIn,
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    Gemini,
    Local,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::BuiltIn => "builtin",
            ProviderId::OpenAi => "openai",
            ProviderId::Anthropic => "anthropic",
            ProviderId::Gemini => "gemini",
            ProviderId::Local => "local",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Availability snapshot for one provider.
///
/// Recomputed whenever credentials change; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDescriptor {
    pub id: ProviderId,
    pub available: bool,
    pub requires_credential: bool,
}

/// How much explanation detail the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisLevel {
    Brief,
    #[default]
    Standard,
    Detailed,
}

impl AnalysisLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisLevel::Brief => "brief",
            AnalysisLevel::Standard => "standard",
            AnalysisLevel::Detailed => "detailed",
        }
    }
}

/// Per-request options carried alongside the selected text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisOptions {
    /// Bypass the cache and recompute.
    pub force_refresh: bool,
    pub analysis_level: AnalysisLevel,
}

/// Reading-difficulty classification of the input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Beginner,
    Intermediate,
    Advanced,
}

/// Coarse sentiment of the input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// Kind of entity recognized in the input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Currency,
    Percentage,
    Institution,
}

/// A recognized entity: a currency amount, a percentage, or an institution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    /// Numeric value for currency and percentage entities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// Final, normalized explanation produced by the pipeline.
///
/// Immutable once produced; copied across the caller/host boundary as a
/// value, never shared by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub explanation_text: String,
    /// In `[0, 1]`. Fixed per remote provider, dynamic for the local analyzer.
    pub confidence: f64,
    pub source: ProviderId,
    pub complexity: Complexity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<Entity>,
    pub cached: bool,
    pub processing_time_ms: u64,
}

/// Raw output of a single provider invocation, before the orchestrator
/// normalizes it into an [`AnalysisResult`].
#[derive(Debug, Clone, Default)]
pub struct ProviderOutput {
    pub text: String,
    /// Set by the local analyzer; remote providers use their configured
    /// confidence constant instead.
    pub confidence: Option<f64>,
    pub sentiment: Option<Sentiment>,
    pub topics: Vec<String>,
    pub entities: Vec<Entity>,
}

impl ProviderOutput {
    /// Output carrying explanation text only, as remote providers return.
    pub fn text_only(text: String) -> Self {
        Self {
            text,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_id_round_trips_through_serde() {
        for (id, wire) in [
            (ProviderId::BuiltIn, "\"builtin\""),
            (ProviderId::OpenAi, "\"openai\""),
            (ProviderId::Anthropic, "\"anthropic\""),
            (ProviderId::Gemini, "\"gemini\""),
            (ProviderId::Local, "\"local\""),
        ] {
            assert_eq!(serde_json::to_string(&id).unwrap(), wire);
            let back: ProviderId = serde_json::from_str(wire).unwrap();
            assert_eq!(back, id);
        }
    }

    #[test]
    fn result_serializes_camel_case() {
        let result = AnalysisResult {
            explanation_text: "plain words".to_string(),
            confidence: 0.9,
            source: ProviderId::Local,
            complexity: Complexity::Beginner,
            sentiment: None,
            topics: vec![],
            entities: vec![],
            cached: false,
            processing_time_ms: 12,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["explanationText"], "plain words");
        assert_eq!(json["processingTimeMs"], 12);
        assert!(json.get("sentiment").is_none());
    }

    #[test]
    fn entity_kind_uses_type_field() {
        let entity = Entity {
            text: "0.25%".to_string(),
            kind: EntityKind::Percentage,
            value: Some(0.25),
        };
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["type"], "percentage");
        assert_eq!(json["value"], 0.25);
    }

    #[test]
    fn options_default_is_standard_without_refresh() {
        let options = AnalysisOptions::default();
        assert!(!options.force_refresh);
        assert_eq!(options.analysis_level, AnalysisLevel::Standard);
    }
}
