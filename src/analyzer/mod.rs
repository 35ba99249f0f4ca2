//! Local heuristic analyzer.
//!
//! A deterministic, pure fallback explanation source: keyword weighting,
//! entity extraction, sentiment, topic mapping, and extractive
//! summarization over raw text. This is the always-available terminal
//! member of the provider chain and can never fail.

pub mod entities;
pub mod sentiment;
pub mod summary;
pub mod tokenize;
pub mod vocabulary;

use crate::provider::{AnalysisLevel, Complexity, Entity, Sentiment};
use std::collections::{HashMap, HashSet};

pub use entities::extract_entities;
pub use sentiment::score_sentiment;
pub use summary::extractive_summary;
pub use tokenize::{stem, tokenize};

/// How many top-weighted terms are kept.
const TOP_TERM_COUNT: usize = 10;

/// Everything the heuristic analyzer derives from one input text.
#[derive(Debug, Clone)]
pub struct LocalAnalysis {
    pub explanation: String,
    pub confidence: f64,
    pub sentiment: Sentiment,
    pub complexity: Complexity,
    pub topics: Vec<String>,
    pub entities: Vec<Entity>,
    pub summary: Option<String>,
}

/// Run the full heuristic pipeline over `text`.
pub fn analyze(text: &str, level: AnalysisLevel) -> LocalAnalysis {
    let tokens = tokenize(text);
    let weights = weight_map(&tokens);
    let top_terms = top_weighted_terms(&tokens);
    let entities = extract_entities(text);
    let sentiment = score_sentiment(&tokens);
    let complexity = classify_complexity(text);
    let topics = extract_topics(&top_terms, &tokens);

    let max_sentences = match level {
        AnalysisLevel::Brief => 1,
        AnalysisLevel::Standard => 2,
        AnalysisLevel::Detailed => 3,
    };
    let summary = extractive_summary(text, &weights, &top_terms, max_sentences);

    let confidence = score_confidence(&top_terms, &entities, text);
    let mut explanation = explanation_text(&topics, &entities, sentiment, confidence, level);
    if level != AnalysisLevel::Brief {
        if let Some(ref s) = summary {
            explanation.push_str("\n\nKey sentences: ");
            explanation.push_str(s);
        }
    }

    LocalAnalysis {
        explanation,
        confidence,
        sentiment,
        complexity,
        topics,
        entities,
        summary,
    }
}

fn term_counts(tokens: &[String]) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for token in tokens {
        *counts.entry(token.clone()).or_insert(0) += 1;
    }
    counts
}

fn term_weight(count: usize, total: f64) -> f64 {
    let tf = count as f64;
    tf * (1.0 + total / count as f64).ln()
}

/// Term-frequency weights over the document's own token distribution:
/// `tf * ln(1 + N / count)` for every term.
pub fn weight_map(tokens: &[String]) -> HashMap<String, f64> {
    let total = tokens.len() as f64;
    term_counts(tokens)
        .into_iter()
        .map(|(term, count)| (term, term_weight(count, total)))
        .collect()
}

/// The top terms by weight. Terms occurring fewer than twice are dropped;
/// at most [`TOP_TERM_COUNT`] survive.
pub fn top_weighted_terms(tokens: &[String]) -> Vec<(String, f64)> {
    let total = tokens.len() as f64;
    let mut terms: Vec<(String, f64)> = term_counts(tokens)
        .into_iter()
        .filter(|(_, count)| *count >= 2)
        .map(|(term, count)| {
            let weight = term_weight(count, total);
            (term, weight)
        })
        .collect();
    terms.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    terms.truncate(TOP_TERM_COUNT);
    terms
}

/// Classify reading difficulty from the fixed vocabulary tiers.
///
/// Any advanced term forces `Advanced`; otherwise intermediate terms
/// outrank beginner terms; otherwise `Beginner`.
pub fn classify_complexity(text: &str) -> Complexity {
    let lower = text.to_lowercase();
    if vocabulary::ADVANCED_TERMS.iter().any(|t| lower.contains(t)) {
        Complexity::Advanced
    } else if vocabulary::INTERMEDIATE_TERMS.iter().any(|t| lower.contains(t)) {
        Complexity::Intermediate
    } else {
        Complexity::Beginner
    }
}

/// Map term stems to topic labels; the first matching rule per term wins
/// and duplicates are dropped.
///
/// Uses the top-weighted terms when any survived weighting; short inputs
/// rarely repeat a term, so fall back to all distinct stems there.
pub fn extract_topics(top_terms: &[(String, f64)], tokens: &[String]) -> Vec<String> {
    let stems: Vec<&str> = if top_terms.is_empty() {
        let mut seen = HashSet::new();
        tokens
            .iter()
            .map(|t| t.as_str())
            .filter(|t| seen.insert(*t))
            .collect()
    } else {
        top_terms.iter().map(|(t, _)| t.as_str()).collect()
    };

    let mut topics = Vec::new();
    for s in stems {
        if let Some((_, label)) = vocabulary::TOPIC_RULES.iter().find(|(pat, _)| s.contains(pat)) {
            if !topics.iter().any(|t| t == label) {
                topics.push((*label).to_string());
            }
        }
    }
    topics
}

/// Dynamic confidence: capped contributions from term weight, entity count,
/// entity-kind diversity, and a flat bonus for high-value domain terms.
pub fn score_confidence(top_terms: &[(String, f64)], entities: &[Entity], text: &str) -> f64 {
    let avg_weight = if top_terms.is_empty() {
        0.0
    } else {
        top_terms.iter().map(|(_, w)| w).sum::<f64>() / top_terms.len() as f64
    };

    let mut confidence = (avg_weight * 0.15).min(0.30);
    confidence += (entities.len() as f64 * 0.08).min(0.24);

    let kinds: HashSet<_> = entities.iter().map(|e| e.kind).collect();
    confidence += (kinds.len() as f64 * 0.07).min(0.14);

    let lower = text.to_lowercase();
    if vocabulary::HIGH_VALUE_TERMS.iter().any(|t| lower.contains(t)) {
        confidence += 0.12;
    }

    confidence.clamp(0.0, 1.0)
}

/// Generate the plain-language explanation body.
fn explanation_text(
    topics: &[String],
    entities: &[Entity],
    sentiment: Sentiment,
    confidence: f64,
    level: AnalysisLevel,
) -> String {
    if topics.is_empty() && entities.is_empty() {
        return "No recognized financial terminology was found in the selected text.".to_string();
    }

    let mut out = String::new();
    if topics.is_empty() {
        out.push_str("This text contains financial figures without a clear topic.");
    } else {
        out.push_str(&format!("This text is about {}.", join_list(topics)));
    }

    if level != AnalysisLevel::Brief && !entities.is_empty() {
        let samples: Vec<&str> = entities.iter().take(3).map(|e| e.text.as_str()).collect();
        out.push_str(&format!(
            " It mentions {} specific figure{} or institution{}, including {}.",
            entities.len(),
            if entities.len() == 1 { "" } else { "s" },
            if entities.len() == 1 { "" } else { "s" },
            samples.join(", ")
        ));
    }

    if level == AnalysisLevel::Detailed {
        let tone = match sentiment {
            Sentiment::Positive => "The overall tone is positive.",
            Sentiment::Negative => "The overall tone is negative.",
            Sentiment::Neutral => "The overall tone is neutral.",
        };
        out.push(' ');
        out.push_str(tone);
    }

    out.push(' ');
    out.push_str(confidence_qualifier(confidence));
    out
}

fn confidence_qualifier(confidence: f64) -> &'static str {
    if confidence >= 0.75 {
        "This reading is based on strong, recognizable financial vocabulary."
    } else if confidence >= 0.5 {
        "This reading is based on a moderate amount of recognizable financial vocabulary."
    } else {
        "This reading is tentative; only limited financial vocabulary was recognized."
    }
}

fn join_list(items: &[String]) -> String {
    match items.len() {
        0 => String::new(),
        1 => items[0].clone(),
        2 => format!("{} and {}", items[0], items[1]),
        _ => format!(
            "{}, and {}",
            items[..items.len() - 1].join(", "),
            items[items.len() - 1]
        ),
    }
}

/// Single-pass keyword scan used as the caller's last-resort fallback when
/// every transport path is down. Returns the recognized financial terms in
/// order of appearance, deduplicated.
pub fn quick_keyword_scan(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut found = Vec::new();
    for term in vocabulary::HIGH_VALUE_TERMS
        .iter()
        .chain(vocabulary::ADVANCED_TERMS)
        .chain(vocabulary::INTERMEDIATE_TERMS)
        .chain(vocabulary::BEGINNER_TERMS)
    {
        if lower.contains(term) && !found.iter().any(|f| f == term) {
            found.push((*term).to_string());
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::EntityKind;

    #[test]
    fn weight_map_uses_document_distribution() {
        let tokens: Vec<String> = ["rate", "rate", "bond"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let weights = weight_map(&tokens);
        // tf 2 * ln(1 + 3/2) vs tf 1 * ln(1 + 3/1)
        assert!(weights["rate"] > weights["bond"]);
    }

    #[test]
    fn single_occurrence_terms_are_dropped_from_top_terms() {
        let text = "inflation inflation inflation pressures pressures easing";
        let tokens = tokenize(text);
        let top = top_weighted_terms(&tokens);
        assert!(top.iter().any(|(t, _)| t == "inflation"));
        assert!(!top.iter().any(|(t, _)| t == "eas"));
    }

    #[test]
    fn advanced_term_forces_advanced() {
        assert_eq!(
            classify_complexity("a simple note about arbitrage strategies"),
            Complexity::Advanced
        );
    }

    #[test]
    fn intermediate_outranks_beginner() {
        assert_eq!(
            classify_complexity("save money while the interest rate is low"),
            Complexity::Intermediate
        );
    }

    #[test]
    fn plain_text_is_beginner() {
        assert_eq!(
            classify_complexity("save money at the bank"),
            Complexity::Beginner
        );
    }

    #[test]
    fn topics_fall_back_to_all_stems_for_short_inputs() {
        let tokens = tokenize("The Federal Reserve raised interest rates by 0.25%");
        let topics = extract_topics(&[], &tokens);
        assert!(
            topics.iter().any(|t| t == "Interest Rates"),
            "got {topics:?}"
        );
    }

    #[test]
    fn first_topic_rule_wins_and_dedupes() {
        let stems: Vec<String> = ["rate", "interest"].iter().map(|s| s.to_string()).collect();
        let topics = extract_topics(&[], &stems);
        assert_eq!(topics, vec!["Interest Rates".to_string()]);
    }

    #[test]
    fn confidence_clamped_to_unit_interval() {
        let entities: Vec<Entity> = (0..10)
            .map(|i| Entity {
                text: format!("${i}"),
                kind: EntityKind::Currency,
                value: Some(i as f64),
            })
            .collect();
        let top: Vec<(String, f64)> = vec![("rate".to_string(), 100.0)];
        let c = score_confidence(&top, &entities, "interest rate inflation dividend");
        assert!((0.0..=1.0).contains(&c));
    }

    #[test]
    fn analyze_federal_reserve_example() {
        let analysis = analyze(
            "The Federal Reserve raised interest rates by 0.25%",
            AnalysisLevel::Standard,
        );
        assert!(analysis
            .entities
            .iter()
            .any(|e| e.kind == EntityKind::Percentage
                && e.text == "0.25%"
                && e.value == Some(0.25)));
        assert!(analysis.topics.iter().any(|t| t == "Interest Rates"));
        assert_eq!(analysis.complexity, Complexity::Intermediate);
        assert!(!analysis.explanation.is_empty());
    }

    #[test]
    fn analyze_without_financial_content_says_so() {
        let analysis = analyze(
            "the weather was pleasant over the weekend countryside",
            AnalysisLevel::Standard,
        );
        assert!(analysis.explanation.contains("No recognized financial terminology"));
        assert!(analysis.topics.is_empty());
        assert!(analysis.entities.is_empty());
    }

    #[test]
    fn quick_scan_finds_vocabulary() {
        let found = quick_keyword_scan("The Federal Reserve raised interest rates");
        assert!(found.iter().any(|t| t == "interest rate"));
        assert!(found.iter().any(|t| t == "federal reserve"));
    }

    #[test]
    fn quick_scan_empty_for_plain_prose() {
        assert!(quick_keyword_scan("a walk in the park at dusk").is_empty());
    }
}
