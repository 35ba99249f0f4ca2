//! Extractive summarization: pick the highest-scoring sentences and
//! re-emit them in original order.

use super::tokenize::tokenize;
use std::collections::HashMap;

/// Texts shorter than this are returned without a summary.
pub const SUMMARY_MIN_CHARS: usize = 200;

/// Sentences shorter/longer than these bounds are penalized.
const SHORT_SENTENCE_CHARS: usize = 40;
const LONG_SENTENCE_CHARS: usize = 300;

/// Split text into sentences on `.`, `!`, `?` followed by whitespace.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            let boundary = chars.peek().map_or(true, |next| next.is_whitespace());
            if boundary {
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    sentences.push(trimmed.to_string());
                }
                current.clear();
            }
        }
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    sentences
}

/// Build an extractive summary of up to `max_sentences` sentences.
///
/// Each sentence scores the average weight of its tokens, a bonus for
/// containing top-weighted terms, a positional bonus for the first and last
/// sentence, and a penalty for extreme lengths. Returns None for texts below
/// the length threshold or with at most `max_sentences` sentences.
pub fn extractive_summary(
    text: &str,
    weights: &HashMap<String, f64>,
    top_terms: &[(String, f64)],
    max_sentences: usize,
) -> Option<String> {
    if text.chars().count() < SUMMARY_MIN_CHARS {
        return None;
    }

    let sentences = split_sentences(text);
    if sentences.len() <= max_sentences {
        return None;
    }

    let last = sentences.len() - 1;
    let mut scored: Vec<(usize, f64)> = sentences
        .iter()
        .enumerate()
        .map(|(index, sentence)| {
            (index, score_sentence(sentence, index, last, weights, top_terms))
        })
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let mut kept: Vec<usize> = scored.iter().take(max_sentences).map(|(i, _)| *i).collect();
    kept.sort_unstable();

    Some(
        kept.iter()
            .map(|&i| sentences[i].as_str())
            .collect::<Vec<_>>()
            .join(" "),
    )
}

fn score_sentence(
    sentence: &str,
    index: usize,
    last_index: usize,
    weights: &HashMap<String, f64>,
    top_terms: &[(String, f64)],
) -> f64 {
    let tokens = tokenize(sentence);
    let mut score = if tokens.is_empty() {
        0.0
    } else {
        tokens.iter().map(|t| weights.get(t).copied().unwrap_or(0.0)).sum::<f64>()
            / tokens.len() as f64
    };

    let top_hits = tokens
        .iter()
        .filter(|t| top_terms.iter().any(|(term, _)| term == *t))
        .count();
    score += top_hits as f64 * 0.5;

    if index == 0 || index == last_index {
        score += 0.25;
    }

    let chars = sentence.chars().count();
    if chars < SHORT_SENTENCE_CHARS || chars > LONG_SENTENCE_CHARS {
        score -= 0.5;
    }

    score
}
