//! Lexicon-based sentiment scoring.

use super::vocabulary::{NEGATIVE_WORDS, POSITIVE_WORDS};
use crate::provider::Sentiment;

/// Count tokens hitting a lexicon. Suffix stripping can leave stems like
/// "surg" or "losse", so a hit is a shared prefix in either direction.
fn lexicon_hits(tokens: &[String], lexicon: &[&str]) -> usize {
    tokens
        .iter()
        .filter(|t| {
            lexicon
                .iter()
                .any(|w| t.starts_with(w) || w.starts_with(t.as_str()))
        })
        .count()
}

/// Score sentiment from stemmed tokens.
///
/// A polarity wins only when its lexicon count exceeds the other side by
/// more than `max(1, 5% of token count)`; anything closer is neutral.
pub fn score_sentiment(tokens: &[String]) -> Sentiment {
    let positive = lexicon_hits(tokens, POSITIVE_WORDS);
    let negative = lexicon_hits(tokens, NEGATIVE_WORDS);

    let margin = (tokens.len() / 20).max(1);

    if positive > negative + margin {
        Sentiment::Positive
    } else if negative > positive + margin {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}
