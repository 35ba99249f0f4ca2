//! Regex entity extraction: currency amounts, percentages, institutions.

use crate::provider::{Entity, EntityKind};
use regex::Regex;
use std::sync::LazyLock;

static CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[$€£]\s?\d+(?:,\d{3})*(?:\.\d+)?(?:\s?(?:thousand|million|billion|trillion))?")
        .expect("currency pattern")
});

static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?\s?%").expect("percent pattern"));

static INSTITUTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:[A-Z][A-Za-z&]+\s+)+(?:Bank|Corp|Inc|Group|Fund|Reserve|Capital|Holdings|Trust|Exchange)\b",
    )
    .expect("institution pattern")
});

/// Scan text for currency amounts, percentages, and institution names.
///
/// Matches are returned in category order (currency, percentage,
/// institution), each as an [`Entity`] with a numeric value where one can be
/// parsed.
pub fn extract_entities(text: &str) -> Vec<Entity> {
    let mut entities = Vec::new();

    for m in CURRENCY_RE.find_iter(text) {
        entities.push(Entity {
            text: m.as_str().to_string(),
            kind: EntityKind::Currency,
            value: parse_currency(m.as_str()),
        });
    }

    for m in PERCENT_RE.find_iter(text) {
        let digits = m.as_str().trim_end_matches('%').trim();
        entities.push(Entity {
            text: m.as_str().to_string(),
            kind: EntityKind::Percentage,
            value: digits.parse().ok(),
        });
    }

    for m in INSTITUTION_RE.find_iter(text) {
        // Leading articles are part of the capitalized run but not the name.
        let name = m.as_str().trim_start_matches("The ").trim();
        entities.push(Entity {
            text: name.to_string(),
            kind: EntityKind::Institution,
            value: None,
        });
    }

    entities
}

fn parse_currency(raw: &str) -> Option<f64> {
    let stripped: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let base: f64 = stripped.parse().ok()?;
    let lower = raw.to_lowercase();
    let multiplier = if lower.contains("trillion") {
        1e12
    } else if lower.contains("billion") {
        1e9
    } else if lower.contains("million") {
        1e6
    } else if lower.contains("thousand") {
        1e3
    } else {
        1.0
    };
    Some(base * multiplier)
}
