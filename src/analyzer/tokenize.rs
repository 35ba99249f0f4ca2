//! Tokenization: normalization, filtering, and suffix stripping.

use super::vocabulary::{STOP_WORDS, SUFFIX_RULES};

/// Minimum characters a stem must keep after suffix stripping.
const MIN_STEM_LEN: usize = 3;

/// Split text into normalized tokens.
///
/// Lowercases, strips punctuation except currency/percent symbols, drops
/// tokens of two characters or fewer, pure numbers, and stop-words, then
/// applies the suffix-stripping rules.
///
/// # Examples
///
/// ```
/// use finlens::analyzer::tokenize::tokenize;
///
/// let tokens = tokenize("The banks raised rates.");
/// assert_eq!(tokens, vec!["bank", "rais", "rate"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(normalize_word)
        .filter(|t| t.chars().count() > 2)
        .filter(|t| !is_pure_number(t))
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
        .map(|t| stem(&t))
        .collect()
}

/// Lowercase a word and drop punctuation, keeping currency and percent
/// symbols and the decimal points inside numbers.
fn normalize_word(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '$' | '%' | '€' | '£' | '.' | ','))
        .collect::<String>()
        .trim_matches(|c| matches!(c, '.' | ','))
        .to_lowercase()
}

/// True for tokens that are digits with optional separators, e.g. "2024" or
/// "1,000.50" (but not "0.25%", which keeps its percent symbol).
fn is_pure_number(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | ','))
}

/// Strip one suffix using the fixed rule table; the first matching rule wins.
///
/// # Examples
///
/// ```
/// use finlens::analyzer::tokenize::stem;
///
/// assert_eq!(stem("companies"), "company");
/// assert_eq!(stem("rates"), "rate");
/// assert_eq!(stem("raised"), "rais");
/// ```
pub fn stem(token: &str) -> String {
    for (suffix, replacement) in SUFFIX_RULES {
        if let Some(base) = token.strip_suffix(suffix) {
            if base.chars().count() >= MIN_STEM_LEN {
                return format!("{base}{replacement}");
            }
        }
    }
    token.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_short_tokens_numbers_and_stop_words() {
        let tokens = tokenize("The US had 500 of them in 2024");
        assert!(tokens.is_empty(), "got {tokens:?}");
    }

    #[test]
    fn keeps_percent_and_currency_tokens() {
        let tokens = tokenize("rates rose 0.25% to $500");
        assert!(tokens.contains(&"0.25%".to_string()));
        assert!(tokens.contains(&"$500".to_string()));
    }

    #[test]
    fn first_matching_suffix_rule_wins() {
        // "ies" applies before the bare "s" rule.
        assert_eq!(stem("liabilities"), "liability");
        // "ing" before "s" is irrelevant here; "ing" is simply removed.
        assert_eq!(stem("investing"), "invest");
        assert_eq!(stem("earned"), "earn");
    }

    #[test]
    fn stem_keeps_short_words_intact() {
        assert_eq!(stem("gas"), "gas");
        assert_eq!(stem("red"), "red");
    }

    #[test]
    fn tokenize_is_deterministic() {
        let a = tokenize("Inflation eroded savings across markets.");
        let b = tokenize("Inflation eroded savings across markets.");
        assert_eq!(a, b);
    }
}
