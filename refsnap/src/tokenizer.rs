//! Search-token extraction from free task text.

use once_cell::sync::Lazy;
use regex::Regex;

static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]+)"|'([^']+)'"#).unwrap());

/// Extracts lowercase search tokens from free text.
///
/// Single- or double-quoted substrings become standalone tokens (quotes
/// stripped) and come first; the remainder is split on whitespace into word
/// tokens. Tokens are not de-duplicated within one call.
pub fn search_tokens(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = QUOTED
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_lowercase())
        .collect();
    let remainder = QUOTED.replace_all(text, " ");
    tokens.extend(remainder.split_whitespace().map(str::to_lowercase));
    tokens
}

/// Tokenizes two related texts (typically a step's action and its expected
/// outcome) and de-duplicates the combined set, preserving first-seen order.
pub fn combined_search_tokens(action: &str, expectation: &str) -> Vec<String> {
    let mut combined = search_tokens(action);
    combined.extend(search_tokens(expectation));
    let mut seen = std::collections::HashSet::new();
    combined.retain(|token| seen.insert(token.clone()));
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_phrases_come_before_words() {
        let tokens = search_tokens("click the \"Sign in\" button");
        assert_eq!(tokens, ["sign in", "click", "the", "button"]);
    }

    #[test]
    fn single_quotes_are_stripped_too() {
        let tokens = search_tokens("type 'hello world' then submit");
        assert_eq!(tokens, ["hello world", "type", "then", "submit"]);
    }

    #[test]
    fn empty_and_whitespace_input_yield_nothing() {
        assert!(search_tokens("").is_empty());
        assert!(search_tokens("   \t\n").is_empty());
    }

    #[test]
    fn no_dedup_within_one_call() {
        assert_eq!(search_tokens("save save"), ["save", "save"]);
    }

    #[test]
    fn combined_tokens_are_deduplicated() {
        let tokens = combined_search_tokens("click \"Save\"", "the save button is disabled");
        assert_eq!(tokens, ["save", "click", "the", "button", "is", "disabled"]);
    }
}
