//! Fuzzy relevance scoring of tree nodes against search tokens.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::tree::{Path, TreeValue};

/// A tree node scored against the search tokens. Ephemeral: produced by
/// [`score_tree`] and consumed immediately by the tree reconstructor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredElement {
    /// Maximum similarity over all tokens, in [0, 1].
    pub score: f64,
    /// Path of the scored node, valid against the tree it was derived from.
    pub path: Path,
    /// The value at that path.
    pub value: TreeValue,
    /// The text that produced the score: the object key, or the leaf itself.
    pub matched_key: String,
}

/// Normalized string similarity: Dice coefficient over character bigrams.
///
/// Whitespace is stripped before comparison. Identical strings score 1.0;
/// strings too short to form a bigram score 0.0 unless identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: String = a.split_whitespace().collect();
    let b: String = b.split_whitespace().collect();
    if a == b {
        return 1.0;
    }
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.len() < 2 || b_chars.len() < 2 {
        return 0.0;
    }

    let mut bigrams: HashMap<(char, char), usize> = HashMap::new();
    for pair in a_chars.windows(2) {
        *bigrams.entry((pair[0], pair[1])).or_insert(0) += 1;
    }
    let mut intersection = 0usize;
    for pair in b_chars.windows(2) {
        if let Some(count) = bigrams.get_mut(&(pair[0], pair[1])) {
            if *count > 0 {
                *count -= 1;
                intersection += 1;
            }
        }
    }
    2.0 * intersection as f64 / (a_chars.len() - 1 + b_chars.len() - 1) as f64
}

/// Scores every string leaf and every object key of `tree` against `tokens`.
///
/// A node's score is the maximum similarity over all tokens; only strictly
/// positive scores are recorded. Object keys are matches in their own right,
/// associated with the key's value path; traversal then continues into the
/// value. Arrays contribute no score of their own. An empty token list
/// returns an empty result without traversing.
pub fn score_tree(tree: &TreeValue, tokens: &[String]) -> Vec<ScoredElement> {
    let mut scored = Vec::new();
    if tokens.is_empty() {
        return scored;
    }
    walk(tree, &Path::root(), tokens, &mut scored);
    scored
}

fn best_score(text: &str, tokens: &[String]) -> f64 {
    let lowered = text.to_lowercase();
    tokens
        .iter()
        .map(|token| similarity(&lowered, token))
        .fold(0.0, f64::max)
}

fn walk(value: &TreeValue, path: &Path, tokens: &[String], scored: &mut Vec<ScoredElement>) {
    match value {
        TreeValue::Object(map) => {
            for (key, child) in map {
                let child_path = path.child_key(key);
                let score = best_score(key, tokens);
                if score > 0.0 {
                    scored.push(ScoredElement {
                        score,
                        path: child_path.clone(),
                        value: child.clone(),
                        matched_key: key.clone(),
                    });
                }
                walk(child, &child_path, tokens, scored);
            }
        }
        TreeValue::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                walk(child, &path.child_index(index), tokens, scored);
            }
        }
        TreeValue::String(text) => {
            let score = best_score(text, tokens);
            if score > 0.0 {
                scored.push(ScoredElement {
                    score,
                    path: path.clone(),
                    value: value.clone(),
                    matched_key: text.clone(),
                });
            }
        }
        _ => {}
    }
}
