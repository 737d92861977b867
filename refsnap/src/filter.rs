//! Relevance filtering: structure-preserving tree reconstruction.
//!
//! Given the nodes that scored above threshold, rebuilds a minimal tree that
//! keeps every match together with its full ancestor chain (so a model can
//! see where the element lives) and the direct children of every matched
//! container (so a model can see what is directly inside it). Unrelated
//! siblings and deep unrelated descendants are pruned.

use std::collections::HashSet;

use tracing::debug;

use crate::score::{score_tree, ScoredElement};
use crate::tree::{Path, TreeValue};

/// Default minimum similarity for a scored node to count as a match.
pub const DEFAULT_RELEVANCE_THRESHOLD: f64 = 0.3;

/// Shrinks `tree` to the branches relevant to `terms`.
///
/// Terms are lowercased; empty terms, or zero nodes scoring at or above
/// `threshold`, degrade to the original tree unchanged rather than failing
/// the step.
pub fn filter_snapshot(tree: &TreeValue, terms: &[String], threshold: f64) -> TreeValue {
    let tokens: Vec<String> = terms
        .iter()
        .map(|t| t.to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        return tree.clone();
    }
    let matches: Vec<ScoredElement> = score_tree(tree, &tokens)
        .into_iter()
        .filter(|element| element.score >= threshold)
        .collect();
    debug!(
        token_count = tokens.len(),
        match_count = matches.len(),
        "filtering snapshot"
    );
    reconstruct_tree(tree, &matches)
}

/// Rebuilds a pruned tree from the matched elements.
///
/// An empty match list returns the original tree unchanged. Otherwise a node
/// survives only if its path is a match or an ancestor of one; directly
/// matched nodes additionally keep each immediate child verbatim when the
/// child's own pruned result would be dropped.
pub fn reconstruct_tree(tree: &TreeValue, matches: &[ScoredElement]) -> TreeValue {
    if matches.is_empty() {
        return tree.clone();
    }
    let mut required: HashSet<String> = HashSet::new();
    let mut matched: HashSet<String> = HashSet::new();
    for element in matches {
        required.extend(element.path.prefix_keys());
        matched.insert(element.path.encode());
    }
    // The root is a prefix of every match, so a non-empty match list always
    // keeps the root.
    prune(tree, &Path::root(), &required, &matched).unwrap_or_else(|| tree.clone())
}

fn prune(
    value: &TreeValue,
    path: &Path,
    required: &HashSet<String>,
    matched: &HashSet<String>,
) -> Option<TreeValue> {
    let encoded = path.encode();
    if !required.contains(&encoded) {
        return None;
    }
    let is_match = matched.contains(&encoded);
    match value {
        TreeValue::Object(map) => {
            let mut kept = serde_json::Map::new();
            for (key, child) in map {
                let child_path = path.child_key(key);
                if let Some(pruned) = prune(child, &child_path, required, matched) {
                    kept.insert(key.clone(), pruned);
                } else if is_match {
                    // A match on a container always shows its direct
                    // children, even when nothing below them matched.
                    kept.insert(key.clone(), child.clone());
                }
            }
            if kept.is_empty() {
                return is_match.then(|| value.clone());
            }
            Some(TreeValue::Object(kept))
        }
        TreeValue::Array(items) => {
            let mut kept = Vec::new();
            for (index, child) in items.iter().enumerate() {
                let child_path = path.child_index(index);
                if let Some(pruned) = prune(child, &child_path, required, matched) {
                    kept.push(pruned);
                } else if is_match {
                    kept.push(child.clone());
                }
            }
            if kept.is_empty() {
                return is_match.then(|| value.clone());
            }
            Some(TreeValue::Array(kept))
        }
        leaf => Some(leaf.clone()),
    }
}
