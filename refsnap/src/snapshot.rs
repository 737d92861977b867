//! Snapshot mapping: visibility gating, reference allocation and rendering.
//!
//! The observe step of the agent loop: collect locator candidates from the
//! tree, ask the automation collaborator which are currently visible, assign
//! each visible occurrence a short random reference token, and re-render the
//! tree with those tokens injected. The resulting [`SnapshotMapping`] is the
//! only artifact that outlives the request; the caller holds it until the
//! next snapshot supersedes it wholesale.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use rand::Rng;
use tracing::{debug, instrument};

use crate::collect::{collect_candidates, LocatorCandidate};
use crate::errors::SnapshotError;
use crate::query::{LocatorQuery, UiDriver};
use crate::tree::{render_text, Path, TreeValue};

/// Length of a reference token.
pub const REFERENCE_LENGTH: usize = 6;

const REFERENCE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Draws a collision-free token against the caller-owned used-set.
///
/// Uniform random draw per character; regenerated on collision. Tokens are
/// random rather than sequential so a model cannot infer tree structure
/// from their values. Uniqueness holds only within the set's lifetime,
/// which the caller scopes to one mapping.
pub fn generate_reference(used: &HashSet<String>) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let token: String = (0..REFERENCE_LENGTH)
            .map(|_| REFERENCE_ALPHABET[rng.gen_range(0..REFERENCE_ALPHABET.len())] as char)
            .collect();
        if !used.contains(&token) {
            return token;
        }
    }
}

/// The product of one observe step.
///
/// Superseded wholesale by the next snapshot; tokens from an old mapping are
/// invalid the moment a new one exists.
#[derive(Debug)]
pub struct SnapshotMapping {
    /// Annotated structural text for model consumption.
    pub rendered_text: String,
    /// Reference token to the query the tool layer resolves it with.
    pub references: HashMap<String, Arc<LocatorQuery>>,
    /// The visible candidates, in document order.
    pub entries: Vec<LocatorCandidate>,
}

impl SnapshotMapping {
    /// Resolves a model-supplied reference token back to its locator query.
    ///
    /// An unknown token is a hard error: the model asked to act on an
    /// element that does not exist this turn, and guessing would act on the
    /// wrong element.
    pub fn query_for(&self, token: &str) -> Result<Arc<LocatorQuery>, SnapshotError> {
        self.references
            .get(token)
            .cloned()
            .ok_or_else(|| SnapshotError::UnknownReference(token.to_string()))
    }
}

/// Builds a [`SnapshotMapping`] for `tree`.
///
/// Visibility queries are issued concurrently and joined back in candidate
/// order, so sibling-index-derived signatures stay deterministic. A query
/// that fails is treated as not visible and never aborts the snapshot.
#[instrument(skip(tree, driver))]
pub async fn create_snapshot(
    tree: &TreeValue,
    driver: &dyn UiDriver,
) -> Result<SnapshotMapping, SnapshotError> {
    let candidates = collect_candidates(tree)?;

    let checks = candidates.iter().map(|candidate| async move {
        match driver.is_visible(&candidate.query).await {
            Ok(visible) => visible,
            Err(error) => {
                debug!(query = %candidate.query, %error, "visibility query failed, treating as hidden");
                false
            }
        }
    });
    let visibility = join_all(checks).await;

    let mut used: HashSet<String> = HashSet::new();
    let mut references: HashMap<String, Arc<LocatorQuery>> = HashMap::new();
    let mut tokens_by_path: HashMap<String, String> = HashMap::new();
    let mut entries = Vec::new();
    for (candidate, visible) in candidates.into_iter().zip(visibility) {
        if !visible {
            continue;
        }
        // Every occurrence gets its own token, each bound to the candidate's
        // query, so duplicated role lines never share an ambiguous token.
        for path in &candidate.paths {
            let token = generate_reference(&used);
            used.insert(token.clone());
            tokens_by_path.insert(path.encode(), token.clone());
            references.insert(token, candidate.query.clone());
        }
        entries.push(candidate);
    }
    debug!(
        visible_candidates = entries.len(),
        reference_count = references.len(),
        "snapshot mapping built"
    );

    let annotated = annotate_tree(tree, &tokens_by_path);
    let rendered_text = render_text(&annotated)?;
    Ok(SnapshotMapping {
        rendered_text,
        references,
        entries,
    })
}

/// Re-walks the original tree, appending ` [ref=<token>]` to every
/// label whose path has an assigned token. Everything else, including role
/// lines that never got a token, is emitted unchanged; with an empty token
/// map this is the identity.
pub fn annotate_tree(tree: &TreeValue, tokens_by_path: &HashMap<String, String>) -> TreeValue {
    annotate(tree, &Path::root(), tokens_by_path)
}

fn annotate(value: &TreeValue, path: &Path, tokens: &HashMap<String, String>) -> TreeValue {
    match value {
        TreeValue::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, child) in map {
                let child_path = path.child_key(key);
                let rendered_key = match tokens.get(&child_path.encode()) {
                    Some(token) => format!("{key} [ref={token}]"),
                    None => key.clone(),
                };
                out.insert(rendered_key, annotate(child, &child_path, tokens));
            }
            TreeValue::Object(out)
        }
        TreeValue::Array(items) => TreeValue::Array(
            items
                .iter()
                .enumerate()
                .map(|(index, child)| {
                    let child_path = path.child_index(index);
                    if let TreeValue::String(label) = child {
                        if let Some(token) = tokens.get(&child_path.encode()) {
                            return TreeValue::String(format!("{label} [ref={token}]"));
                        }
                    }
                    annotate(child, &child_path, tokens)
                })
                .collect(),
        ),
        leaf => leaf.clone(),
    }
}
