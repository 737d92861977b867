//! Locator-candidate collection.
//!
//! Walks a snapshot tree in document order and derives, for every role line,
//! the query needed to later obtain a live element handle from the
//! automation collaborator. Candidates whose derived query is identical are
//! collapsed to one entry, with every occurrence's path recorded so the
//! renderer can still annotate each of them.

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::SnapshotError;
use crate::query::LocatorQuery;
use crate::roles::{parse_key, ParsedKey, RoleLine};
use crate::tree::{Path, TreeValue};

/// A role line resolved to a draft element query.
#[derive(Debug, Clone)]
pub struct LocatorCandidate {
    /// Every path whose role line resolves to this query, in document order.
    /// The first entry is the occurrence that created the candidate.
    pub paths: Vec<Path>,
    pub query: Arc<LocatorQuery>,
}

impl LocatorCandidate {
    pub fn primary_path(&self) -> &Path {
        &self.paths[0]
    }
}

/// Sibling-index counters, keyed by lowercased role. A fresh map starts at
/// each array boundary and at each role-line scope; plain object recursion
/// shares its parent's map.
type SiblingCounters = HashMap<String, usize>;

/// Collects the ordered list of locator candidates from a snapshot tree.
///
/// Document order matters: sibling indices for unnamed role lines are
/// assigned in traversal order. A scalar root is a collaborator contract
/// violation and fatal for the request.
pub fn collect_candidates(tree: &TreeValue) -> Result<Vec<LocatorCandidate>, SnapshotError> {
    if !tree.is_object() && !tree.is_array() {
        return Err(SnapshotError::MalformedTree {
            path: Path::root().to_string(),
            message: "snapshot root must be an object or array".to_string(),
        });
    }
    let mut collector = Collector::default();
    let mut counters = SiblingCounters::new();
    collector.walk(tree, &Path::root(), None, &mut counters);
    Ok(collector.candidates)
}

#[derive(Default)]
struct Collector {
    candidates: Vec<LocatorCandidate>,
    // Keyed by the query itself (field-for-field, parent chain included).
    // Text filters are raw page text and may contain any characters the
    // query's Display uses, so a rendered string is not a safe dedup key.
    seen: HashMap<Arc<LocatorQuery>, usize>,
}

impl Collector {
    fn walk(
        &mut self,
        value: &TreeValue,
        path: &Path,
        scope: Option<&Arc<LocatorQuery>>,
        counters: &mut SiblingCounters,
    ) {
        match value {
            TreeValue::Object(map) => {
                for (key, child) in map {
                    let child_path = path.child_key(key);
                    match parse_key(key) {
                        ParsedKey::Role(line) => {
                            let query = self.emit(&line, child, &child_path, scope, counters);
                            // Descendants resolve within the new scope.
                            let mut inner = SiblingCounters::new();
                            self.walk(child, &child_path, Some(&query), &mut inner);
                        }
                        ParsedKey::Opaque => {
                            self.walk(child, &child_path, scope, counters);
                        }
                    }
                }
            }
            TreeValue::Array(items) => {
                let mut array_counters = SiblingCounters::new();
                for (index, item) in items.iter().enumerate() {
                    let child_path = path.child_index(index);
                    if let TreeValue::String(label) = item {
                        // Bare strings under an array index can be role
                        // lines too; they have no value to descend into.
                        if let ParsedKey::Role(line) = parse_key(label) {
                            self.emit(&line, &TreeValue::Null, &child_path, scope, &mut array_counters);
                        }
                        continue;
                    }
                    self.walk(item, &child_path, scope, &mut array_counters);
                }
            }
            _ => {}
        }
    }

    /// Builds the query for one role line, deduplicates it, and returns the
    /// query descendants should use as their parent scope.
    fn emit(
        &mut self,
        line: &RoleLine,
        value: &TreeValue,
        path: &Path,
        scope: Option<&Arc<LocatorQuery>>,
        counters: &mut SiblingCounters,
    ) -> Arc<LocatorQuery> {
        // Only unnamed role lines need a sibling index; an accessible name
        // already disambiguates.
        let nth = if line.name.is_none() {
            let counter = counters.entry(line.role.to_lowercase()).or_insert(0);
            let index = *counter;
            *counter += 1;
            Some(index)
        } else {
            None
        };
        let has_text = if line.name.is_none() {
            value.as_str().map(str::to_string)
        } else {
            None
        };
        let query = Arc::new(LocatorQuery {
            parent: scope.cloned(),
            role: line.role.clone(),
            name: line.name.clone(),
            nth,
            has_text,
        });

        if let Some(&index) = self.seen.get(&query) {
            let existing = &mut self.candidates[index];
            existing.paths.push(path.clone());
            return existing.query.clone();
        }
        self.seen.insert(query.clone(), self.candidates.len());
        self.candidates.push(LocatorCandidate {
            paths: vec![path.clone()],
            query: query.clone(),
        });
        query
    }
}
