//! Snapshot encoding and relevance filtering for LLM-driven web automation.
//!
//! An agent that acts on a web page needs two things from the page's
//! accessibility tree: a rendition where every interactive element carries a
//! short reference token the model can quote back to request an action, and
//! a relevance-filtered view small enough to be cheap model context without
//! losing the parent/child structure around the elements that matter.
//!
//! Both pipelines operate on the same [`TreeValue`] representation:
//!
//! - [`create_snapshot`] collects a locator candidate for every role line,
//!   gates them through the injected [`UiDriver`] visibility capability,
//!   assigns collision-free reference tokens and re-renders the tree with
//!   `[ref=...]` annotations, producing a [`SnapshotMapping`].
//! - [`filter_snapshot`] tokenizes free task text, fuzzy-scores every node
//!   against the tokens and rebuilds a pruned tree that preserves ancestor
//!   lineage and direct-child context for every match.
//!
//! In practice filtering runs first to shrink the tree, then reference
//! mapping runs on the reduced tree.

pub mod collect;
pub mod errors;
pub mod filter;
pub mod query;
pub mod roles;
pub mod score;
pub mod snapshot;
#[cfg(test)]
mod tests;
pub mod tokenizer;
pub mod tree;

pub use collect::{collect_candidates, LocatorCandidate};
pub use errors::{DriverError, SnapshotError};
pub use filter::{filter_snapshot, reconstruct_tree, DEFAULT_RELEVANCE_THRESHOLD};
pub use query::{LocatorQuery, UiDriver};
pub use roles::{parse_key, ParsedKey, RoleLine};
pub use score::{score_tree, similarity, ScoredElement};
pub use snapshot::{annotate_tree, create_snapshot, generate_reference, SnapshotMapping};
pub use tokenizer::{combined_search_tokens, search_tokens};
pub use tree::{parse_snapshot_text, render_text, Path, PathSegment, TreeValue};
