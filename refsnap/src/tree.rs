//! Generic tree representation shared by both pipelines.
//!
//! A snapshot is held as a [`TreeValue`] (a `serde_json::Value` built with
//! the `preserve_order` feature, so object key order mirrors document order).
//! Locations inside a tree are addressed by [`Path`] values that are threaded
//! explicitly through every recursive walk; a path is only meaningful against
//! the exact tree it was derived from.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::SnapshotError;

/// The recursive value type used for raw, filtered and rendered snapshots.
/// Object key order is insertion order and is semantically meaningful.
pub type TreeValue = Value;

/// One step of a [`Path`]: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// An ordered sequence of segments identifying a unique location in a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// The empty path, addressing the tree root.
    pub fn root() -> Self {
        Path::default()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns a new path extended by an object key. The receiver is not
    /// mutated; walks clone-and-push so sibling branches never share a buffer.
    pub fn child_key(&self, key: &str) -> Path {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.to_string()));
        Path { segments }
    }

    /// Returns a new path extended by an array index.
    pub fn child_index(&self, index: usize) -> Path {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Path { segments }
    }

    /// Encodes the path to its canonical string key.
    ///
    /// Key segments are prefixed `/k`, index segments `/i`, and `%` / `/`
    /// inside keys are percent-escaped, so two distinct paths can never
    /// encode to the same key. The root encodes to the empty string.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                PathSegment::Key(key) => {
                    out.push_str("/k");
                    out.push_str(&key.replace('%', "%25").replace('/', "%2F"));
                }
                PathSegment::Index(index) => {
                    out.push_str(&format!("/i{index}"));
                }
            }
        }
        out
    }

    /// Decodes a key produced by [`Path::encode`]. Returns `None` for any
    /// string that is not a canonical encoding.
    pub fn decode(encoded: &str) -> Option<Path> {
        let mut segments = Vec::new();
        if encoded.is_empty() {
            return Some(Path::root());
        }
        let mut parts = encoded.split('/');
        if !parts.next()?.is_empty() {
            return None;
        }
        for part in parts {
            let rest = part.get(1..)?;
            match part.as_bytes().first()? {
                b'k' => segments.push(PathSegment::Key(
                    rest.replace("%2F", "/").replace("%25", "%"),
                )),
                b'i' => segments.push(PathSegment::Index(rest.parse().ok()?)),
                _ => return None,
            }
        }
        Some(Path { segments })
    }

    /// Encoded keys of every prefix of this path, from the root (`""`) up to
    /// and including the path itself. This is the unit the tree
    /// reconstructor accumulates into its required-paths set.
    pub fn prefix_keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.segments.len() + 1);
        let mut partial = Path::root();
        keys.push(partial.encode());
        for segment in &self.segments {
            partial.segments.push(segment.clone());
            keys.push(partial.encode());
        }
        keys
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "$")?;
        for segment in &self.segments {
            match segment {
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Parses raw accessibility-snapshot text into a [`TreeValue`].
///
/// The wire format is YAML-shaped structural text (role lines as mapping
/// keys, nested children as mapping values or sequences). A text that does
/// not deserialize indicates a collaborator contract violation and is fatal
/// for the snapshot request.
pub fn parse_snapshot_text(text: &str) -> Result<TreeValue, SnapshotError> {
    serde_yaml::from_str(text).map_err(|e| SnapshotError::Parse(e.to_string()))
}

/// Serializes a (possibly annotated) tree back to structural text.
pub fn render_text(tree: &TreeValue) -> Result<String, SnapshotError> {
    serde_yaml::to_string(tree).map_err(|e| SnapshotError::Render(e.to_string()))
}
