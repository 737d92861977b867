use thiserror::Error;

/// Errors produced by the snapshot engine.
///
/// Only contract violations surface as errors: a snapshot text that does not
/// parse, a tree shape the renderer cannot walk, or a reference token the
/// current mapping has never issued. Business-as-usual conditions (no search
/// terms, no matches, zero visible candidates) are valid results, not errors.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Unknown reference token: {0}")]
    UnknownReference(String),

    #[error("Malformed snapshot tree at '{path}': {message}")]
    MalformedTree { path: String, message: String },

    #[error("Failed to parse snapshot text: {0}")]
    Parse(String),

    #[error("Failed to render snapshot: {0}")]
    Render(String),
}

/// Error returned by the browser-automation capability when a visibility
/// query cannot be answered. The engine catches this at the call site and
/// treats the candidate as not visible; it never aborts a snapshot.
#[derive(Error, Debug)]
#[error("Driver query failed: {0}")]
pub struct DriverError(pub String);
