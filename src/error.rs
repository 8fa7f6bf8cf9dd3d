//! Crate error types.

use thiserror::Error;

/// Errors raised while reconstructing a game or tag graph from its
/// serialized form.
///
/// Resolution misses (a selector or card query finding nothing) are never
/// errors - they are silent no-ops throughout the engine. Load failures are
/// the one fatal category: a save that names an undocumented tag kind cannot
/// be trusted and the load is aborted.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A tagged record named a kind this build does not document.
    #[error("unknown tag kind `{kind}`")]
    UnknownTagKind { kind: String },

    /// The document was not structurally valid for the expected type.
    #[error("malformed save data: {0}")]
    Malformed(#[from] serde_json::Error),
}
