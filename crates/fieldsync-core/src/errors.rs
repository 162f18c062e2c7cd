//! Cross-cutting error types for fieldsync.
//!
//! Domain-specific errors (`DatabaseError`, `SyncError`) are defined in their
//! respective crates. A unified error is deferred to `fieldsync-cli` where all
//! crate errors converge into `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any fieldsync crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {key}")]
    NotFound { entity_type: String, key: String },

    /// A field type tag outside the closed set.
    #[error("Unknown field type: {0}")]
    UnknownFieldType(String),

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
