//! Sync engine error types.
//!
//! Per-group import failures and unresolved value references are not errors:
//! they are reported inside [`fieldsync_core::responses::ImportResult`].

use std::path::{Path, PathBuf};

use fieldsync_config::ConfigError;
use fieldsync_db::error::DatabaseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// The document is malformed or incomplete. Nothing was written.
    #[error("Invalid sync document: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Directory creation, file read, or file write failed.
    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Refused to replace a side holding groups with an empty one: an empty
    /// export over a populated file, or an empty replace import over a
    /// populated store.
    #[error("Refusing to replace {target} holding {existing_groups} group(s) with an empty source")]
    EmptySourceGuard {
        target: &'static str,
        existing_groups: usize,
    },

    /// Could not take the exclusive write lock.
    #[error("Could not lock {}: {reason}", path.display())]
    Lock { path: PathBuf, reason: String },

    /// The slug cannot be used as a file name.
    #[error("Invalid slug '{0}'")]
    InvalidSlug(String),

    /// No group with this slug exists on the side being read.
    #[error("Unknown group '{0}'")]
    UnknownGroup(String),

    /// The sync feature flag is off.
    #[error("Sync is disabled (set sync.enabled = true)")]
    Disabled,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    pub(crate) fn fs(path: &Path, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.to_path_buf(),
            source,
        }
    }
}
