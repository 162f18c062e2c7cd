//! Structured results returned by sync operations.
//!
//! Multi-step operations (import, push, auto-sync) report through these
//! types rather than through errors, so callers can surface itemized
//! created/updated/failed collections. The CLI prints them as JSON.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{AutoSyncState, ImportMode, SyncAction, SyncState};

/// A group whose create or update failed during a multi-group import.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct GroupImportError {
    pub slug: String,
    pub message: String,
}

/// Outcome of an import.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ImportResult {
    pub success: bool,
    pub message: String,
    pub mode: ImportMode,
    pub created: Vec<String>,
    pub updated: Vec<String>,
    /// Groups removed by a replace import.
    pub deleted: Vec<String>,
    pub errors: Vec<GroupImportError>,
    /// Validation findings. Non-empty means nothing was written.
    pub violations: Vec<String>,
    pub fields_imported: u32,
    pub values_imported: u32,
    /// Values whose field slug was not part of the import.
    pub values_skipped: u32,
}

impl ImportResult {
    /// An empty result for an import about to run.
    #[must_use]
    pub const fn started(mode: ImportMode) -> Self {
        Self {
            success: false,
            message: String::new(),
            mode,
            created: Vec::new(),
            updated: Vec::new(),
            deleted: Vec::new(),
            errors: Vec::new(),
            violations: Vec::new(),
            fields_imported: 0,
            values_imported: 0,
            values_skipped: 0,
        }
    }

    /// A result for a document that failed validation.
    #[must_use]
    pub fn rejected(mode: ImportMode, violations: Vec<String>) -> Self {
        Self {
            message: format!(
                "Import rejected: {} validation error(s), no changes made",
                violations.len()
            ),
            violations,
            ..Self::started(mode)
        }
    }

    /// Discard the applied changes after the whole document was rolled
    /// back; group errors stay so the caller can see why.
    pub fn roll_back(&mut self) {
        self.created.clear();
        self.updated.clear();
        self.deleted.clear();
        self.fields_imported = 0;
        self.values_imported = 0;
        self.values_skipped = 0;
        self.success = false;
        self.message = format!(
            "Import rolled back: {} failed group(s), no changes kept",
            self.errors.len()
        );
    }

    /// Whether any group was created, updated, or deleted.
    #[must_use]
    pub fn touched_store(&self) -> bool {
        !(self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty())
    }

    /// Set `success` and `message` from the collected outcome.
    pub fn finish(&mut self) {
        self.success = self.errors.is_empty() && self.violations.is_empty();
        self.message = if self.success {
            format!(
                "Imported {} group(s) ({} created, {} updated), {} field(s), {} value(s)",
                self.created.len() + self.updated.len(),
                self.created.len(),
                self.updated.len(),
                self.fields_imported,
                self.values_imported
            )
        } else {
            format!(
                "Import finished with {} failed group(s); {} created, {} updated",
                self.errors.len(),
                self.created.len(),
                self.updated.len()
            )
        };
    }
}

/// Classification of one group.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct GroupStatus {
    pub slug: String,
    pub state: SyncState,
    pub action: SyncAction,
    pub store_checksum: Option<String>,
    pub file_checksum: Option<String>,
    /// The file's recorded checksum no longer matches its content.
    #[serde(default)]
    pub recorded_checksum_stale: bool,
}

impl GroupStatus {
    #[must_use]
    pub fn new(slug: impl Into<String>, state: SyncState) -> Self {
        Self {
            slug: slug.into(),
            state,
            action: state.recommended_action(),
            store_checksum: None,
            file_checksum: None,
            recorded_checksum_stale: false,
        }
    }
}

/// Classification of every group on both sides.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct GlobalStatus {
    pub state: SyncState,
    pub action: SyncAction,
    pub groups: Vec<GroupStatus>,
    pub counts: BTreeMap<String, u32>,
}

impl GlobalStatus {
    /// Build from per-group results; the overall state is `synced` only when
    /// every group is.
    #[must_use]
    pub fn from_groups(groups: Vec<GroupStatus>) -> Self {
        let mut counts = BTreeMap::new();
        for g in &groups {
            *counts.entry(g.state.as_str().to_string()).or_insert(0) += 1;
        }
        let state = if groups.is_empty() {
            SyncState::NoFile
        } else if groups.iter().all(|g| g.state == SyncState::Synced) {
            SyncState::Synced
        } else {
            SyncState::Modified
        };
        Self {
            state,
            action: state.recommended_action(),
            groups,
            counts,
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self {
            state: SyncState::Disabled,
            action: SyncState::Disabled.recommended_action(),
            groups: Vec::new(),
            counts: BTreeMap::new(),
        }
    }
}

/// What an export wrote.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: String,
    pub exported_at: String,
    pub groups: u32,
    pub fields: u32,
    pub values: u32,
}

/// What the auto-sync runner observed and did.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AutoSyncReport {
    pub state: AutoSyncState,
    pub import: Option<ImportResult>,
    pub export: Option<ExportSummary>,
}
