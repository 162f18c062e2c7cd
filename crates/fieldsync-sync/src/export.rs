//! Store → file exports.
//!
//! The whole-store snapshot goes to the aggregate file and stamps the
//! last-sync marker; per-group pushes write `groups/<slug>.json`.

use chrono::Utc;
use fieldsync_core::document::FieldDocument;
use fieldsync_core::responses::ExportSummary;
use fieldsync_db::store::SchemaStore;
use serde::Serialize;

use crate::canonical::{build_record, build_snapshot};
use crate::error::SyncError;
use crate::gateway::SyncGateway;

/// Anything that can write the whole store to the aggregate file.
///
/// The debouncer only needs this, which keeps it testable with a counter.
#[allow(async_fn_in_trait)]
pub trait SnapshotExporter {
    async fn export_snapshot(&self) -> Result<ExportSummary, SyncError>;
}

/// One group written by a push.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PushedGroup {
    pub slug: String,
    pub path: String,
    pub checksum: String,
}

pub struct StoreExporter<'a, S> {
    store: &'a S,
    gateway: &'a SyncGateway,
    module_version: &'a str,
}

impl<'a, S: SchemaStore> StoreExporter<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S, gateway: &'a SyncGateway, module_version: &'a str) -> Self {
        Self {
            store,
            gateway,
            module_version,
        }
    }

    /// Write one group's file.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::UnknownGroup` if the store has no such group, or
    /// any store or filesystem failure.
    pub async fn push_group(&self, slug: &str) -> Result<PushedGroup, SyncError> {
        let group = self
            .store
            .find_group_by_slug(slug)
            .await?
            .ok_or_else(|| SyncError::UnknownGroup(slug.to_string()))?;
        let record = build_record(self.store, &group, self.module_version).await?;
        let path = self.gateway.write_record(&record)?;
        tracing::info!(slug, path = %path.display(), "pushed group");
        Ok(PushedGroup {
            slug: record.group.slug,
            path: path.display().to_string(),
            checksum: record.checksum,
        })
    }

    /// Write every store group's file. Files for groups not in the store are
    /// left alone.
    ///
    /// # Errors
    ///
    /// Stops at the first store or filesystem failure.
    pub async fn push_all(&self) -> Result<Vec<PushedGroup>, SyncError> {
        let mut pushed = Vec::new();
        for group in self.store.find_all_groups().await? {
            pushed.push(self.push_group(&group.slug).await?);
        }
        Ok(pushed)
    }
}

impl<S: SchemaStore> SnapshotExporter for StoreExporter<'_, S> {
    /// Write the whole store to the aggregate file and stamp the last-sync
    /// marker.
    ///
    /// Refuses to replace a file describing groups with an empty snapshot;
    /// the file is left untouched.
    async fn export_snapshot(&self) -> Result<ExportSummary, SyncError> {
        let snapshot = build_snapshot(self.store, self.module_version).await?;

        if snapshot.groups.is_empty() {
            let existing_groups = self.gateway.snapshot_group_count()?;
            if existing_groups > 0 {
                tracing::warn!(existing_groups, "refusing to export an empty store");
                return Err(SyncError::EmptySourceGuard {
                    target: "the sync file",
                    existing_groups,
                });
            }
        }

        let path = self.gateway.write_snapshot(&snapshot)?;
        self.store.set_last_sync_at(Utc::now()).await?;

        let fields = snapshot
            .groups
            .iter()
            .flat_map(|g| g.fields.iter())
            .map(FieldDocument::tree_len)
            .sum::<usize>();
        let summary = ExportSummary {
            path: path.display().to_string(),
            exported_at: snapshot.exported_at,
            groups: u32::try_from(snapshot.groups.len()).unwrap_or(u32::MAX),
            fields: u32::try_from(fields).unwrap_or(u32::MAX),
            values: u32::try_from(snapshot.values.len()).unwrap_or(u32::MAX),
        };
        tracing::info!(
            path = %summary.path,
            groups = summary.groups,
            fields = summary.fields,
            values = summary.values,
            "exported store snapshot"
        );
        Ok(summary)
    }
}
