//! Start-of-run reconciliation between the store and the aggregate file.
//!
//! The store side's timestamp is the later of its last mutation and its last
//! export, so a file this process just wrote never looks newer than the
//! store that produced it.

use chrono::Duration;
use fieldsync_core::enums::{AutoSyncState, ImportMode};
use fieldsync_core::responses::AutoSyncReport;
use fieldsync_db::store::SchemaStore;

use crate::canonical::parse_document;
use crate::error::SyncError;
use crate::export::{SnapshotExporter, StoreExporter};
use crate::gateway::SyncGateway;
use crate::import::{ImportOptions, ImportResolver};
use crate::status::classify_timestamps;

pub struct AutoSyncRunner<'a, S> {
    store: &'a S,
    gateway: &'a SyncGateway,
    module_version: &'a str,
    tolerance: Duration,
}

impl<'a, S: SchemaStore> AutoSyncRunner<'a, S> {
    #[must_use]
    pub const fn new(
        store: &'a S,
        gateway: &'a SyncGateway,
        module_version: &'a str,
        tolerance: Duration,
    ) -> Self {
        Self {
            store,
            gateway,
            module_version,
            tolerance,
        }
    }

    /// Classify without acting.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` on store reads or file metadata failures.
    pub async fn check(&self) -> Result<AutoSyncState, SyncError> {
        let store_groups = self.store.find_all_groups().await?.len();
        let store_at = match (
            self.store.store_modified_at().await?,
            self.store.last_sync_at().await?,
        ) {
            (Some(modified), Some(synced)) => Some(modified.max(synced)),
            (modified, synced) => modified.or(synced),
        };
        let file_at = self.gateway.snapshot_modified_at()?;
        let file_groups = self.gateway.snapshot_group_count()?;

        let state = classify_timestamps(store_at, store_groups, file_at, file_groups, self.tolerance);
        tracing::debug!(%state, store_groups, file_groups, "auto-sync classification");
        Ok(state)
    }

    /// Classify and act: import a newer file (replace), export a newer store.
    ///
    /// The file import is atomic: if any group fails, the store and its
    /// modification stamp are left exactly as they were, so the next run
    /// still sees the file as newer and never exports a partial store over
    /// it. The store is re-exported only after a clean import.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` if the file cannot be parsed or an export fails.
    pub async fn run(&self) -> Result<AutoSyncReport, SyncError> {
        let state = self.check().await?;
        let exporter = StoreExporter::new(self.store, self.gateway, self.module_version);
        let mut report = AutoSyncReport {
            state,
            import: None,
            export: None,
        };

        match state {
            AutoSyncState::FileNewer => {
                let text = self.gateway.read_snapshot_text()?.unwrap_or_default();
                let document = parse_document(&text)?;
                let result = ImportResolver::new(self.store, self.module_version)
                    .import(&document, ImportOptions::new(ImportMode::Replace).atomic(true))
                    .await?;
                if result.success {
                    report.export = Some(exporter.export_snapshot().await?);
                } else {
                    tracing::warn!(message = %result.message, "auto-sync import incomplete; file left as is");
                }
                report.import = Some(result);
            }
            AutoSyncState::DbNewer => {
                report.export = Some(exporter.export_snapshot().await?);
            }
            AutoSyncState::NoFile => {
                if !self.store.find_all_groups().await?.is_empty() {
                    report.export = Some(exporter.export_snapshot().await?);
                }
            }
            AutoSyncState::Synced => {}
        }

        tracing::info!(
            %state,
            imported = report.import.is_some(),
            exported = report.export.is_some(),
            "auto-sync finished"
        );
        Ok(report)
    }
}
