//! One entry point per sync operation, bound to a store, a sync root and the
//! sync configuration.

use std::path::Path;

use chrono::Duration;
use fieldsync_config::{ConfigError, SyncConfig};
use fieldsync_core::document::SyncRecord;
use fieldsync_core::enums::ImportMode;
use fieldsync_core::responses::{AutoSyncReport, ExportSummary, GlobalStatus, GroupStatus, ImportResult};
use fieldsync_db::store::SchemaStore;

use crate::auto_sync::AutoSyncRunner;
use crate::canonical::{ImportDocument, parse_document};
use crate::error::SyncError;
use crate::export::{PushedGroup, SnapshotExporter, StoreExporter};
use crate::gateway::{SyncGateway, read_document};
use crate::import::{ImportOptions, ImportResolver};
use crate::status;

pub struct SyncEngine<S> {
    store: S,
    gateway: SyncGateway,
    config: SyncConfig,
}

impl<S: SchemaStore> SyncEngine<S> {
    #[must_use]
    pub const fn new(store: S, gateway: SyncGateway, config: SyncConfig) -> Self {
        Self {
            store,
            gateway,
            config,
        }
    }

    /// Engine with the gateway rooted where `config` points.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Config` if the sync root cannot be resolved.
    pub fn from_config(store: S, config: SyncConfig) -> Result<Self, SyncError> {
        Self::from_config_in(store, config, Path::new(""))
    }

    /// Like [`Self::from_config`], with a relative sync root resolved against
    /// `base` (the project root).
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Config` if the sync root cannot be resolved.
    pub fn from_config_in(store: S, config: SyncConfig, base: &Path) -> Result<Self, SyncError> {
        let gateway = SyncGateway::from_config_in(&config, base)?;
        Ok(Self::new(store, gateway, config))
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn gateway(&self) -> &SyncGateway {
        &self.gateway
    }

    #[must_use]
    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    #[must_use]
    pub fn exporter(&self) -> StoreExporter<'_, S> {
        StoreExporter::new(&self.store, &self.gateway, &self.config.module_version)
    }

    fn resolver(&self) -> ImportResolver<'_, S> {
        ImportResolver::new(&self.store, &self.config.module_version)
    }

    const fn require_enabled(&self) -> Result<(), SyncError> {
        if self.config.enabled {
            Ok(())
        } else {
            Err(SyncError::Disabled)
        }
    }

    // -----------------------------------------------------------------------
    // Per-group files
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns `SyncError` on store reads or filesystem failures.
    pub async fn global_status(&self) -> Result<GlobalStatus, SyncError> {
        status::global_status(&self.store, &self.gateway, self.config.enabled).await
    }

    /// # Errors
    ///
    /// Returns `SyncError` on store reads, invalid slugs, or filesystem failures.
    pub async fn group_status(&self, slug: &str) -> Result<GroupStatus, SyncError> {
        status::group_status(&self.store, &self.gateway, self.config.enabled, slug).await
    }

    /// Write one group's file, or every group's file when `slug` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Disabled` when sync is off, or any store or
    /// filesystem failure.
    pub async fn push(&self, slug: Option<&str>) -> Result<Vec<PushedGroup>, SyncError> {
        self.require_enabled()?;
        let exporter = self.exporter();
        match slug {
            Some(slug) => Ok(vec![exporter.push_group(slug).await?]),
            None => exporter.push_all().await,
        }
    }

    /// Import one group's file, or every group file when `slug` is `None`.
    ///
    /// A single-group pull always merges; `mode` applies to pulling all.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Disabled` when sync is off, `UnknownGroup` when
    /// the file is missing, `Validation` when a file cannot be parsed, or
    /// `EmptySourceGuard` when a replace finds no group files but the store
    /// holds groups.
    pub async fn pull(&self, slug: Option<&str>, mode: ImportMode) -> Result<ImportResult, SyncError> {
        self.require_enabled()?;
        let (document, mode) = match slug {
            Some(slug) => {
                let text = self
                    .gateway
                    .read_record_text(slug)?
                    .ok_or_else(|| SyncError::UnknownGroup(slug.to_string()))?;
                (parse_document(&text)?, ImportMode::Merge)
            }
            None => (self.read_all_records()?, mode),
        };
        self.resolver()
            .import(&document, ImportOptions::new(mode))
            .await
    }

    fn read_all_records(&self) -> Result<ImportDocument, SyncError> {
        let mut records = Vec::new();
        let mut violations = Vec::new();
        for slug in self.gateway.list_slugs()? {
            let Some(text) = self.gateway.read_record_text(&slug)? else {
                continue;
            };
            match serde_json::from_str::<SyncRecord>(&text) {
                Ok(record) => records.push(record),
                Err(e) => violations.push(format!("{slug}.json: {e}")),
            }
        }
        if !violations.is_empty() {
            return Err(SyncError::Validation(violations));
        }
        Ok(ImportDocument::from_records(records))
    }

    // -----------------------------------------------------------------------
    // Aggregate file
    // -----------------------------------------------------------------------

    /// Write the whole store to the aggregate file.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::EmptySourceGuard` for an empty store over a
    /// non-empty file, or any store or filesystem failure.
    pub async fn export_snapshot(&self) -> Result<ExportSummary, SyncError> {
        self.exporter().export_snapshot().await
    }

    /// Import a document from an explicit path; either shape is accepted.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` if the file cannot be read or parsed. Validation
    /// findings are reported inside the result.
    pub async fn import_file(
        &self,
        path: &Path,
        options: ImportOptions,
    ) -> Result<ImportResult, SyncError> {
        let text = read_document(path)?;
        let document = parse_document(&text)?;
        tracing::debug!(path = %path.display(), groups = document.groups.len(), "importing document");
        self.resolver().import(&document, options).await
    }

    /// # Errors
    ///
    /// Returns `SyncError::Disabled` unless sync and auto-sync are on, and
    /// `SyncError::Config` for an unusable timestamp tolerance.
    pub async fn auto_sync(&self) -> Result<AutoSyncReport, SyncError> {
        if !self.config.auto_sync() {
            return Err(SyncError::Disabled);
        }
        AutoSyncRunner::new(
            &self.store,
            &self.gateway,
            &self.config.module_version,
            timestamp_tolerance(&self.config)?,
        )
        .run()
        .await
    }
}

/// The whole-store comparison window: zero or more seconds.
fn timestamp_tolerance(config: &SyncConfig) -> Result<Duration, ConfigError> {
    let secs = config.timestamp_tolerance_secs;
    let invalid = |reason: &str| ConfigError::InvalidValue {
        field: "sync.timestamp_tolerance_secs".into(),
        reason: format!("{reason} (got {secs})"),
    };
    if secs < 0 {
        return Err(invalid("must not be negative"));
    }
    Duration::try_seconds(secs).ok_or_else(|| invalid("out of range"))
}
