use std::path::Path;

use anyhow::Context;
use fieldsync_config::FieldSyncConfig;
use fieldsync_db::service::SchemaService;
use fieldsync_sync::{DirtyDebouncer, SyncEngine};

/// Shared resources for one invocation, which is one unit of work.
pub struct AppContext {
    pub engine: SyncEngine<SchemaService>,
    pub debouncer: DirtyDebouncer,
}

impl AppContext {
    /// Open the store and bind the sync engine to the configured sync root.
    pub async fn init(project_root: &Path, config: FieldSyncConfig) -> anyhow::Result<Self> {
        let db_path = project_root.join(&config.general.db_path);
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let service = SchemaService::new_local(&db_path.to_string_lossy())
            .await
            .context("failed to open the fieldsync store")?;
        let debouncer = DirtyDebouncer::from_config(&config.sync);
        let engine = SyncEngine::from_config_in(service, config.sync, project_root)
            .context("failed to resolve the sync root")?;

        tracing::debug!(
            project = %project_root.display(),
            store = %db_path.display(),
            sync_root = %engine.gateway().root().display(),
            "context ready"
        );

        Ok(Self { engine, debouncer })
    }

    #[must_use]
    pub const fn store(&self) -> &SchemaService {
        self.engine.store()
    }

    /// Compare the aggregate file with the store before the command runs.
    /// Failures are logged and never stop the command.
    pub async fn reconcile(&self) {
        if !self.engine.config().auto_sync() {
            return;
        }
        match self.engine.auto_sync().await {
            Ok(report) => tracing::debug!(state = %report.state, "start-of-run auto-sync"),
            Err(error) => tracing::warn!(%error, "start-of-run auto-sync failed"),
        }
    }

    /// Record that the command changed the store.
    pub fn mark_dirty(&mut self) {
        self.debouncer.mark_dirty();
    }

    /// Run the end-of-run export if one was scheduled.
    pub async fn finish(&mut self) -> anyhow::Result<()> {
        let exporter = self.engine.exporter();
        if let Some(summary) = self
            .debouncer
            .flush(&exporter)
            .await
            .context("end-of-run export failed")?
        {
            tracing::info!(path = %summary.path, groups = summary.groups, "exported on save");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use fieldsync_config::{FieldSyncConfig, SyncConfig};
    use fieldsync_core::entities::GroupDraft;
    use fieldsync_core::enums::SyncPathMode;
    use tempfile::TempDir;

    use super::AppContext;

    fn config(export_on_save: bool) -> FieldSyncConfig {
        FieldSyncConfig {
            sync: SyncConfig {
                enabled: true,
                auto_sync_on_save: export_on_save,
                path_mode: SyncPathMode::Custom,
                custom_path: "sync".to_string(),
                ..SyncConfig::default()
            },
            ..FieldSyncConfig::default()
        }
    }

    #[tokio::test]
    async fn paths_resolve_against_project_root() {
        let temp = TempDir::new().expect("tempdir should create");
        let ctx = AppContext::init(temp.path(), config(false))
            .await
            .expect("context should init");

        assert!(temp.path().join(".fieldsync/fieldsync.db").exists());
        assert_eq!(ctx.engine.gateway().root(), temp.path().join("sync"));
    }

    #[tokio::test]
    async fn finish_exports_once_after_mutations() {
        let temp = TempDir::new().expect("tempdir should create");
        let mut ctx = AppContext::init(temp.path(), config(true))
            .await
            .expect("context should init");

        for slug in ["specs", "care"] {
            ctx.store()
                .create_group(&GroupDraft::new(slug, "Group"))
                .await
                .expect("group should create");
            ctx.mark_dirty();
        }
        let snapshot = ctx.engine.gateway().snapshot_path();
        assert!(!snapshot.exists());

        ctx.finish().await.expect("finish should export");
        assert!(snapshot.is_file());
        assert!(!ctx.debouncer.is_dirty());
    }

    #[tokio::test]
    async fn finish_without_mutations_writes_nothing() {
        let temp = TempDir::new().expect("tempdir should create");
        let mut ctx = AppContext::init(temp.path(), config(true))
            .await
            .expect("context should init");

        ctx.finish().await.expect("finish should succeed");
        assert!(!ctx.engine.gateway().snapshot_path().exists());
    }
}
