//! Whole-store reconciliation and end-of-run exports.

use std::path::Path;

use chrono::{DateTime, Utc};
use fieldsync_config::SyncConfig;
use fieldsync_core::entities::{
    FieldDraft, FieldValue, FieldValueRow, GroupDraft, SchemaField, SchemaGroup,
};
use fieldsync_core::enums::{AutoSyncState, FieldType, SyncPathMode};
use fieldsync_db::error::DatabaseError;
use fieldsync_db::repos::meta::KEY_STORE_MODIFIED_AT;
use fieldsync_db::service::SchemaService;
use fieldsync_db::store::SchemaStore;
use fieldsync_sync::auto_sync::AutoSyncRunner;
use fieldsync_sync::{DirtyDebouncer, SyncEngine, SyncGateway};
use pretty_assertions::assert_eq;
use serde_json::json;

fn config(root: &Path) -> SyncConfig {
    SyncConfig {
        enabled: true,
        auto_sync_enabled: true,
        auto_sync_on_save: true,
        path_mode: SyncPathMode::Custom,
        custom_path: root.join("sync").display().to_string(),
        ..SyncConfig::default()
    }
}

async fn engine(root: &Path) -> SyncEngine<SchemaService> {
    let store = SchemaService::new_local(":memory:").await.unwrap();
    SyncEngine::from_config(store, config(root)).unwrap()
}

async fn seed<S: SchemaStore>(store: &S, slug: &str) {
    let group = store
        .create_group(&GroupDraft::new(slug, "Group"))
        .await
        .unwrap();
    store
        .create_field(&FieldDraft::new(
            group.id,
            format!("{slug}_field"),
            FieldType::Text,
            "Field",
        ))
        .await
        .unwrap();
}

fn runner(engine: &SyncEngine<SchemaService>) -> AutoSyncRunner<'_, SchemaService> {
    AutoSyncRunner::new(
        engine.store(),
        engine.gateway(),
        &engine.config().module_version,
        chrono::Duration::seconds(2),
    )
}

#[tokio::test]
async fn nothing_anywhere_does_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let engine = engine(temp.path()).await;

    let report = engine.auto_sync().await.unwrap();
    assert_eq!(report.state, AutoSyncState::NoFile);
    assert!(report.export.is_none());
    assert!(!engine.gateway().snapshot_path().exists());
}

#[tokio::test]
async fn first_run_exports_and_then_settles() {
    let temp = tempfile::tempdir().unwrap();
    let engine = engine(temp.path()).await;
    seed(engine.store(), "specs").await;

    let report = engine.auto_sync().await.unwrap();
    assert_eq!(report.state, AutoSyncState::NoFile);
    assert_eq!(report.export.unwrap().groups, 1);
    assert!(engine.store().last_sync_at().await.unwrap().is_some());

    // The file it just wrote must not read as newer than the store.
    assert_eq!(runner(&engine).check().await.unwrap(), AutoSyncState::Synced);
    let again = engine.auto_sync().await.unwrap();
    assert!(again.import.is_none());
    assert!(again.export.is_none());
}

#[tokio::test]
async fn populated_file_seeds_an_empty_store() {
    let temp = tempfile::tempdir().unwrap();
    let source = engine(temp.path()).await;
    seed(source.store(), "specs").await;
    seed(source.store(), "care").await;
    source.export_snapshot().await.unwrap();

    let fresh = engine(temp.path()).await;
    let report = fresh.auto_sync().await.unwrap();
    assert_eq!(report.state, AutoSyncState::FileNewer);

    let import = report.import.unwrap();
    assert!(import.success, "{}", import.message);
    assert_eq!(import.created.len(), 2);
    assert_eq!(report.export.unwrap().groups, 2);
    assert_eq!(fresh.store().find_all_groups().await.unwrap().len(), 2);
}

#[tokio::test]
async fn empty_file_is_never_newer() {
    let temp = tempfile::tempdir().unwrap();
    let engine = engine(temp.path()).await;
    std::fs::create_dir_all(engine.gateway().root()).unwrap();
    std::fs::write(
        engine.gateway().snapshot_path(),
        r#"{"version":"1.0","groups":[]}"#,
    )
    .unwrap();
    seed(engine.store(), "specs").await;

    let report = engine.auto_sync().await.unwrap();
    assert_eq!(report.state, AutoSyncState::DbNewer);
    assert_eq!(report.export.unwrap().groups, 1);
    assert_eq!(engine.gateway().snapshot_group_count().unwrap(), 1);
}

#[tokio::test]
async fn debouncer_exports_once_per_run() {
    let temp = tempfile::tempdir().unwrap();
    let engine = engine(temp.path()).await;
    let mut debouncer = DirtyDebouncer::from_config(engine.config());

    for slug in ["a", "b", "c"] {
        seed(engine.store(), slug).await;
        debouncer.mark_dirty();
    }
    assert!(!engine.gateway().snapshot_path().exists());

    let summary = debouncer.flush(&engine.exporter()).await.unwrap().unwrap();
    assert_eq!(summary.groups, 3);
    assert!(!debouncer.is_dirty());
    assert!(debouncer.flush(&engine.exporter()).await.unwrap().is_none());
}

#[tokio::test]
async fn debouncer_off_without_export_on_save() {
    let temp = tempfile::tempdir().unwrap();
    let mut cfg = config(temp.path());
    cfg.auto_sync_on_save = false;
    let store = SchemaService::new_local(":memory:").await.unwrap();
    let engine = SyncEngine::from_config(store, cfg).unwrap();
    let mut debouncer = DirtyDebouncer::from_config(engine.config());

    seed(engine.store(), "specs").await;
    debouncer.mark_dirty();
    assert!(debouncer.flush(&engine.exporter()).await.unwrap().is_none());
    assert!(!engine.gateway().snapshot_path().exists());
}

/// Backdate the store so a file written now reads as newer.
async fn age_store(store: &SchemaService) -> Option<DateTime<Utc>> {
    let old = Utc::now() - chrono::Duration::seconds(60);
    store
        .set_meta(KEY_STORE_MODIFIED_AT, &old.to_rfc3339())
        .await
        .unwrap();
    store.store_modified_at().await.unwrap()
}

fn write_snapshot(gateway: &SyncGateway, snapshot: &serde_json::Value) {
    std::fs::create_dir_all(gateway.root()).unwrap();
    std::fs::write(gateway.snapshot_path(), snapshot.to_string()).unwrap();
}

fn two_group_snapshot(second_uuid: &str) -> serde_json::Value {
    json!({
        "version": "1.0",
        "groups": [
            {"group": {"uuid": "dup", "slug": "a", "title": "A"},
             "fields": [{"slug": "a_field", "type": "text", "title": "A"}]},
            {"group": {"uuid": second_uuid, "slug": "b", "title": "B"},
             "fields": [{"slug": "b_field", "type": "text", "title": "B"}]}
        ]
    })
}

#[tokio::test]
async fn rejected_file_import_never_turns_into_an_export() {
    let temp = tempfile::tempdir().unwrap();
    let engine = engine(temp.path()).await;
    seed(engine.store(), "keep").await;
    let aged = age_store(engine.store()).await;
    write_snapshot(engine.gateway(), &two_group_snapshot("dup"));

    let first = engine.auto_sync().await.unwrap();
    assert_eq!(first.state, AutoSyncState::FileNewer);
    let import = first.import.unwrap();
    assert!(!import.success);
    assert!(import.violations.iter().any(|v| v.contains("duplicate group uuid")));
    assert!(first.export.is_none());
    assert_eq!(engine.store().store_modified_at().await.unwrap(), aged);

    let second = engine.auto_sync().await.unwrap();
    assert_eq!(second.state, AutoSyncState::FileNewer);
    assert!(second.export.is_none());
    assert_eq!(engine.gateway().snapshot_group_count().unwrap(), 2);
    assert!(engine.store().find_group_by_slug("keep").await.unwrap().is_some());
}

/// Delegates to a real store but refuses to create one group.
struct RefusingStore {
    inner: SchemaService,
    refuse: &'static str,
}

impl SchemaStore for RefusingStore {
    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<SchemaGroup>, DatabaseError> {
        self.inner.find_group_by_slug(slug).await
    }

    async fn find_all_groups(&self) -> Result<Vec<SchemaGroup>, DatabaseError> {
        self.inner.find_all_groups().await
    }

    async fn create_group(&self, draft: &GroupDraft) -> Result<SchemaGroup, DatabaseError> {
        if draft.slug == self.refuse {
            return Err(DatabaseError::InvalidState(format!("cannot create '{}'", draft.slug)));
        }
        self.inner.create_group(draft).await
    }

    async fn update_group(&self, id: i64, draft: &GroupDraft) -> Result<SchemaGroup, DatabaseError> {
        self.inner.update_group(id, draft).await
    }

    async fn delete_group(&self, id: i64) -> Result<(), DatabaseError> {
        self.inner.delete_group(id).await
    }

    async fn find_fields_by_group(&self, group_id: i64) -> Result<Vec<SchemaField>, DatabaseError> {
        self.inner.find_fields_by_group(group_id).await
    }

    async fn find_fields_by_parent(&self, parent_id: i64) -> Result<Vec<SchemaField>, DatabaseError> {
        self.inner.find_fields_by_parent(parent_id).await
    }

    async fn create_field(&self, draft: &FieldDraft) -> Result<SchemaField, DatabaseError> {
        self.inner.create_field(draft).await
    }

    async fn delete_fields_by_group(&self, group_id: i64) -> Result<u64, DatabaseError> {
        self.inner.delete_fields_by_group(group_id).await
    }

    async fn find_values_by_group(&self, group_id: i64) -> Result<Vec<FieldValueRow>, DatabaseError> {
        self.inner.find_values_by_group(group_id).await
    }

    async fn save_value(&self, value: &FieldValue) -> Result<(), DatabaseError> {
        self.inner.save_value(value).await
    }

    async fn store_modified_at(&self) -> Result<Option<DateTime<Utc>>, DatabaseError> {
        self.inner.store_modified_at().await
    }

    async fn last_sync_at(&self) -> Result<Option<DateTime<Utc>>, DatabaseError> {
        self.inner.last_sync_at().await
    }

    async fn set_last_sync_at(&self, at: DateTime<Utc>) -> Result<(), DatabaseError> {
        self.inner.set_last_sync_at(at).await
    }

    async fn savepoint(&self, name: &str) -> Result<(), DatabaseError> {
        self.inner.savepoint(name).await
    }

    async fn release(&self, name: &str) -> Result<(), DatabaseError> {
        self.inner.release(name).await
    }

    async fn rollback_to(&self, name: &str) -> Result<(), DatabaseError> {
        self.inner.rollback_to(name).await
    }
}

#[tokio::test]
async fn failed_file_import_restores_the_store_and_keeps_the_file() {
    let temp = tempfile::tempdir().unwrap();
    let cfg = config(temp.path());
    let inner = SchemaService::new_local(":memory:").await.unwrap();
    seed(&inner, "keep").await;
    let aged = age_store(&inner).await;
    let store = RefusingStore { inner, refuse: "b" };
    let gateway = SyncGateway::from_config(&cfg).unwrap();
    write_snapshot(&gateway, &two_group_snapshot("other"));

    let runner = AutoSyncRunner::new(
        &store,
        &gateway,
        &cfg.module_version,
        chrono::Duration::seconds(2),
    );

    let first = runner.run().await.unwrap();
    assert_eq!(first.state, AutoSyncState::FileNewer);
    let import = first.import.unwrap();
    assert!(!import.success);
    assert_eq!(import.errors[0].slug, "b");
    assert!(import.deleted.is_empty());
    assert!(first.export.is_none());

    // The replace wipe and group `a` were undone along with their stamps.
    let slugs: Vec<String> = store
        .find_all_groups()
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.slug)
        .collect();
    assert_eq!(slugs, vec!["keep".to_string()]);
    assert_eq!(store.store_modified_at().await.unwrap(), aged);

    let second = runner.run().await.unwrap();
    assert_eq!(second.state, AutoSyncState::FileNewer);
    assert!(second.export.is_none());
    assert_eq!(gateway.snapshot_group_count().unwrap(), 2);
}
