//! The store contract the sync engine consumes.
//!
//! The engine only depends on these behaviours, not on libSQL. The trait
//! uses native `async fn`; callers are generic over `S: SchemaStore` and
//! never need a `dyn` store.

use chrono::{DateTime, Utc};

use fieldsync_core::entities::{
    FieldDraft, FieldValue, FieldValueRow, GroupDraft, SchemaField, SchemaGroup,
};

use crate::error::DatabaseError;
use crate::service::SchemaService;

#[allow(async_fn_in_trait)]
pub trait SchemaStore {
    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<SchemaGroup>, DatabaseError>;
    async fn find_all_groups(&self) -> Result<Vec<SchemaGroup>, DatabaseError>;
    async fn create_group(&self, draft: &GroupDraft) -> Result<SchemaGroup, DatabaseError>;
    /// Never changes the stored UUID.
    async fn update_group(&self, id: i64, draft: &GroupDraft)
    -> Result<SchemaGroup, DatabaseError>;
    /// Cascades to fields and values.
    async fn delete_group(&self, id: i64) -> Result<(), DatabaseError>;

    /// Top-level fields only, in position order.
    async fn find_fields_by_group(&self, group_id: i64) -> Result<Vec<SchemaField>, DatabaseError>;
    async fn find_fields_by_parent(&self, parent_id: i64)
    -> Result<Vec<SchemaField>, DatabaseError>;
    async fn create_field(&self, draft: &FieldDraft) -> Result<SchemaField, DatabaseError>;
    async fn delete_fields_by_group(&self, group_id: i64) -> Result<u64, DatabaseError>;

    async fn find_values_by_group(&self, group_id: i64)
    -> Result<Vec<FieldValueRow>, DatabaseError>;
    async fn save_value(&self, value: &FieldValue) -> Result<(), DatabaseError>;

    /// When the store last changed; `None` if it never has.
    async fn store_modified_at(&self) -> Result<Option<DateTime<Utc>>, DatabaseError>;
    async fn last_sync_at(&self) -> Result<Option<DateTime<Utc>>, DatabaseError>;
    async fn set_last_sync_at(&self, at: DateTime<Utc>) -> Result<(), DatabaseError>;

    /// Open a nestable unit of work.
    async fn savepoint(&self, name: &str) -> Result<(), DatabaseError>;
    /// Keep the unit's changes.
    async fn release(&self, name: &str) -> Result<(), DatabaseError>;
    /// Discard the unit's changes, including modification stamps.
    async fn rollback_to(&self, name: &str) -> Result<(), DatabaseError>;
}

impl SchemaStore for SchemaService {
    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<SchemaGroup>, DatabaseError> {
        Self::find_group_by_slug(self, slug).await
    }

    async fn find_all_groups(&self) -> Result<Vec<SchemaGroup>, DatabaseError> {
        Self::find_all_groups(self).await
    }

    async fn create_group(&self, draft: &GroupDraft) -> Result<SchemaGroup, DatabaseError> {
        Self::create_group(self, draft).await
    }

    async fn update_group(
        &self,
        id: i64,
        draft: &GroupDraft,
    ) -> Result<SchemaGroup, DatabaseError> {
        Self::update_group(self, id, draft).await
    }

    async fn delete_group(&self, id: i64) -> Result<(), DatabaseError> {
        Self::delete_group(self, id).await
    }

    async fn find_fields_by_group(&self, group_id: i64) -> Result<Vec<SchemaField>, DatabaseError> {
        Self::find_fields_by_group(self, group_id).await
    }

    async fn find_fields_by_parent(
        &self,
        parent_id: i64,
    ) -> Result<Vec<SchemaField>, DatabaseError> {
        Self::find_fields_by_parent(self, parent_id).await
    }

    async fn create_field(&self, draft: &FieldDraft) -> Result<SchemaField, DatabaseError> {
        Self::create_field(self, draft).await
    }

    async fn delete_fields_by_group(&self, group_id: i64) -> Result<u64, DatabaseError> {
        Self::delete_fields_by_group(self, group_id).await
    }

    async fn find_values_by_group(
        &self,
        group_id: i64,
    ) -> Result<Vec<FieldValueRow>, DatabaseError> {
        Self::find_values_by_group(self, group_id).await
    }

    async fn save_value(&self, value: &FieldValue) -> Result<(), DatabaseError> {
        Self::save_value(self, value).await
    }

    async fn store_modified_at(&self) -> Result<Option<DateTime<Utc>>, DatabaseError> {
        Self::store_modified_at(self).await
    }

    async fn last_sync_at(&self) -> Result<Option<DateTime<Utc>>, DatabaseError> {
        Self::last_sync_at(self).await
    }

    async fn set_last_sync_at(&self, at: DateTime<Utc>) -> Result<(), DatabaseError> {
        Self::set_last_sync_at(self, at).await
    }

    async fn savepoint(&self, name: &str) -> Result<(), DatabaseError> {
        Self::savepoint(self, name).await
    }

    async fn release(&self, name: &str) -> Result<(), DatabaseError> {
        Self::release(self, name).await
    }

    async fn rollback_to(&self, name: &str) -> Result<(), DatabaseError> {
        Self::rollback_to(self, name).await
    }
}
