//! Field repository.
//!
//! Field slugs are unique across the whole store because values are
//! addressed by slug alone when they move between stores. Creation checks the
//! slug explicitly so callers get a `Conflict` rather than a raw constraint
//! error; the `UNIQUE` index backs it up.

use chrono::Utc;

use fieldsync_core::entities::{FieldDraft, SchemaField};
use fieldsync_core::enums::FieldType;
use fieldsync_core::ids::{is_valid_slug, uuid_or_new};

use crate::error::DatabaseError;
use crate::helpers::{
    encode_json, get_bool, get_json_bag, get_opt_string, parse_datetime, parse_enum,
};
use crate::service::SchemaService;

const SELECT_COLS: &str = "id, uuid, group_id, parent_id, slug, type, title, instructions, \
     position, config, validation, conditions, wrapper, fo_options, value_translatable, active, \
     created_at, updated_at";

fn row_to_field(row: &libsql::Row) -> Result<SchemaField, DatabaseError> {
    Ok(SchemaField {
        id: row.get(0)?,
        uuid: row.get(1)?,
        group_id: row.get(2)?,
        parent_id: row.get::<Option<i64>>(3)?,
        slug: row.get(4)?,
        field_type: parse_enum(&row.get::<String>(5)?)?,
        title: row.get(6)?,
        instructions: get_opt_string(row, 7)?,
        position: row.get(8)?,
        config: get_json_bag(row, 9)?,
        validation: get_json_bag(row, 10)?,
        conditions: get_json_bag(row, 11)?,
        wrapper: get_json_bag(row, 12)?,
        fo_options: get_json_bag(row, 13)?,
        value_translatable: get_bool(row, 14)?,
        active: get_bool(row, 15)?,
        created_at: parse_datetime(&row.get::<String>(16)?)?,
        updated_at: parse_datetime(&row.get::<String>(17)?)?,
    })
}

impl SchemaService {
    pub async fn get_field(&self, id: i64) -> Result<SchemaField, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM fields WHERE id = ?1"),
                libsql::params![id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_field(&row)
    }

    pub async fn find_field_by_slug(&self, slug: &str) -> Result<Option<SchemaField>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM fields WHERE slug = ?1"),
                [slug],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_field(&row)?)),
            None => Ok(None),
        }
    }

    /// Top-level fields of a group in position order. Children are fetched
    /// with [`Self::find_fields_by_parent`].
    pub async fn find_fields_by_group(
        &self,
        group_id: i64,
    ) -> Result<Vec<SchemaField>, DatabaseError> {
        self.query_fields(
            &format!(
                "SELECT {SELECT_COLS} FROM fields WHERE group_id = ?1 AND parent_id IS NULL \
                 ORDER BY position, id"
            ),
            group_id,
        )
        .await
    }

    pub async fn find_fields_by_parent(
        &self,
        parent_id: i64,
    ) -> Result<Vec<SchemaField>, DatabaseError> {
        self.query_fields(
            &format!(
                "SELECT {SELECT_COLS} FROM fields WHERE parent_id = ?1 ORDER BY position, id"
            ),
            parent_id,
        )
        .await
    }

    async fn query_fields(&self, sql: &str, id: i64) -> Result<Vec<SchemaField>, DatabaseError> {
        let mut rows = self.db().conn().query(sql, libsql::params![id]).await?;
        let mut fields = Vec::new();
        while let Some(row) = rows.next().await? {
            fields.push(row_to_field(&row)?);
        }
        Ok(fields)
    }

    /// Create a field.
    ///
    /// A child field's parent must exist, live in the same group, be a
    /// repeater, and not itself be a child.
    pub async fn create_field(&self, draft: &FieldDraft) -> Result<SchemaField, DatabaseError> {
        if !is_valid_slug(&draft.slug) {
            return Err(DatabaseError::InvalidState(format!(
                "invalid field slug '{}': use lowercase letters, digits, '_' or '-'",
                draft.slug
            )));
        }
        if self.find_field_by_slug(&draft.slug).await?.is_some() {
            return Err(DatabaseError::Conflict(format!(
                "field slug '{}' already exists",
                draft.slug
            )));
        }
        match self.get_group(draft.group_id).await {
            Ok(_) => {}
            Err(DatabaseError::NoResult) => {
                return Err(DatabaseError::InvalidState(format!(
                    "group {} does not exist",
                    draft.group_id
                )));
            }
            Err(e) => return Err(e),
        }
        if let Some(parent_id) = draft.parent_id {
            self.check_parent(draft, parent_id).await?;
        }

        let now = Utc::now().to_rfc3339();
        let uuid = uuid_or_new(draft.uuid.as_deref());
        self.db()
            .conn()
            .execute(
                "INSERT INTO fields (uuid, group_id, parent_id, slug, type, title, instructions, position,
                     config, validation, conditions, wrapper, fo_options, value_translatable, active,
                     created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                libsql::params![
                    uuid.as_str(),
                    draft.group_id,
                    draft.parent_id,
                    draft.slug.as_str(),
                    draft.field_type.as_str(),
                    draft.title.as_str(),
                    draft.instructions.as_deref(),
                    draft.position,
                    encode_json(&draft.config)?,
                    encode_json(&draft.validation)?,
                    encode_json(&draft.conditions)?,
                    encode_json(&draft.wrapper)?,
                    encode_json(&draft.fo_options)?,
                    i64::from(draft.value_translatable),
                    i64::from(draft.active),
                    now.as_str(),
                    now.as_str()
                ],
            )
            .await?;
        let id = self.db().conn().last_insert_rowid();
        self.touch_store().await?;
        tracing::debug!(id, slug = %draft.slug, group_id = draft.group_id, "created field");

        self.get_field(id).await
    }

    async fn check_parent(&self, draft: &FieldDraft, parent_id: i64) -> Result<(), DatabaseError> {
        let parent = match self.get_field(parent_id).await {
            Ok(parent) => parent,
            Err(DatabaseError::NoResult) => {
                return Err(DatabaseError::InvalidState(format!(
                    "parent field {parent_id} does not exist"
                )));
            }
            Err(e) => return Err(e),
        };
        if parent.group_id != draft.group_id {
            return Err(DatabaseError::InvalidState(format!(
                "field '{}' must be in the same group as its parent '{}'",
                draft.slug, parent.slug
            )));
        }
        if parent.field_type != FieldType::Repeater {
            return Err(DatabaseError::InvalidState(format!(
                "parent field '{}' is a {}, only repeaters hold children",
                parent.slug, parent.field_type
            )));
        }
        if parent.parent_id.is_some() {
            return Err(DatabaseError::InvalidState(format!(
                "parent field '{}' is itself nested; one level only",
                parent.slug
            )));
        }
        Ok(())
    }

    /// Delete every field of a group (children and values cascade). Returns
    /// the number of rows removed.
    pub async fn delete_fields_by_group(&self, group_id: i64) -> Result<u64, DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute(
                "DELETE FROM fields WHERE group_id = ?1",
                libsql::params![group_id],
            )
            .await?;
        if changed > 0 {
            self.touch_store().await?;
        }
        tracing::debug!(group_id, removed = changed, "deleted group fields");
        Ok(changed)
    }
}
