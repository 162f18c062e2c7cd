//! Field value repository.

use chrono::Utc;

use fieldsync_core::entities::{FieldValue, FieldValueRow};

use crate::error::DatabaseError;
use crate::helpers::get_opt_string;
use crate::service::SchemaService;

/// Stored in place of a missing language so the identity index holds.
const NO_LANG: i64 = 0;

fn row_to_value(row: &libsql::Row, offset: i32) -> Result<FieldValue, DatabaseError> {
    let lang = row.get::<i64>(offset + 4)?;
    Ok(FieldValue {
        field_id: row.get(offset)?,
        entity_type: row.get(offset + 1)?,
        entity_id: row.get(offset + 2)?,
        shop_id: row.get(offset + 3)?,
        lang_id: (lang != NO_LANG).then_some(lang),
        value: row.get(offset + 5)?,
        value_index: get_opt_string(row, offset + 6)?,
    })
}

impl SchemaService {
    /// Insert or overwrite the value at (field, entity type, entity id, shop,
    /// language).
    pub async fn save_value(&self, value: &FieldValue) -> Result<(), DatabaseError> {
        self.db()
            .conn()
            .execute(
                "INSERT INTO field_values (field_id, entity_type, entity_id, shop_id, lang_id, value, value_index, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(field_id, entity_type, entity_id, shop_id, lang_id)
                 DO UPDATE SET value = excluded.value, value_index = excluded.value_index,
                     updated_at = excluded.updated_at",
                libsql::params![
                    value.field_id,
                    value.entity_type.as_str(),
                    value.entity_id,
                    value.shop_id,
                    value.lang_id.unwrap_or(NO_LANG),
                    value.value.as_str(),
                    value.value_index.as_deref(),
                    Utc::now().to_rfc3339()
                ],
            )
            .await?;
        self.touch_store().await?;
        Ok(())
    }

    /// Every value held for any field of the group (children included),
    /// joined with the field slug.
    pub async fn find_values_by_group(
        &self,
        group_id: i64,
    ) -> Result<Vec<FieldValueRow>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT f.slug, v.field_id, v.entity_type, v.entity_id, v.shop_id, v.lang_id, v.value, v.value_index
                 FROM field_values v
                 JOIN fields f ON f.id = v.field_id
                 WHERE f.group_id = ?1
                 ORDER BY f.position, f.id, v.entity_type, v.entity_id, v.shop_id, v.lang_id",
                libsql::params![group_id],
            )
            .await?;
        let mut values = Vec::new();
        while let Some(row) = rows.next().await? {
            values.push(FieldValueRow {
                field_slug: row.get(0)?,
                value: row_to_value(&row, 1)?,
            });
        }
        Ok(values)
    }

    /// Values one entity holds, for display.
    pub async fn find_values_for_entity(
        &self,
        entity_type: &str,
        entity_id: i64,
    ) -> Result<Vec<FieldValueRow>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT f.slug, v.field_id, v.entity_type, v.entity_id, v.shop_id, v.lang_id, v.value, v.value_index
                 FROM field_values v
                 JOIN fields f ON f.id = v.field_id
                 WHERE v.entity_type = ?1 AND v.entity_id = ?2
                 ORDER BY f.group_id, f.position, f.id, v.shop_id, v.lang_id",
                libsql::params![entity_type, entity_id],
            )
            .await?;
        let mut values = Vec::new();
        while let Some(row) = rows.next().await? {
            values.push(FieldValueRow {
                field_slug: row.get(0)?,
                value: row_to_value(&row, 1)?,
            });
        }
        Ok(values)
    }
}
