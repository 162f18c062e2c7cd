//! Group repository: CRUD plus shop-scope associations.

use chrono::Utc;

use fieldsync_core::entities::{GroupDraft, SchemaGroup};
use fieldsync_core::ids::{is_valid_slug, uuid_or_new};

use crate::error::DatabaseError;
use crate::helpers::{encode_json, get_bool, get_json_bag, get_opt_string, parse_datetime};
use crate::service::SchemaService;

const SELECT_COLS: &str = "id, uuid, slug, title, description, location_rules, placement_tab, \
     placement_position, priority, bo_options, fo_options, active, created_at, updated_at";

fn row_to_group(row: &libsql::Row) -> Result<SchemaGroup, DatabaseError> {
    Ok(SchemaGroup {
        id: row.get(0)?,
        uuid: row.get(1)?,
        slug: row.get(2)?,
        title: row.get(3)?,
        description: get_opt_string(row, 4)?,
        location_rules: get_json_bag(row, 5)?,
        placement_tab: row.get(6)?,
        placement_position: row.get(7)?,
        priority: row.get(8)?,
        bo_options: get_json_bag(row, 9)?,
        fo_options: get_json_bag(row, 10)?,
        active: get_bool(row, 11)?,
        shops: Vec::new(),
        created_at: parse_datetime(&row.get::<String>(12)?)?,
        updated_at: parse_datetime(&row.get::<String>(13)?)?,
    })
}

fn check_slug(slug: &str) -> Result<(), DatabaseError> {
    if is_valid_slug(slug) {
        Ok(())
    } else {
        Err(DatabaseError::InvalidState(format!(
            "invalid group slug '{slug}': use lowercase letters, digits, '_' or '-'"
        )))
    }
}

impl SchemaService {
    pub async fn get_group(&self, id: i64) -> Result<SchemaGroup, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM field_groups WHERE id = ?1"),
                libsql::params![id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let mut group = row_to_group(&row)?;
        group.shops = self.group_shops(group.id).await?;
        Ok(group)
    }

    pub async fn find_group_by_slug(&self, slug: &str) -> Result<Option<SchemaGroup>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM field_groups WHERE slug = ?1"),
                [slug],
            )
            .await?;
        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        let mut group = row_to_group(&row)?;
        group.shops = self.group_shops(group.id).await?;
        Ok(Some(group))
    }

    /// Every group, ordered by priority then creation.
    pub async fn find_all_groups(&self) -> Result<Vec<SchemaGroup>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM field_groups ORDER BY priority, id"),
                (),
            )
            .await?;
        let mut groups = Vec::new();
        while let Some(row) = rows.next().await? {
            groups.push(row_to_group(&row)?);
        }
        for group in &mut groups {
            group.shops = self.group_shops(group.id).await?;
        }
        Ok(groups)
    }

    pub async fn count_groups(&self) -> Result<u32, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query("SELECT COUNT(*) FROM field_groups", ())
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        u32::try_from(row.get::<i64>(0)?)
            .map_err(|e| DatabaseError::InvalidState(format!("group count: {e}")))
    }

    /// Create a group. The draft's UUID is kept when present, otherwise one is
    /// minted; either way it never changes afterwards.
    pub async fn create_group(&self, draft: &GroupDraft) -> Result<SchemaGroup, DatabaseError> {
        check_slug(&draft.slug)?;
        if self.find_group_by_slug(&draft.slug).await?.is_some() {
            return Err(DatabaseError::Conflict(format!(
                "group slug '{}' already exists",
                draft.slug
            )));
        }

        let now = Utc::now().to_rfc3339();
        let uuid = uuid_or_new(draft.uuid.as_deref());
        self.db()
            .conn()
            .execute(
                "INSERT INTO field_groups (uuid, slug, title, description, location_rules, placement_tab,
                     placement_position, priority, bo_options, fo_options, active, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                libsql::params![
                    uuid.as_str(),
                    draft.slug.as_str(),
                    draft.title.as_str(),
                    draft.description.as_deref(),
                    encode_json(&draft.location_rules)?,
                    draft.placement_tab.as_str(),
                    draft.placement_position.as_str(),
                    draft.priority,
                    encode_json(&draft.bo_options)?,
                    encode_json(&draft.fo_options)?,
                    i64::from(draft.active),
                    now.as_str(),
                    now.as_str()
                ],
            )
            .await?;
        let id = self.db().conn().last_insert_rowid();

        self.replace_group_shops(id, &draft.shops).await?;
        self.touch_store().await?;
        tracing::debug!(id, slug = %draft.slug, "created group");

        self.get_group(id).await
    }

    /// Overwrite a group's attributes. The stored UUID is left alone.
    pub async fn update_group(
        &self,
        id: i64,
        draft: &GroupDraft,
    ) -> Result<SchemaGroup, DatabaseError> {
        check_slug(&draft.slug)?;
        if let Some(other) = self.find_group_by_slug(&draft.slug).await? {
            if other.id != id {
                return Err(DatabaseError::Conflict(format!(
                    "group slug '{}' already exists",
                    draft.slug
                )));
            }
        }

        let changed = self
            .db()
            .conn()
            .execute(
                "UPDATE field_groups SET slug = ?1, title = ?2, description = ?3, location_rules = ?4,
                     placement_tab = ?5, placement_position = ?6, priority = ?7, bo_options = ?8,
                     fo_options = ?9, active = ?10, updated_at = ?11
                 WHERE id = ?12",
                libsql::params![
                    draft.slug.as_str(),
                    draft.title.as_str(),
                    draft.description.as_deref(),
                    encode_json(&draft.location_rules)?,
                    draft.placement_tab.as_str(),
                    draft.placement_position.as_str(),
                    draft.priority,
                    encode_json(&draft.bo_options)?,
                    encode_json(&draft.fo_options)?,
                    i64::from(draft.active),
                    Utc::now().to_rfc3339(),
                    id
                ],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }

        self.replace_group_shops(id, &draft.shops).await?;
        self.touch_store().await?;
        tracing::debug!(id, slug = %draft.slug, "updated group");

        self.get_group(id).await
    }

    /// Delete a group. Fields, child fields, values, and shop links cascade.
    pub async fn delete_group(&self, id: i64) -> Result<(), DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute("DELETE FROM field_groups WHERE id = ?1", libsql::params![id])
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.touch_store().await?;
        tracing::debug!(id, "deleted group");
        Ok(())
    }

    async fn group_shops(&self, group_id: i64) -> Result<Vec<i64>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT shop_id FROM field_group_shops WHERE group_id = ?1 ORDER BY shop_id",
                libsql::params![group_id],
            )
            .await?;
        let mut shops = Vec::new();
        while let Some(row) = rows.next().await? {
            shops.push(row.get::<i64>(0)?);
        }
        Ok(shops)
    }

    async fn replace_group_shops(&self, group_id: i64, shops: &[i64]) -> Result<(), DatabaseError> {
        self.db()
            .conn()
            .execute(
                "DELETE FROM field_group_shops WHERE group_id = ?1",
                libsql::params![group_id],
            )
            .await?;
        for shop in shops {
            self.db()
                .conn()
                .execute(
                    "INSERT OR IGNORE INTO field_group_shops (group_id, shop_id) VALUES (?1, ?2)",
                    libsql::params![group_id, *shop],
                )
                .await?;
        }
        Ok(())
    }
}
