//! Sync bookkeeping in the `sync_meta` key/value table.
//!
//! Two keys matter to the engine:
//! - `store_modified_at`: stamped by every repo mutation.
//! - `last_sync_at`: written by the auto-sync runner after it acts.

use chrono::{DateTime, Utc};

use crate::error::DatabaseError;
use crate::helpers::parse_optional_datetime;
use crate::service::SchemaService;

pub const KEY_STORE_MODIFIED_AT: &str = "store_modified_at";
pub const KEY_LAST_SYNC_AT: &str = "last_sync_at";

impl SchemaService {
    pub async fn get_meta(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query("SELECT value FROM sync_meta WHERE key = ?1", [key])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row.get::<String>(0)?)),
            None => Ok(None),
        }
    }

    pub async fn set_meta(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.db()
            .conn()
            .execute(
                "INSERT INTO sync_meta (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                libsql::params![key, value, Utc::now().to_rfc3339()],
            )
            .await?;
        Ok(())
    }

    /// Record that the store changed now.
    pub(crate) async fn touch_store(&self) -> Result<(), DatabaseError> {
        self.set_meta(KEY_STORE_MODIFIED_AT, &Utc::now().to_rfc3339())
            .await
    }

    /// When any group, field, or value last changed. `None` for a store that
    /// has never been written.
    pub async fn store_modified_at(&self) -> Result<Option<DateTime<Utc>>, DatabaseError> {
        let raw = self.get_meta(KEY_STORE_MODIFIED_AT).await?;
        parse_optional_datetime(raw.as_deref())
    }

    pub async fn last_sync_at(&self) -> Result<Option<DateTime<Utc>>, DatabaseError> {
        let raw = self.get_meta(KEY_LAST_SYNC_AT).await?;
        parse_optional_datetime(raw.as_deref())
    }

    /// Does not count as a store mutation.
    pub async fn set_last_sync_at(&self, at: DateTime<Utc>) -> Result<(), DatabaseError> {
        self.set_meta(KEY_LAST_SYNC_AT, &at.to_rfc3339()).await
    }
}
