use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::empty_bag;
use crate::enums::FieldType;

/// A typed data slot within a group.
///
/// `parent_id` is set only for children of a repeater field, and a child
/// always belongs to its parent's group. Nesting is one level deep.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SchemaField {
    pub id: i64,
    pub uuid: String,
    pub group_id: i64,
    pub parent_id: Option<i64>,
    /// Unique across the whole install, not just the group.
    pub slug: String,
    pub field_type: FieldType,
    pub title: String,
    pub instructions: Option<String>,
    pub position: i64,
    pub config: serde_json::Value,
    pub validation: serde_json::Value,
    pub conditions: serde_json::Value,
    pub wrapper: serde_json::Value,
    pub fo_options: serde_json::Value,
    pub value_translatable: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied field attributes for create.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FieldDraft {
    pub uuid: Option<String>,
    pub group_id: i64,
    pub parent_id: Option<i64>,
    pub slug: String,
    pub field_type: FieldType,
    pub title: String,
    pub instructions: Option<String>,
    pub position: i64,
    pub config: serde_json::Value,
    pub validation: serde_json::Value,
    pub conditions: serde_json::Value,
    pub wrapper: serde_json::Value,
    pub fo_options: serde_json::Value,
    pub value_translatable: bool,
    pub active: bool,
}

impl FieldDraft {
    #[must_use]
    pub fn new(
        group_id: i64,
        slug: impl Into<String>,
        field_type: FieldType,
        title: impl Into<String>,
    ) -> Self {
        Self {
            uuid: None,
            group_id,
            parent_id: None,
            slug: slug.into(),
            field_type,
            title: title.into(),
            instructions: None,
            position: 0,
            config: empty_bag(),
            validation: empty_bag(),
            conditions: empty_bag(),
            wrapper: empty_bag(),
            fo_options: empty_bag(),
            value_translatable: false,
            active: true,
        }
    }
}
