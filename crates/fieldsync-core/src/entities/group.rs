use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::empty_bag;

/// A named, orderable collection of fields with an activation predicate.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SchemaGroup {
    pub id: i64,
    pub uuid: String,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    /// Opaque predicate evaluated by an external location matcher.
    pub location_rules: serde_json::Value,
    pub placement_tab: String,
    pub placement_position: String,
    pub priority: i64,
    pub bo_options: serde_json::Value,
    pub fo_options: serde_json::Value,
    pub active: bool,
    pub shops: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied group attributes for create and update.
///
/// `uuid` is honoured on create only; updates never touch the stored UUID.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct GroupDraft {
    pub uuid: Option<String>,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub location_rules: serde_json::Value,
    pub placement_tab: String,
    pub placement_position: String,
    pub priority: i64,
    pub bo_options: serde_json::Value,
    pub fo_options: serde_json::Value,
    pub active: bool,
    pub shops: Vec<i64>,
}

impl GroupDraft {
    #[must_use]
    pub fn new(slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uuid: None,
            slug: slug.into(),
            title: title.into(),
            description: None,
            location_rules: serde_json::Value::Array(Vec::new()),
            placement_tab: String::new(),
            placement_position: String::new(),
            priority: 0,
            bo_options: empty_bag(),
            fo_options: empty_bag(),
            active: true,
            shops: Vec::new(),
        }
    }
}
