use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A value an entity holds for one field.
///
/// Identity is (field, entity type, entity id, shop, language). `lang_id` is
/// `None` for non-translatable fields. `value_index` is a plain-text
/// projection used for search and is not part of sync equality.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FieldValue {
    pub field_id: i64,
    pub entity_type: String,
    pub entity_id: i64,
    pub shop_id: i64,
    pub lang_id: Option<i64>,
    /// Raw stored string; array-valued types hold encoded JSON here.
    pub value: String,
    pub value_index: Option<String>,
}

/// A stored value joined with its field's slug, as read for export.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FieldValueRow {
    pub field_slug: String,
    pub value: FieldValue,
}
