//! On-disk sync document formats.
//!
//! Two shapes share the same group/field bodies:
//! - [`SyncRecord`]: one group per file (`groups/<slug>.json`), carrying a
//!   precomputed checksum.
//! - [`StoreSnapshot`]: the whole store in a single aggregate file, optionally
//!   with the values entities hold.
//!
//! Store-local ids and timestamps never appear in a body. Every body field is
//! `#[serde(default)]` so that a sparse hand-written document still parses and
//! the import validator, not serde, reports what is missing. Unknown keys are
//! ignored for forward compatibility.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Current document format version.
pub const FORMAT_VERSION: &str = "1.0";

fn empty_array() -> serde_json::Value {
    serde_json::Value::Array(Vec::new())
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

const fn default_true() -> bool {
    true
}

/// Canonical attributes of a group.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct GroupDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "empty_array")]
    pub location_rules: serde_json::Value,
    #[serde(default)]
    pub placement_tab: String,
    #[serde(default)]
    pub placement_position: String,
    #[serde(default)]
    pub priority: i64,
    #[serde(default = "empty_object")]
    pub bo_options: serde_json::Value,
    #[serde(default = "empty_object")]
    pub fo_options: serde_json::Value,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shops: Vec<i64>,
}

/// Canonical attributes of a field. Repeater children nest under `children`.
///
/// `field_type` stays a string here: an unknown tag is a validation finding
/// reported alongside the others, not a parse failure.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FieldDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub slug: String,
    #[serde(rename = "type", default)]
    pub field_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub position: i64,
    #[serde(default = "empty_object")]
    pub config: serde_json::Value,
    #[serde(default = "empty_object")]
    pub validation: serde_json::Value,
    #[serde(default = "empty_object")]
    pub conditions: serde_json::Value,
    #[serde(default = "empty_object")]
    pub wrapper: serde_json::Value,
    #[serde(default = "empty_object")]
    pub fo_options: serde_json::Value,
    #[serde(default)]
    pub value_translatable: bool,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FieldDocument>,
}

/// One group per file.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SyncRecord {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub module_version: String,
    /// ISO 8601 export time, for human diagnostics only.
    #[serde(default)]
    pub exported_at: String,
    #[serde(default)]
    pub checksum: String,
    pub group: GroupDocument,
    pub fields: Vec<FieldDocument>,
}

/// A group body inside a whole-store snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct GroupBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    pub group: GroupDocument,
    pub fields: Vec<FieldDocument>,
}

/// A stored value addressed by field slug, portable across stores.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ValueRecord {
    pub field_slug: String,
    pub entity_type: String,
    pub entity_id: i64,
    #[serde(default = "default_shop")]
    pub id_shop: i64,
    #[serde(default)]
    pub id_lang: Option<i64>,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub value_index: Option<String>,
}

const fn default_shop() -> i64 {
    1
}

/// The whole store in one aggregate file.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub module_version: String,
    #[serde(default)]
    pub exported_at: String,
    pub groups: Vec<GroupBody>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<ValueRecord>,
}

impl From<SyncRecord> for GroupBody {
    fn from(record: SyncRecord) -> Self {
        Self {
            checksum: (!record.checksum.is_empty()).then_some(record.checksum),
            group: record.group,
            fields: record.fields,
        }
    }
}

impl FieldDocument {
    /// Count this field and its children.
    #[must_use]
    pub fn tree_len(&self) -> usize {
        1 + self.children.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_record_fills_defaults() {
        let json = r#"{"version":"1.0","group":{"slug":"specs","title":"Specifications"},"fields":[{"slug":"material","type":"text","title":"Material"}]}"#;
        let record: SyncRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.group.slug, "specs");
        assert!(record.group.active);
        assert_eq!(record.group.location_rules, serde_json::json!([]));
        assert_eq!(record.fields[0].field_type, "text");
        assert_eq!(record.fields[0].config, serde_json::json!({}));
        assert!(record.fields[0].children.is_empty());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let json = r#"{"version":"1.0","future":{"x":1},"group":{"slug":"a","title":"A","shiny":true},"fields":[]}"#;
        let record: SyncRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.group.title, "A");
    }

    #[test]
    fn field_type_serializes_as_type() {
        let json = r#"{"slug":"rows","type":"repeater","title":"Rows","children":[{"slug":"cell","type":"text","title":"Cell"}]}"#;
        let field: FieldDocument = serde_json::from_str(json).unwrap();
        assert_eq!(field.tree_len(), 2);
        let back = serde_json::to_value(&field).unwrap();
        assert_eq!(back["type"], "repeater");
        assert_eq!(back["children"][0]["slug"], "cell");
    }

    #[test]
    fn value_record_defaults_shop() {
        let json = r#"{"field_slug":"material","entity_type":"product","entity_id":7}"#;
        let record: ValueRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id_shop, 1);
        assert_eq!(record.id_lang, None);
    }
}
