//! Entity structs for the field schema and the values entities hold.
//!
//! Each entity maps to a table in the libSQL store (see `fieldsync-db`
//! migrations). Drafts carry the caller-supplied attributes for create and
//! update; store-assigned ids and timestamps only appear on the entities.

mod field;
mod group;
mod value;

pub use field::{FieldDraft, SchemaField};
pub use group::{GroupDraft, SchemaGroup};
pub use value::{FieldValue, FieldValueRow};

/// Empty JSON object, the default for every option bag.
#[must_use]
pub fn empty_bag() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}
