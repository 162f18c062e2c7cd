//! Content checksum over the semantic subset of a group aggregate.
//!
//! Covered: group slug, title, location rules, placement, priority, active;
//! and for every field (children right after their parent, each level in
//! position order) its slug, type, title, config, validation, and parent
//! slug. Ids, UUIDs, timestamps, descriptions, and the remaining option bags
//! are not covered, and neither is key order inside any bag.

use fieldsync_core::document::{FieldDocument, GroupDocument};
use serde_json::{Value, json};
use sha2::{Digest, Sha256};

use crate::canon_json::to_canonical_string;
use crate::canonical::decode_bag;
use crate::error::SyncError;

pub const ALGORITHM: &str = "sha256";

/// `sha256:<hex>` of the canonical encoding of `value`.
///
/// # Errors
///
/// Returns `SyncError::Json` if the value cannot be encoded.
pub fn digest(value: &Value) -> Result<String, SyncError> {
    let canonical = to_canonical_string(value)?;
    Ok(format!(
        "{ALGORITHM}:{}",
        hex::encode(Sha256::digest(canonical.as_bytes()))
    ))
}

fn by_position(fields: &[FieldDocument]) -> Vec<&FieldDocument> {
    let mut sorted: Vec<&FieldDocument> = fields.iter().collect();
    sorted.sort_by_key(|f| f.position);
    sorted
}

fn field_entry(field: &FieldDocument, parent: Option<&str>) -> Value {
    json!({
        "slug": field.slug,
        "type": field.field_type,
        "title": field.title,
        "config": decode_bag(&field.config),
        "validation": decode_bag(&field.validation),
        "parent": parent,
    })
}

/// The value the checksum is computed over.
#[must_use]
pub fn checksum_subject(group: &GroupDocument, fields: &[FieldDocument]) -> Value {
    let mut entries = Vec::new();
    for field in by_position(fields) {
        entries.push(field_entry(field, None));
        for child in by_position(&field.children) {
            entries.push(field_entry(child, Some(&field.slug)));
        }
    }
    json!({
        "group": {
            "slug": group.slug,
            "title": group.title,
            "location_rules": decode_bag(&group.location_rules),
            "placement_tab": group.placement_tab,
            "placement_position": group.placement_position,
            "priority": group.priority,
            "active": group.active,
        },
        "fields": entries,
    })
}

/// Checksum of a group body.
///
/// # Errors
///
/// Returns `SyncError::Json` if the body cannot be encoded.
pub fn checksum_body(group: &GroupDocument, fields: &[FieldDocument]) -> Result<String, SyncError> {
    digest(&checksum_subject(group, fields))
}
