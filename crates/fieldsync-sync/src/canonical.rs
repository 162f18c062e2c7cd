//! Canonical serializer: store aggregates to sync documents and back.
//!
//! Export reads a group with its top-level fields and repeater children from
//! the store, decodes option bags that were stored as strings, and attaches
//! the content checksum. Import parsing only checks the bare shape (a `group`
//! object and a `fields` array, or a `groups` array for a snapshot); unknown
//! keys are ignored and field-level rules are left to the import validator.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use fieldsync_core::document::{
    FORMAT_VERSION, FieldDocument, GroupBody, GroupDocument, StoreSnapshot, SyncRecord,
    ValueRecord,
};
use fieldsync_core::entities::{FieldDraft, FieldValueRow, GroupDraft, SchemaField, SchemaGroup};
use fieldsync_core::enums::FieldType;
use fieldsync_db::store::SchemaStore;

use crate::checksum::checksum_body;
use crate::error::SyncError;

/// Decode an option bag that may have been stored as a JSON string.
///
/// A string holding a JSON object or array becomes that structure, a blank
/// string becomes `{}`; anything else is returned unchanged.
#[must_use]
pub fn decode_bag(value: &Value) -> Value {
    match value {
        Value::String(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Value::Object(serde_json::Map::new());
            }
            serde_json::from_str::<Value>(trimmed)
                .ok()
                .filter(|v| v.is_object() || v.is_array())
                .unwrap_or_else(|| value.clone())
        }
        other => other.clone(),
    }
}

/// Current time as the documents carry it.
#[must_use]
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Pretty JSON with a trailing newline, the on-disk form of every document.
///
/// # Errors
///
/// Returns `SyncError::Json` if the document cannot be encoded.
pub fn render<T: Serialize>(document: &T) -> Result<String, SyncError> {
    let mut out = serde_json::to_string_pretty(document)?;
    out.push('\n');
    Ok(out)
}

// ---------------------------------------------------------------------------
// Store -> document
// ---------------------------------------------------------------------------

#[must_use]
pub fn group_document(group: &SchemaGroup) -> GroupDocument {
    GroupDocument {
        uuid: Some(group.uuid.clone()),
        slug: group.slug.clone(),
        title: group.title.clone(),
        description: group.description.clone(),
        location_rules: decode_bag(&group.location_rules),
        placement_tab: group.placement_tab.clone(),
        placement_position: group.placement_position.clone(),
        priority: group.priority,
        bo_options: decode_bag(&group.bo_options),
        fo_options: decode_bag(&group.fo_options),
        active: group.active,
        shops: group.shops.clone(),
    }
}

#[must_use]
pub fn field_document(field: &SchemaField, children: Vec<FieldDocument>) -> FieldDocument {
    FieldDocument {
        uuid: Some(field.uuid.clone()),
        slug: field.slug.clone(),
        field_type: field.field_type.as_str().to_string(),
        title: field.title.clone(),
        instructions: field.instructions.clone(),
        position: field.position,
        config: decode_bag(&field.config),
        validation: decode_bag(&field.validation),
        conditions: decode_bag(&field.conditions),
        wrapper: decode_bag(&field.wrapper),
        fo_options: decode_bag(&field.fo_options),
        value_translatable: field.value_translatable,
        active: field.active,
        children,
    }
}

#[must_use]
pub fn value_record(row: &FieldValueRow) -> ValueRecord {
    ValueRecord {
        field_slug: row.field_slug.clone(),
        entity_type: row.value.entity_type.clone(),
        entity_id: row.value.entity_id,
        id_shop: row.value.shop_id,
        id_lang: row.value.lang_id,
        value: row.value.value.clone(),
        value_index: row.value.value_index.clone(),
    }
}

/// Top-level fields of a group with their repeater children nested.
///
/// # Errors
///
/// Returns `SyncError::Database` if a store read fails.
pub async fn load_fields<S: SchemaStore>(
    store: &S,
    group_id: i64,
) -> Result<Vec<FieldDocument>, SyncError> {
    let mut documents = Vec::new();
    for field in store.find_fields_by_group(group_id).await? {
        let mut children = Vec::new();
        if field.field_type.accepts_children() {
            for child in store.find_fields_by_parent(field.id).await? {
                children.push(field_document(&child, Vec::new()));
            }
        }
        documents.push(field_document(&field, children));
    }
    Ok(documents)
}

/// A group body with its checksum attached.
///
/// # Errors
///
/// Returns `SyncError` if a store read or the checksum fails.
pub async fn load_body<S: SchemaStore>(
    store: &S,
    group: &SchemaGroup,
) -> Result<GroupBody, SyncError> {
    let document = group_document(group);
    let fields = load_fields(store, group.id).await?;
    let checksum = checksum_body(&document, &fields)?;
    Ok(GroupBody {
        checksum: Some(checksum),
        group: document,
        fields,
    })
}

/// The per-group file for `group`.
///
/// # Errors
///
/// Returns `SyncError` if a store read or the checksum fails.
pub async fn build_record<S: SchemaStore>(
    store: &S,
    group: &SchemaGroup,
    module_version: &str,
) -> Result<SyncRecord, SyncError> {
    let body = load_body(store, group).await?;
    Ok(SyncRecord {
        version: FORMAT_VERSION.to_string(),
        module_version: module_version.to_string(),
        exported_at: now_iso(),
        checksum: body.checksum.unwrap_or_default(),
        group: body.group,
        fields: body.fields,
    })
}

/// The whole store, values included.
///
/// # Errors
///
/// Returns `SyncError` if a store read or a checksum fails.
pub async fn build_snapshot<S: SchemaStore>(
    store: &S,
    module_version: &str,
) -> Result<StoreSnapshot, SyncError> {
    let mut groups = Vec::new();
    let mut values = Vec::new();
    for group in store.find_all_groups().await? {
        groups.push(load_body(store, &group).await?);
        values.extend(
            store
                .find_values_by_group(group.id)
                .await?
                .iter()
                .map(value_record),
        );
    }
    Ok(StoreSnapshot {
        version: FORMAT_VERSION.to_string(),
        module_version: module_version.to_string(),
        exported_at: now_iso(),
        groups,
        values,
    })
}

// ---------------------------------------------------------------------------
// Document -> store drafts
// ---------------------------------------------------------------------------

/// Draft for creating or updating a group from a document.
#[must_use]
pub fn group_draft(doc: &GroupDocument) -> GroupDraft {
    GroupDraft {
        uuid: doc.uuid.clone(),
        slug: doc.slug.clone(),
        title: doc.title.clone(),
        description: doc.description.clone(),
        location_rules: decode_bag(&doc.location_rules),
        placement_tab: doc.placement_tab.clone(),
        placement_position: doc.placement_position.clone(),
        priority: doc.priority,
        bo_options: decode_bag(&doc.bo_options),
        fo_options: decode_bag(&doc.fo_options),
        active: doc.active,
        shops: doc.shops.clone(),
    }
}

/// Draft for creating a field; `field_type` is the already-validated tag.
#[must_use]
pub fn field_draft(
    doc: &FieldDocument,
    field_type: FieldType,
    group_id: i64,
    parent_id: Option<i64>,
) -> FieldDraft {
    FieldDraft {
        uuid: doc.uuid.clone(),
        group_id,
        parent_id,
        slug: doc.slug.clone(),
        field_type,
        title: doc.title.clone(),
        instructions: doc.instructions.clone(),
        position: doc.position,
        config: decode_bag(&doc.config),
        validation: decode_bag(&doc.validation),
        conditions: decode_bag(&doc.conditions),
        wrapper: decode_bag(&doc.wrapper),
        fo_options: decode_bag(&doc.fo_options),
        value_translatable: doc.value_translatable,
        active: doc.active,
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// One group (`{group, fields}`).
    Group,
    /// The whole store (`{groups, values}`).
    Snapshot,
}

/// A parsed import document, normalized to a list of group bodies.
#[derive(Debug, Clone)]
pub struct ImportDocument {
    pub kind: DocumentKind,
    pub version: String,
    pub module_version: String,
    pub groups: Vec<GroupBody>,
    pub values: Vec<ValueRecord>,
    /// The document as read, for schema validation.
    pub raw: Value,
}

impl ImportDocument {
    #[must_use]
    pub fn from_record(record: SyncRecord) -> Self {
        let raw = serde_json::to_value(&record).unwrap_or(Value::Null);
        Self {
            kind: DocumentKind::Group,
            version: record.version.clone(),
            module_version: record.module_version.clone(),
            groups: vec![GroupBody::from(record)],
            values: Vec::new(),
            raw,
        }
    }

    /// Several per-group files imported together.
    #[must_use]
    pub fn from_records(records: Vec<SyncRecord>) -> Self {
        let version = records
            .first()
            .map_or_else(|| FORMAT_VERSION.to_string(), |r| r.version.clone());
        let module_version = records
            .first()
            .map(|r| r.module_version.clone())
            .unwrap_or_default();
        let raw = serde_json::to_value(&records).unwrap_or(Value::Null);
        Self {
            kind: DocumentKind::Snapshot,
            version,
            module_version,
            groups: records.into_iter().map(GroupBody::from).collect(),
            values: Vec::new(),
            raw,
        }
    }

    #[must_use]
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let raw = serde_json::to_value(&snapshot).unwrap_or(Value::Null);
        Self {
            kind: DocumentKind::Snapshot,
            version: snapshot.version,
            module_version: snapshot.module_version,
            groups: snapshot.groups,
            values: snapshot.values,
            raw,
        }
    }

    /// Fields in the document, children included.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| g.fields.iter())
            .map(FieldDocument::tree_len)
            .sum()
    }
}

/// Parse either document shape from text.
///
/// # Errors
///
/// Returns `SyncError::Json` for text that is not JSON and
/// `SyncError::Validation` when the bare shape is missing.
pub fn parse_document(text: &str) -> Result<ImportDocument, SyncError> {
    let value: Value = serde_json::from_str(text)?;
    parse_value(value)
}

/// Parse either document shape from a JSON value.
///
/// # Errors
///
/// Returns `SyncError::Validation` when the bare shape is missing or a known
/// key has the wrong type.
pub fn parse_value(value: Value) -> Result<ImportDocument, SyncError> {
    let Some(object) = value.as_object() else {
        return Err(SyncError::Validation(vec![
            "document must be a JSON object".into(),
        ]));
    };

    if object.contains_key("groups") {
        if !object["groups"].is_array() {
            return Err(SyncError::Validation(vec!["'groups' must be an array".into()]));
        }
        let snapshot: StoreSnapshot = serde_json::from_value(value.clone())
            .map_err(|e| SyncError::Validation(vec![format!("malformed snapshot: {e}")]))?;
        let mut document = ImportDocument::from_snapshot(snapshot);
        document.raw = value;
        return Ok(document);
    }

    let mut violations = Vec::new();
    if !object.get("group").is_some_and(Value::is_object) {
        violations.push("missing 'group' object".to_string());
    }
    if !object.get("fields").is_some_and(Value::is_array) {
        violations.push("missing 'fields' array".to_string());
    }
    if !violations.is_empty() {
        return Err(SyncError::Validation(violations));
    }

    let record: SyncRecord = serde_json::from_value(value.clone())
        .map_err(|e| SyncError::Validation(vec![format!("malformed group document: {e}")]))?;
    let mut document = ImportDocument::from_record(record);
    document.raw = value;
    Ok(document)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn decode_bag_variants() {
        assert_eq!(decode_bag(&json!("{\"a\":1}")), json!({"a": 1}));
        assert_eq!(decode_bag(&json!("[1,2]")), json!([1, 2]));
        assert_eq!(decode_bag(&json!("")), json!({}));
        assert_eq!(decode_bag(&json!("plain text")), json!("plain text"));
        assert_eq!(decode_bag(&json!("42")), json!("42"));
        assert_eq!(decode_bag(&json!({"b": true})), json!({"b": true}));
    }

    #[test]
    fn parse_single_group_ignores_unknown_keys() {
        let doc = parse_document(
            r#"{"version":"1.0","future_key":1,
                "group":{"slug":"specs","title":"Specifications","extra":true},
                "fields":[{"slug":"material","type":"text","title":"Material"}]}"#,
        )
        .unwrap();
        assert_eq!(doc.kind, DocumentKind::Group);
        assert_eq!(doc.groups.len(), 1);
        assert_eq!(doc.groups[0].group.slug, "specs");
        assert_eq!(doc.field_count(), 1);
    }

    #[test]
    fn parse_requires_group_and_fields() {
        match parse_document(r#"{"version":"1.0"}"#) {
            Err(SyncError::Validation(v)) => assert_eq!(v.len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(matches!(
            parse_document(r#"{"group":{"slug":"a"},"fields":{}}"#),
            Err(SyncError::Validation(_))
        ));
    }

    #[test]
    fn parse_snapshot_with_values() {
        let doc = parse_value(json!({
            "version": "1.0",
            "groups": [
                {"group": {"slug": "a", "title": "A"}, "fields": []},
                {"group": {"slug": "b", "title": "B"}, "fields": []}
            ],
            "values": [{"field_slug": "x", "entity_type": "product", "entity_id": 3}]
        }))
        .unwrap();
        assert_eq!(doc.kind, DocumentKind::Snapshot);
        assert_eq!(doc.groups.len(), 2);
        assert_eq!(doc.values[0].id_shop, 1);
    }

    #[test]
    fn non_object_rejected() {
        assert!(matches!(parse_document("[]"), Err(SyncError::Validation(_))));
        assert!(matches!(parse_document("not json"), Err(SyncError::Json(_))));
    }

    #[test]
    fn render_ends_with_newline() {
        let out = render(&json!({"a": 1})).unwrap();
        assert!(out.ends_with("}\n"));
    }
}
