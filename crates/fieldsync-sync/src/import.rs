//! Import resolver: applies a parsed document to the store.
//!
//! ```text
//! validate ──violations──> ImportResult::rejected   (no writes)
//!    │
//!    ├─ replace: delete every store group, then create each document group
//!    └─ merge:   per group, update-in-place by slug (fields deleted and
//!                recreated) or create
//!    │
//!    └─ values:  field slug -> id assigned during this import; unknown slugs
//!                are skipped and counted
//! ```
//!
//! Validation is all-or-nothing. Each group is applied inside its own store
//! savepoint: a group that fails is rolled back to its previous state,
//! recorded in `ImportResult::errors`, and the next group is processed.
//! With [`ImportOptions::atomic`] the whole document shares one more
//! savepoint and any failed group discards everything.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use fieldsync_core::document::{FieldDocument, GroupBody, ValueRecord};
use fieldsync_core::entities::FieldValue;
use fieldsync_core::enums::{FieldType, ImportMode};
use fieldsync_core::ids::is_valid_slug;
use fieldsync_core::responses::{GroupImportError, ImportResult};
use fieldsync_db::store::SchemaStore;
use fieldsync_schema::SchemaRegistry;
use fieldsync_schema::registry::{STORE_SNAPSHOT, SYNC_RECORD};

use crate::canonical::{DocumentKind, ImportDocument, field_draft, group_draft};
use crate::error::SyncError;

const DOCUMENT_UNIT: &str = "import_document";
const GROUP_UNIT: &str = "import_group";

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    pub mode: ImportMode,
    /// Check the raw document against the registered JSON schema first.
    /// Findings are logged, never fatal.
    pub strict: bool,
    /// Keep nothing unless every group imports.
    pub atomic: bool,
}

impl ImportOptions {
    #[must_use]
    pub const fn new(mode: ImportMode) -> Self {
        Self {
            mode,
            strict: false,
            atomic: false,
        }
    }

    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[must_use]
    pub const fn atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Keys that must be unique across the whole document.
#[derive(Default)]
struct SeenKeys {
    group_slugs: HashSet<String>,
    group_uuids: HashSet<String>,
    field_slugs: HashSet<String>,
    field_uuids: HashSet<String>,
}

fn check_uuid(
    uuid: Option<&str>,
    location: &str,
    kind: &str,
    seen: &mut HashSet<String>,
    violations: &mut Vec<String>,
) {
    let Some(uuid) = uuid.map(str::trim).filter(|u| !u.is_empty()) else {
        return;
    };
    if !seen.insert(uuid.to_string()) {
        violations.push(format!("{location}: duplicate {kind} uuid '{uuid}'"));
    }
}

fn check_field(
    field: &FieldDocument,
    location: &str,
    nested: bool,
    seen: &mut SeenKeys,
    violations: &mut Vec<String>,
) {
    if field.slug.trim().is_empty() {
        violations.push(format!("{location}: missing 'slug'"));
    } else if !is_valid_slug(&field.slug) {
        violations.push(format!("{location}: invalid slug '{}'", field.slug));
    } else if !seen.field_slugs.insert(field.slug.clone()) {
        violations.push(format!("{location}: duplicate field slug '{}'", field.slug));
    }
    check_uuid(
        field.uuid.as_deref(),
        location,
        "field",
        &mut seen.field_uuids,
        violations,
    );
    if field.title.trim().is_empty() {
        violations.push(format!("{location}: missing 'title'"));
    }

    let field_type = if field.field_type.trim().is_empty() {
        violations.push(format!("{location}: missing 'type'"));
        None
    } else if let Ok(t) = FieldType::from_str(&field.field_type) {
        Some(t)
    } else {
        violations.push(format!("{location}: unknown type '{}'", field.field_type));
        None
    };

    if field.children.is_empty() {
        return;
    }
    if nested {
        violations.push(format!("{location}: nested fields cannot have children"));
    } else if field_type.is_some_and(|t| !t.accepts_children()) {
        violations.push(format!(
            "{location}: only repeater fields can have children (type '{}')",
            field.field_type
        ));
    }
    for (idx, child) in field.children.iter().enumerate() {
        let child_location = format!("{location} child #{}", idx + 1);
        check_field(child, &child_location, true, seen, violations);
    }
}

/// Every rule the document breaks. Empty means it can be imported.
#[must_use]
pub fn validate(document: &ImportDocument) -> Vec<String> {
    let mut violations = Vec::new();
    if document.version.trim().is_empty() {
        violations.push("missing 'version'".to_string());
    }

    let mut seen = SeenKeys::default();
    for (gidx, body) in document.groups.iter().enumerate() {
        let group = &body.group;
        let location = if group.slug.is_empty() {
            format!("group #{}", gidx + 1)
        } else {
            format!("group '{}'", group.slug)
        };

        if group.slug.trim().is_empty() {
            violations.push(format!("{location}: missing 'slug'"));
        } else if !is_valid_slug(&group.slug) {
            violations.push(format!("{location}: invalid slug"));
        } else if !seen.group_slugs.insert(group.slug.clone()) {
            violations.push(format!("{location}: duplicate group slug"));
        }
        check_uuid(
            group.uuid.as_deref(),
            &location,
            "group",
            &mut seen.group_uuids,
            &mut violations,
        );
        if group.title.trim().is_empty() {
            violations.push(format!("{location}: missing 'title'"));
        }

        for (fidx, field) in body.fields.iter().enumerate() {
            let field_location = format!("{location} field #{}", fidx + 1);
            check_field(field, &field_location, false, &mut seen, &mut violations);
        }
    }
    violations
}

/// Log when a document comes from a newer release than this one.
fn check_module_version(document_version: &str, ours: &str) {
    let (Ok(theirs), Ok(current)) = (
        semver::Version::parse(document_version.trim()),
        semver::Version::parse(ours.trim()),
    ) else {
        return;
    };
    if theirs > current {
        tracing::warn!(
            document = %theirs,
            current = %current,
            "sync document was written by a newer fieldsync; unknown keys are ignored"
        );
    }
}

fn check_schema(document: &ImportDocument) {
    let registry = SchemaRegistry::new();
    let (name, instances): (&str, Vec<&serde_json::Value>) = match (&document.kind, &document.raw) {
        (DocumentKind::Group, raw) => (SYNC_RECORD, vec![raw]),
        (DocumentKind::Snapshot, serde_json::Value::Array(records)) => {
            (SYNC_RECORD, records.iter().collect())
        }
        (DocumentKind::Snapshot, raw) => (STORE_SNAPSHOT, vec![raw]),
    };
    for instance in instances {
        if let Err(e) = registry.validate(name, instance) {
            tracing::warn!("Schema validation failed for {name}: {e}");
        }
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

pub struct ImportResolver<'a, S> {
    store: &'a S,
    module_version: &'a str,
}

impl<'a, S: SchemaStore> ImportResolver<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S, module_version: &'a str) -> Self {
        Self {
            store,
            module_version,
        }
    }

    /// Apply `document` to the store.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::EmptySourceGuard` for a replace with no groups
    /// over a populated store, and `SyncError::Database` when the
    /// replace-mode wipe or a savepoint fails; everything else is reported
    /// inside the result.
    pub async fn import(
        &self,
        document: &ImportDocument,
        options: ImportOptions,
    ) -> Result<ImportResult, SyncError> {
        if options.strict {
            check_schema(document);
        }
        check_module_version(&document.module_version, self.module_version);

        let violations = validate(document);
        if !violations.is_empty() {
            tracing::warn!(count = violations.len(), "import rejected by validation");
            return Ok(ImportResult::rejected(options.mode, violations));
        }

        if options.mode == ImportMode::Replace && document.groups.is_empty() {
            let existing_groups = self.store.find_all_groups().await?.len();
            if existing_groups > 0 {
                tracing::warn!(existing_groups, "refusing an empty replace import");
                return Err(SyncError::EmptySourceGuard {
                    target: "the store",
                    existing_groups,
                });
            }
        }

        if !options.atomic {
            return self.apply(document, options.mode).await;
        }

        self.store.savepoint(DOCUMENT_UNIT).await?;
        match self.apply(document, options.mode).await {
            Ok(result) if result.success => {
                self.store.release(DOCUMENT_UNIT).await?;
                Ok(result)
            }
            Ok(mut result) => {
                self.store.rollback_to(DOCUMENT_UNIT).await?;
                result.roll_back();
                tracing::warn!(failed = result.errors.len(), "import rolled back");
                Ok(result)
            }
            Err(e) => {
                self.store.rollback_to(DOCUMENT_UNIT).await?;
                Err(e)
            }
        }
    }

    async fn apply(
        &self,
        document: &ImportDocument,
        mode: ImportMode,
    ) -> Result<ImportResult, SyncError> {
        let mut result = ImportResult::started(mode);

        if mode == ImportMode::Replace {
            for group in self.store.find_all_groups().await? {
                self.store.delete_group(group.id).await?;
                result.deleted.push(group.slug);
            }
        }

        let mut slug_ids: HashMap<String, i64> = HashMap::new();
        for body in &document.groups {
            let mut group_ids = HashMap::new();
            self.store.savepoint(GROUP_UNIT).await?;
            match self.import_group(body, mode, &mut group_ids).await {
                Ok((created, fields)) => {
                    self.store.release(GROUP_UNIT).await?;
                    slug_ids.extend(group_ids);
                    if created {
                        result.created.push(body.group.slug.clone());
                    } else {
                        result.updated.push(body.group.slug.clone());
                    }
                    result.fields_imported += fields;
                }
                Err(e) => {
                    self.store.rollback_to(GROUP_UNIT).await?;
                    tracing::warn!(slug = %body.group.slug, error = %e, "group import failed");
                    result.errors.push(GroupImportError {
                        slug: body.group.slug.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        for record in &document.values {
            if self.import_value(record, &slug_ids).await {
                result.values_imported += 1;
            } else {
                result.values_skipped += 1;
            }
        }

        result.finish();
        tracing::info!(
            %mode,
            created = result.created.len(),
            updated = result.updated.len(),
            deleted = result.deleted.len(),
            failed = result.errors.len(),
            fields = result.fields_imported,
            values = result.values_imported,
            "import finished"
        );
        Ok(result)
    }

    /// Returns whether the group was created (vs updated) and how many
    /// fields were written. Field ids land in `slug_ids`; the caller keeps
    /// them only if the group's savepoint is released.
    async fn import_group(
        &self,
        body: &GroupBody,
        mode: ImportMode,
        slug_ids: &mut HashMap<String, i64>,
    ) -> Result<(bool, u32), SyncError> {
        let draft = group_draft(&body.group);

        let existing = match mode {
            ImportMode::Merge => self.store.find_group_by_slug(&body.group.slug).await?,
            ImportMode::Replace => None,
        };

        let (group_id, created) = if let Some(existing) = existing {
            self.store.update_group(existing.id, &draft).await?;
            self.store.delete_fields_by_group(existing.id).await?;
            (existing.id, false)
        } else {
            (self.store.create_group(&draft).await?.id, true)
        };

        let mut count = 0u32;
        for field in &body.fields {
            let parent = self.create_field(field, group_id, None, slug_ids).await?;
            count += 1;
            for child in &field.children {
                self.create_field(child, group_id, Some(parent), slug_ids)
                    .await?;
                count += 1;
            }
        }
        tracing::debug!(slug = %body.group.slug, created, fields = count, "imported group");
        Ok((created, count))
    }

    async fn create_field(
        &self,
        field: &FieldDocument,
        group_id: i64,
        parent_id: Option<i64>,
        slug_ids: &mut HashMap<String, i64>,
    ) -> Result<i64, SyncError> {
        let field_type = FieldType::from_str(&field.field_type)
            .map_err(|e| SyncError::Validation(vec![e.to_string()]))?;
        let created = self
            .store
            .create_field(&field_draft(field, field_type, group_id, parent_id))
            .await?;
        slug_ids.insert(created.slug, created.id);
        Ok(created.id)
    }

    /// Returns `false` when the value was skipped.
    async fn import_value(&self, record: &ValueRecord, slug_ids: &HashMap<String, i64>) -> bool {
        let Some(&field_id) = slug_ids.get(&record.field_slug) else {
            tracing::warn!(
                field = %record.field_slug,
                entity_type = %record.entity_type,
                entity_id = record.entity_id,
                "skipping value for a field not in this import"
            );
            return false;
        };
        let value = FieldValue {
            field_id,
            entity_type: record.entity_type.clone(),
            entity_id: record.entity_id,
            shop_id: record.id_shop,
            lang_id: record.id_lang,
            value: record.value.clone(),
            value_index: record.value_index.clone(),
        };
        match self.store.save_value(&value).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(field = %record.field_slug, error = %e, "could not save value");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::parse_value;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> ImportDocument {
        parse_value(value).unwrap()
    }

    #[test]
    fn valid_document_has_no_violations() {
        let document = doc(json!({
            "version": "1.0",
            "group": {"slug": "specs", "title": "Specifications"},
            "fields": [{
                "slug": "rows", "type": "repeater", "title": "Rows",
                "children": [{"slug": "cell", "type": "text", "title": "Cell"}]
            }]
        }));
        assert!(validate(&document).is_empty());
    }

    #[test]
    fn every_violation_is_reported() {
        let document = doc(json!({
            "group": {"slug": "", "title": ""},
            "fields": [
                {"slug": "a", "type": "", "title": "A"},
                {"slug": "b", "type": "hologram", "title": ""},
                {"slug": "a", "type": "text", "title": "Again"},
                {"slug": "", "type": "text", "title": "No slug"}
            ]
        }));
        let violations = validate(&document);
        let joined = violations.join("\n");
        assert!(joined.contains("missing 'version'"));
        assert!(joined.contains("group #1: missing 'slug'"));
        assert!(joined.contains("group #1: missing 'title'"));
        assert!(joined.contains("field #1: missing 'type'"));
        assert!(joined.contains("unknown type 'hologram'"));
        assert!(joined.contains("field #2: missing 'title'"));
        assert!(joined.contains("duplicate field slug 'a'"));
        assert!(joined.contains("field #4: missing 'slug'"));
        assert_eq!(violations.len(), 8);
    }

    #[test]
    fn children_only_under_repeaters_one_level_deep() {
        let document = doc(json!({
            "version": "1.0",
            "group": {"slug": "g", "title": "G"},
            "fields": [
                {"slug": "plain", "type": "text", "title": "P",
                 "children": [{"slug": "c1", "type": "text", "title": "C"}]},
                {"slug": "rows", "type": "repeater", "title": "R",
                 "children": [{"slug": "inner", "type": "repeater", "title": "I",
                    "children": [{"slug": "deep", "type": "text", "title": "D"}]}]}
            ]
        }));
        let joined = validate(&document).join("\n");
        assert!(joined.contains("only repeater fields can have children"));
        assert!(joined.contains("nested fields cannot have children"));
    }

    #[test]
    fn duplicate_slugs_across_groups() {
        let document = doc(json!({
            "version": "1.0",
            "groups": [
                {"group": {"slug": "a", "title": "A"},
                 "fields": [{"slug": "x", "type": "text", "title": "X"}]},
                {"group": {"slug": "a", "title": "A2"},
                 "fields": [{"slug": "x", "type": "text", "title": "X2"}]}
            ]
        }));
        let joined = validate(&document).join("\n");
        assert!(joined.contains("duplicate group slug"));
        assert!(joined.contains("duplicate field slug 'x'"));
    }

    #[test]
    fn duplicate_uuids_are_violations() {
        let document = doc(json!({
            "version": "1.0",
            "groups": [
                {"group": {"uuid": "g-dup", "slug": "a", "title": "A"},
                 "fields": [{"uuid": "f-dup", "slug": "x", "type": "text", "title": "X"}]},
                {"group": {"uuid": "g-dup", "slug": "b", "title": "B"},
                 "fields": [{"uuid": "f-dup", "slug": "y", "type": "text", "title": "Y"}]}
            ]
        }));
        let violations = validate(&document);
        let joined = violations.join("\n");
        assert!(joined.contains("group 'b': duplicate group uuid 'g-dup'"));
        assert!(joined.contains("duplicate field uuid 'f-dup'"));
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn missing_uuids_are_not_duplicates() {
        let document = doc(json!({
            "version": "1.0",
            "groups": [
                {"group": {"slug": "a", "title": "A"}, "fields": []},
                {"group": {"uuid": "", "slug": "b", "title": "B"}, "fields": []}
            ]
        }));
        assert!(validate(&document).is_empty());
    }

    #[test]
    fn options_builder() {
        let options = ImportOptions::new(ImportMode::Replace)
            .strict(true)
            .atomic(true);
        assert_eq!(options.mode, ImportMode::Replace);
        assert!(options.strict);
        assert!(options.atomic);
        let defaults = ImportOptions::default();
        assert_eq!(defaults.mode, ImportMode::Merge);
        assert!(!defaults.atomic);
    }
}
