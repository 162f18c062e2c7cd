//! Central schema registry for fieldsync types.
//!
//! The `SchemaRegistry` builds JSON Schemas from fieldsync-core types at
//! construction time using [`schemars::schema_for!`] and provides validation
//! via `jsonschema`.

use std::collections::HashMap;

use schemars::schema_for;

use crate::error::SchemaError;

/// Registered name of the per-group sync document schema.
pub const SYNC_RECORD: &str = "sync_record";
/// Registered name of the whole-store snapshot schema.
pub const STORE_SNAPSHOT: &str = "store_snapshot";

/// Central store of the JSON Schemas in the fieldsync system.
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, serde_json::Value>,
}

/// Insert a schema into the map, converting the `schemars` output to a
/// `serde_json::Value`. Panics if `serde_json::to_value` fails (should be
/// infallible for valid `schemars` output).
macro_rules! register {
    ($map:expr, $name:expr, $ty:ty) => {
        $map.insert($name, serde_json::to_value(schema_for!($ty)).unwrap());
    };
}

impl SchemaRegistry {
    /// Build a registry holding the two on-disk document schemas: the
    /// per-group record and the whole-store snapshot.
    ///
    /// # Panics
    ///
    /// Panics if `serde_json::to_value` fails on a `schemars`-generated
    /// schema. This is not expected in practice.
    #[must_use]
    pub fn new() -> Self {
        let mut schemas = HashMap::new();
        register!(schemas, SYNC_RECORD, fieldsync_core::document::SyncRecord);
        register!(schemas, STORE_SNAPSHOT, fieldsync_core::document::StoreSnapshot);
        Self { schemas }
    }

    /// Get a schema by name. Returns `None` if not found.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.schemas.get(name)
    }

    /// Validate a JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the schema name is unknown, or
    /// `SchemaError::ValidationFailed` if validation produces errors.
    pub fn validate(&self, name: &str, instance: &serde_json::Value) -> Result<(), SchemaError> {
        let schema = self
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;

        let validator = jsonschema::validator_for(schema)
            .map_err(|e| SchemaError::Generation(format!("{e}")))?;

        let errors: Vec<String> = validator
            .iter_errors(instance)
            .map(|e| format!("{e}"))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed { errors })
        }
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new()
    }

    #[test]
    fn registry_holds_both_document_schemas() {
        let registry = registry();
        assert_eq!(registry.schema_count(), 2);
        assert!(registry.get(SYNC_RECORD).is_some());
        assert!(registry.get(STORE_SNAPSHOT).is_some());
    }

    #[test]
    fn validate_valid_sync_record() {
        let record = json!({
            "version": "1.0",
            "module_version": "0.1.0",
            "exported_at": "2026-10-19T12:00:00+00:00",
            "checksum": "sha256:ab",
            "group": {"slug": "specs", "title": "Specifications", "priority": 10},
            "fields": [{"slug": "material", "type": "text", "title": "Material"}]
        });
        assert!(registry().validate(SYNC_RECORD, &record).is_ok());
    }

    #[test]
    fn validate_rejects_record_without_fields() {
        let record = json!({
            "version": "1.0",
            "group": {"slug": "specs", "title": "Specifications"}
        });
        let result = registry().validate(SYNC_RECORD, &record);
        if let Err(SchemaError::ValidationFailed { errors }) = result {
            assert!(!errors.is_empty());
        } else {
            panic!("Expected ValidationFailed");
        }
    }

    #[test]
    fn validate_rejects_wrong_priority_type() {
        let record = json!({
            "group": {"slug": "specs", "title": "Specifications", "priority": "high"},
            "fields": []
        });
        assert!(registry().validate(SYNC_RECORD, &record).is_err());
    }

    #[test]
    fn validate_snapshot_with_values() {
        let snapshot = json!({
            "version": "1.0",
            "groups": [{"group": {"slug": "a", "title": "A"}, "fields": []}],
            "values": [{"field_slug": "x", "entity_type": "product", "entity_id": 1}]
        });
        assert!(registry().validate(STORE_SNAPSHOT, &snapshot).is_ok());
    }

    #[test]
    fn validate_nonexistent_schema_returns_not_found() {
        let result = registry().validate("bogus", &json!({}));
        assert!(matches!(result, Err(SchemaError::NotFound(_))));
    }
}
