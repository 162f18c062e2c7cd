//! Shared test utilities for fieldsync-db unit tests.

pub(crate) mod helpers {
    use fieldsync_core::entities::{FieldDraft, GroupDraft, SchemaField, SchemaGroup};
    use fieldsync_core::enums::FieldType;

    use crate::SchemaDb;
    use crate::service::SchemaService;

    /// Create an in-memory `SchemaService`.
    pub async fn test_service() -> SchemaService {
        let db = SchemaDb::open_local(":memory:").await.unwrap();
        SchemaService::from_db(db)
    }

    /// Create a group with default attributes.
    pub async fn make_group(svc: &SchemaService, slug: &str) -> SchemaGroup {
        svc.create_group(&GroupDraft::new(slug, slug.to_uppercase()))
            .await
            .unwrap()
    }

    /// Create a top-level field in `group_id`.
    pub async fn make_field(
        svc: &SchemaService,
        group_id: i64,
        slug: &str,
        field_type: FieldType,
        position: i64,
    ) -> SchemaField {
        let mut draft = FieldDraft::new(group_id, slug, field_type, slug.to_uppercase());
        draft.position = position;
        svc.create_field(&draft).await.unwrap()
    }
}
