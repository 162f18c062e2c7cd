//! Portable identity helpers.
//!
//! Groups and fields carry two identities: the store-assigned integer id
//! (local to one database) and a UUID minted once at first creation. The UUID
//! is what survives a reimport into a different store, so it is never
//! regenerated once assigned.

use uuid::Uuid;

/// Mint a new portable identity (hyphenated lowercase UUID v4).
#[must_use]
pub fn new_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Use the supplied identity when present and non-blank, otherwise mint one.
#[must_use]
pub fn uuid_or_new(existing: Option<&str>) -> String {
    match existing.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => new_uuid(),
    }
}

/// Characters allowed in a slug. Slugs double as file names on the sync side.
#[must_use]
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= 128
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}
