//! # fieldsync-schema
//!
//! JSON Schema generation and validation for fieldsync.
//!
//! Document types are defined in `fieldsync-core` with
//! `#[derive(JsonSchema)]`. This crate builds the schemas once and validates
//! arbitrary JSON against them. The import resolver uses it for strict mode,
//! where schema findings are logged before the document is applied.

pub mod error;
pub mod registry;

pub use error::SchemaError;
pub use registry::SchemaRegistry;
