//! Repository modules implementing store operations for fieldsync entities.
//!
//! Each module adds methods to `SchemaService` via `impl SchemaService` blocks.

pub mod field;
pub mod group;
pub mod meta;
pub mod value;
