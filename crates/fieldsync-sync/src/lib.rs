//! # fieldsync-sync
//!
//! Keeps the field schema in the store and the JSON files under the sync
//! root in agreement.
//!
//! - [`canonical`] and [`checksum`]: store aggregates to documents and the
//!   content digest used to compare them
//! - [`gateway`]: sync root layout, protected directories, locked writes
//! - [`import`]: validation then replace/merge application of a document
//! - [`status`]: per-group checksum classifier and whole-store timestamp
//!   classifier
//! - [`export`], [`debounce`], [`auto_sync`]: whole-store exports and when
//!   they happen
//! - [`engine`]: the operations the CLI exposes

pub mod auto_sync;
pub mod canon_json;
pub mod canonical;
pub mod checksum;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod export;
pub mod gateway;
pub mod import;
pub mod lock;
pub mod status;

pub use debounce::DirtyDebouncer;
pub use engine::SyncEngine;
pub use error::SyncError;
pub use gateway::SyncGateway;
pub use import::ImportOptions;
