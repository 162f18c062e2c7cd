//! # fieldsync-db
//!
//! libSQL store for fieldsync: schema groups, their fields, the values
//! entities hold for those fields, and the sync bookkeeping the engine needs
//! (last store mutation, last completed sync).
//!
//! Uses the `libsql` crate (C `SQLite` fork, v0.9.29). The sync engine never
//! touches SQL directly; it consumes the [`store::SchemaStore`] contract,
//! which [`service::SchemaService`] implements.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
pub mod store;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Raw database handle: one libSQL database and its connection.
pub struct SchemaDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl SchemaDb {
    /// Open a local database at the given path, or `":memory:"` for tests.
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let schema_db = Self { db, conn };
        schema_db.run_migrations().await?;
        tracing::debug!(path, "opened fieldsync store");
        Ok(schema_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}
