//! Service layer hosting the repository methods.
//!
//! `SchemaService` wraps `SchemaDb` (raw database access). All repo methods
//! are implemented as `impl SchemaService` blocks under [`crate::repos`].

use crate::SchemaDb;
use crate::error::DatabaseError;

/// Owns the store connection; every mutation also stamps the store's
/// modification time in `sync_meta` so the whole-store classifier can compare
/// it with the aggregate file.
pub struct SchemaService {
    db: SchemaDb,
}

impl SchemaService {
    /// Create a new service wrapping a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path`: path to the libSQL database file, or `":memory:"` for tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = SchemaDb::open_local(db_path).await?;
        Ok(Self { db })
    }

    /// Create from an existing `SchemaDb` (for testing).
    #[must_use]
    pub const fn from_db(db: SchemaDb) -> Self {
        Self { db }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &SchemaDb {
        &self.db
    }

    // -----------------------------------------------------------------------
    // Units of work
    // -----------------------------------------------------------------------
    //
    // SQLite savepoints: they nest, and the outermost one opens and commits
    // the transaction. Every repo method runs on the same connection, so
    // everything between `savepoint` and `release` lands or vanishes
    // together, `sync_meta` stamps included.

    /// Open a unit of work named `name`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for a name that is not a plain
    /// identifier, or a query error.
    pub async fn savepoint(&self, name: &str) -> Result<(), DatabaseError> {
        check_savepoint_name(name)?;
        self.db.conn().execute(&format!("SAVEPOINT {name}"), ()).await?;
        Ok(())
    }

    /// Keep everything done since `savepoint(name)`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if no such savepoint is open.
    pub async fn release(&self, name: &str) -> Result<(), DatabaseError> {
        check_savepoint_name(name)?;
        self.db.conn().execute(&format!("RELEASE {name}"), ()).await?;
        Ok(())
    }

    /// Undo everything done since `savepoint(name)` and close it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if no such savepoint is open.
    pub async fn rollback_to(&self, name: &str) -> Result<(), DatabaseError> {
        check_savepoint_name(name)?;
        let conn = self.db.conn();
        conn.execute(&format!("ROLLBACK TO {name}"), ()).await?;
        conn.execute(&format!("RELEASE {name}"), ()).await?;
        tracing::debug!(savepoint = name, "rolled back");
        Ok(())
    }
}

fn check_savepoint_name(name: &str) -> Result<(), DatabaseError> {
    let valid = name.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DatabaseError::InvalidState(format!(
            "invalid savepoint name '{name}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::helpers::{make_group, test_service};

    #[tokio::test]
    async fn rollback_discards_rows_and_stamps() {
        let svc = test_service().await;
        svc.savepoint("unit").await.unwrap();
        make_group(&svc, "specs").await;
        svc.rollback_to("unit").await.unwrap();

        assert!(svc.find_group_by_slug("specs").await.unwrap().is_none());
        assert!(svc.store_modified_at().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn release_keeps_rows() {
        let svc = test_service().await;
        svc.savepoint("unit").await.unwrap();
        make_group(&svc, "specs").await;
        svc.release("unit").await.unwrap();

        assert!(svc.find_group_by_slug("specs").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn inner_rollback_keeps_outer_work() {
        let svc = test_service().await;
        svc.savepoint("outer").await.unwrap();
        make_group(&svc, "kept").await;
        svc.savepoint("inner").await.unwrap();
        make_group(&svc, "dropped").await;
        svc.rollback_to("inner").await.unwrap();
        svc.release("outer").await.unwrap();

        assert!(svc.find_group_by_slug("kept").await.unwrap().is_some());
        assert!(svc.find_group_by_slug("dropped").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn savepoint_names_must_be_identifiers() {
        let svc = test_service().await;
        assert!(svc.savepoint("x; DROP TABLE fields").await.is_err());
        assert!(svc.savepoint("").await.is_err());
    }
}
