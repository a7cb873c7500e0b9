//! Database Connection Management
//!
//! This module provides the backing connection and the raw SQL statements
//! for the `repository` table using libsql.
//!
//! # Architecture
//!
//! - **Path-agnostic**: accepts any valid PathBuf; parent directories are
//!   created on demand
//! - **Destructive bootstrap**: every `new` drops and recreates the
//!   `repository` table; initialization only, not for reopening a store
//!   with data to preserve
//! - **WAL mode**: Write-Ahead Logging with a 5-second busy timeout
//! - **Single shared database**: operations take short-lived connection
//!   handles from one `Arc<Database>`; statement execution is serialized
//!   by the engine
//!
//! All methods here return `Result` and never mask faults; the lossy
//! error policy lives a layer up in the store.
//!
//! # Examples
//!
//! ```no_run
//! use keytree_core::db::DatabaseService;
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db_path = PathBuf::from("./data/keytree.db");
//!     let db_service = DatabaseService::new(db_path).await?;
//!     Ok(())
//! }
//! ```

use crate::db::error::DatabaseError;
use crate::models::Node;
use libsql::{Builder, Database};
use std::path::PathBuf;
use std::sync::Arc;

/// Database service managing the libsql connection and the
/// `repository` table schema
#[derive(Debug, Clone)]
pub struct DatabaseService {
    /// libsql database handle (wrapped in Arc for sharing)
    pub db: Arc<Database>,

    /// Path to the database file
    pub db_path: PathBuf,
}

impl DatabaseService {
    /// Create a new DatabaseService with the specified database path
    ///
    /// This will:
    /// 1. Ensure the parent directory exists (create if needed)
    /// 2. Open/create the database file
    /// 3. Recreate the `repository` table from scratch, dropping any
    ///    pre-existing table of the same name
    ///
    /// Failure to connect is fatal and must abort startup; errors here
    /// are always propagated, never swallowed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if:
    /// - Parent directory cannot be created
    /// - Database connection fails
    /// - Table bootstrap fails
    pub async fn new(db_path: PathBuf) -> Result<Self, DatabaseError> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::PermissionDenied {
                        DatabaseError::permission_denied(db_path.clone())
                    } else {
                        DatabaseError::DirectoryCreationFailed(e)
                    }
                })?;
            }
        }

        // Open database connection using Builder pattern
        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| DatabaseError::connection_failed(db_path.clone(), e))?;

        let service = Self {
            db: Arc::new(db),
            db_path,
        };

        service.bootstrap_schema().await?;

        Ok(service)
    }

    /// Execute a PRAGMA statement
    ///
    /// PRAGMA statements return rows, so we must use query() instead of
    /// execute(). This helper encapsulates that pattern.
    async fn execute_pragma(
        &self,
        conn: &libsql::Connection,
        pragma: &str,
    ) -> Result<(), DatabaseError> {
        let mut stmt = conn.prepare(pragma).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        let _ = stmt.query(()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    /// Recreate the `repository` table and its parent index
    ///
    /// The bootstrap is deliberately destructive: any existing
    /// `repository` table is dropped first. The table has no uniqueness
    /// constraint on `key`; the store's read-before-write access pattern
    /// is what keeps keys effectively unique.
    async fn bootstrap_schema(&self) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        // Enable WAL mode for better concurrency
        self.execute_pragma(&conn, "PRAGMA journal_mode = WAL")
            .await?;

        // Set busy timeout to 5 seconds (5000ms) so concurrent statements
        // wait for the lock instead of failing immediately
        self.execute_pragma(&conn, "PRAGMA busy_timeout = 5000")
            .await?;

        conn.execute("DROP TABLE IF EXISTS repository", ())
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to drop repository table: {}", e))
            })?;

        conn.execute(
            "CREATE TABLE repository (
                id     TEXT PRIMARY KEY,
                key    TEXT,
                value  TEXT,
                parent TEXT
            )",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to create repository table: {}", e))
        })?;

        // Index on parent (child enumeration is the hot lookup)
        conn.execute(
            "CREATE INDEX idx_repository_parent ON repository(parent)",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!(
                "Failed to create index 'idx_repository_parent': {}",
                e
            ))
        })?;

        // Flush the freshly created schema out of the WAL
        self.execute_pragma(&conn, "PRAGMA wal_checkpoint(TRUNCATE)")
            .await?;

        Ok(())
    }

    /// Get a synchronous connection handle
    pub fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        self.db.connect().map_err(DatabaseError::LibsqlError)
    }

    /// Get an async connection with busy timeout configured
    ///
    /// Use this in all async functions: the busy timeout makes concurrent
    /// statements wait and retry instead of failing immediately when the
    /// database is locked, which matters once the Tokio runtime moves
    /// futures between threads at `.await` points.
    pub async fn connect_with_timeout(&self) -> Result<libsql::Connection, DatabaseError> {
        let conn = self.connect()?;

        self.execute_pragma(&conn, "PRAGMA busy_timeout = 5000")
            .await?;

        Ok(conn)
    }

    //
    // REPOSITORY TABLE OPERATIONS
    // Raw single-row SQL statements. The store layer owns row conversion,
    // the ancestor walk, and the error masking policy.
    //

    /// Fetch the first row whose `key` equals the argument
    ///
    /// # Returns
    ///
    /// * `Ok(Some(row))` - a matching row (columns: id, key, value, parent)
    /// * `Ok(None)` - no row matches
    /// * `Err(DatabaseError)` - statement execution failed
    ///
    /// `key` is not schema-unique; if duplicates exist only the first row
    /// in result-set order is returned.
    pub async fn db_get(&self, key: &str) -> Result<Option<libsql::Row>, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let mut stmt = conn
            .prepare("SELECT id, key, value, parent FROM repository WHERE key = ?")
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to prepare get query: {}", e))
            })?;

        let mut rows = stmt.query([key]).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute get query: {}", e))
        })?;

        rows.next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))
    }

    /// Fetch all rows whose `parent` equals the argument
    ///
    /// Returns the raw result set in iteration order (no enforced sort);
    /// the caller strips each key down to its leaf segment.
    pub async fn db_children(&self, parent: &str) -> Result<libsql::Rows, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let mut stmt = conn
            .prepare("SELECT id, key, value, parent FROM repository WHERE parent = ?")
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to prepare children query: {}", e))
            })?;

        stmt.query([parent]).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute children query: {}", e))
        })
    }

    /// Insert a node as a new row
    pub async fn db_insert(&self, node: &Node) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        conn.execute(
            "INSERT INTO repository (id, key, value, parent) VALUES (?, ?, ?, ?)",
            (
                node.id.as_str(),
                node.key.as_str(),
                node.value.as_str(),
                node.parent.as_str(),
            ),
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert node: {}", e)))?;

        Ok(())
    }

    /// Update the value of every row with the given key, parent untouched
    pub async fn db_update(&self, key: &str, value: &str) -> Result<u64, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let rows_affected = conn
            .execute(
                "UPDATE repository SET value = ? WHERE key = ?",
                (value, key),
            )
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to update node: {}", e)))?;

        Ok(rows_affected)
    }

    /// Delete the row with the exact given key
    ///
    /// Never cascades: rows whose `parent` references the deleted key
    /// survive as orphans.
    ///
    /// # Returns
    ///
    /// Number of rows affected (0 = key didn't exist)
    pub async fn db_delete(&self, key: &str) -> Result<u64, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let rows_affected = conn
            .execute("DELETE FROM repository WHERE key = ?", [key])
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to delete node: {}", e)))?;

        Ok(rows_affected)
    }

    /// Release the backing database
    ///
    /// Checkpoints the WAL so all writes are flushed; the connection
    /// handles are dropped by scope. Safe to call more than once.
    pub async fn db_close(&self) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;
        self.execute_pragma(&conn, "PRAGMA wal_checkpoint(TRUNCATE)")
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_database_creation() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let db_service = DatabaseService::new(db_path.clone()).await.unwrap();

        assert_eq!(db_service.db_path, db_path);
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_schema_bootstrap() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let db_service = DatabaseService::new(db_path).await.unwrap();
        let conn = db_service.connect().unwrap();

        // Verify repository table exists
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name='repository'")
            .await
            .unwrap();
        let mut rows = stmt.query(()).await.unwrap();
        let row = rows.next().await.unwrap().unwrap();
        let table_name: String = row.get(0).unwrap();
        assert_eq!(table_name, "repository");

        // Verify parent index exists
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='index' AND name='idx_repository_parent'")
            .await
            .unwrap();
        let mut rows = stmt.query(()).await.unwrap();
        assert!(rows.next().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_bootstrap_drops_existing_data() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let db_service = DatabaseService::new(db_path.clone()).await.unwrap();
        let node = Node::new("/a".to_string(), "1".to_string(), "/".to_string());
        db_service.db_insert(&node).await.unwrap();
        assert!(db_service.db_get("/a").await.unwrap().is_some());
        db_service.db_close().await.unwrap();
        drop(db_service);

        // Re-bootstrapping the same path recreates the table from scratch
        let db_service = DatabaseService::new(db_path).await.unwrap();
        assert!(db_service.db_get("/a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_get_update_delete() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db_service = DatabaseService::new(db_path).await.unwrap();

        let node = Node::new("/x".to_string(), "1".to_string(), "/".to_string());
        db_service.db_insert(&node).await.unwrap();

        let row = db_service.db_get("/x").await.unwrap().unwrap();
        let value: String = row.get(2).unwrap();
        assert_eq!(value, "1");

        let affected = db_service.db_update("/x", "2").await.unwrap();
        assert_eq!(affected, 1);
        let row = db_service.db_get("/x").await.unwrap().unwrap();
        let value: String = row.get(2).unwrap();
        assert_eq!(value, "2");

        let affected = db_service.db_delete("/x").await.unwrap();
        assert_eq!(affected, 1);
        assert!(db_service.db_get("/x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db_service = DatabaseService::new(db_path).await.unwrap();

        let affected = db_service.db_delete("/nonexistent").await.unwrap();
        assert_eq!(affected, 0);
    }

    #[tokio::test]
    async fn test_close_without_use_and_twice() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db_service = DatabaseService::new(db_path).await.unwrap();

        db_service.db_close().await.unwrap();
        db_service.db_close().await.unwrap();
    }
}
