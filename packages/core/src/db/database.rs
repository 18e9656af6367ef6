//! Database Connection Management
//!
//! This module provides the database handle shared by every component of the
//! read path. The store is produced upstream by the collector; this process
//! only ever opens it read-only, once, and hands the handle out by `Arc`.
//!
//! # Database Connection Patterns
//!
//! Use `connect_with_timeout()` in async functions. It sets a busy timeout so
//! reads wait instead of failing with `SQLITE_BUSY` while the collector
//! publishes a new version.
//!
//! ```no_run
//! # use structure_core::db::DatabaseService;
//! # use std::path::PathBuf;
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = DatabaseService::open_read_only(PathBuf::from(".structure/structure.db")).await?;
//! let conn = db.connect_with_timeout().await?;
//! # Ok(())
//! # }
//! ```

use crate::db::error::DatabaseError;
use crate::db::schema;
use libsql::params::IntoParams;
use libsql::{Builder, Database, OpenFlags, Row};
use std::path::PathBuf;
use std::sync::Arc;

/// Database service owning the libsql handle
#[derive(Debug, Clone)]
pub struct DatabaseService {
    /// libsql database handle (wrapped in Arc for sharing)
    pub db: Arc<Database>,

    /// Path to the database file
    pub db_path: PathBuf,

    read_only: bool,
}

impl DatabaseService {
    /// Open an existing store read-only
    ///
    /// Fails fast with [`DatabaseError::StoreMissing`] (carrying the resolved
    /// path) when the file does not exist: that means the collector has not
    /// run and there is nothing to serve.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if:
    /// - The database file does not exist
    /// - The database connection fails
    pub async fn open_read_only(db_path: PathBuf) -> Result<Self, DatabaseError> {
        if !db_path.exists() {
            return Err(DatabaseError::store_missing(db_path));
        }

        tracing::debug!(path = %db_path.display(), "opening structure store read-only");

        let db = Builder::new_local(&db_path)
            .flags(OpenFlags::SQLITE_OPEN_READ_ONLY)
            .build()
            .await
            .map_err(|e| DatabaseError::connection_failed(db_path.clone(), e))?;

        Ok(Self {
            db: Arc::new(db),
            db_path,
            read_only: true,
        })
    }

    /// Open (or create) a writable store and ensure the schema exists
    ///
    /// This is the producer side: the collector and test fixtures use it
    /// through [`crate::db::StructureWriter`]. The serving path never calls it.
    pub async fn create(db_path: PathBuf) -> Result<Self, DatabaseError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| DatabaseError::connection_failed(db_path.clone(), e))?;

        let service = Self {
            db: Arc::new(db),
            db_path,
            read_only: false,
        };

        let conn = service.connect_with_timeout().await?;
        schema::initialize_schema(&conn).await?;

        Ok(service)
    }

    /// Whether this handle was opened read-only
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Get a raw connection (no busy timeout)
    pub fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        self.db.connect().map_err(DatabaseError::LibsqlError)
    }

    /// Get an async connection with busy timeout configured
    pub async fn connect_with_timeout(&self) -> Result<libsql::Connection, DatabaseError> {
        let conn = self.connect()?;
        execute_pragma(&conn, "PRAGMA busy_timeout = 5000").await?;
        Ok(conn)
    }

    /// Run a query and map every row
    ///
    /// `context` names the query in error messages. Each row is handed to
    /// `map` while the cursor still points at it; a libsql `Row` must not
    /// outlive the step that produced it.
    pub async fn fetch_all<T, E, F>(
        &self,
        context: &str,
        sql: &str,
        params: impl IntoParams,
        mut map: F,
    ) -> Result<Vec<T>, E>
    where
        F: FnMut(&Row) -> Result<T, E>,
        E: From<DatabaseError>,
    {
        let conn = self.connect_with_timeout().await?;

        let mut rows = conn.query(sql, params).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute {} query: {}", context, e))
        })?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to read {} row: {}", context, e))
        })? {
            out.push(map(&row)?);
        }
        Ok(out)
    }

    /// Run a query and map its first row, if any
    pub async fn fetch_one<T, E, F>(
        &self,
        context: &str,
        sql: &str,
        params: impl IntoParams,
        map: F,
    ) -> Result<Option<T>, E>
    where
        F: FnOnce(&Row) -> Result<T, E>,
        E: From<DatabaseError>,
    {
        let conn = self.connect_with_timeout().await?;

        let mut rows = conn.query(sql, params).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute {} query: {}", context, e))
        })?;

        let row = rows.next().await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to read {} row: {}", context, e))
        })?;
        match row {
            Some(row) => map(&row).map(Some),
            None => Ok(None),
        }
    }

    /// Check whether a table exists in the store
    pub async fn table_exists(&self, name: &str) -> Result<bool, DatabaseError> {
        let found = self
            .fetch_one(
                "table_exists",
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
                [name],
                |_| Ok::<_, DatabaseError>(()),
            )
            .await?;
        Ok(found.is_some())
    }
}

/// Execute a PRAGMA statement
///
/// PRAGMA statements return rows, so we must use query() instead of execute().
pub(crate) async fn execute_pragma(
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
