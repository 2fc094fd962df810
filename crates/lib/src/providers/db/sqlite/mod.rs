use crate::errors::TagError;
use std::fmt::{self, Debug};
use tracing::info;
use turso::{Database, Row, Value as TursoValue};

pub mod sql;

/// A provider for interacting with a local SQLite database using Turso.
///
/// This provider holds a `Database` instance, which manages connections.
/// When cloned, it shares the same underlying database, allowing shared access
/// to the same database file or in-memory instance.
#[derive(Clone)]
pub struct SqliteProvider {
    /// The Turso database instance. It's cloneable and thread-safe.
    pub db: Database,
}

impl SqliteProvider {
    /// Creates a new `SqliteProvider` from a file path or in-memory.
    ///
    /// # Arguments
    ///
    /// * `db_path`: The path to the SQLite database file. Use ":memory:" for a unique,
    ///   isolated in-memory database. To share an in-memory database across multiple
    ///   `SqliteProvider` instances (e.g., in tests), create one provider and
    ///   then `.clone()` it.
    pub async fn new(db_path: &str) -> Result<Self, TagError> {
        let db = turso::Builder::new_local(db_path)
            .build()
            .await
            .map_err(|e| TagError::StorageConnection(e.to_string()))?;

        // WAL has no effect on in-memory databases but is safe to run.
        let conn = db
            .connect()
            .map_err(|e| TagError::StorageConnection(e.to_string()))?;
        // Use `query` for PRAGMA statements that return a value to avoid "unexpected row" errors.
        conn.query("PRAGMA journal_mode=WAL;", ())
            .await
            .map_err(|e| TagError::StorageConnection(e.to_string()))?;

        Ok(Self { db })
    }

    /// A helper for tests to pre-populate data by executing multiple SQL statements.
    pub async fn initialize_with_data(&self, init_sql: &str) -> Result<(), TagError> {
        let conn = self.connect()?;
        for statement in init_sql.split(';').filter(|s| !s.trim().is_empty()) {
            conn.execute(statement, ()).await?;
        }
        Ok(())
    }

    /// Ensures that all required application tables exist.
    /// This function is idempotent and safe to call on every application startup.
    pub async fn initialize_schema(&self) -> Result<(), TagError> {
        let conn = self.connect()?;
        for statement in sql::ALL_TABLE_CREATION_SQL {
            conn.execute(statement, ()).await?;
        }
        info!("Database schema is up to date.");
        Ok(())
    }

    pub fn connect(&self) -> Result<turso::Connection, TagError> {
        self.db
            .connect()
            .map_err(|e| TagError::StorageConnection(e.to_string()))
    }
}

impl Debug for SqliteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteProvider").finish_non_exhaustive()
    }
}

impl AsRef<Database> for SqliteProvider {
    fn as_ref(&self) -> &Database {
        &self.db
    }
}

/// Binds an optional value as SQL `NULL` when absent.
pub(crate) fn nullable<T: Into<TursoValue>>(value: Option<T>) -> TursoValue {
    value.map_or(TursoValue::Null, Into::into)
}

/// Reads a nullable TEXT column.
pub(crate) fn opt_text(row: &Row, idx: usize) -> Result<Option<String>, TagError> {
    match row.get_value(idx)? {
        TursoValue::Null => Ok(None),
        TursoValue::Text(s) => Ok(Some(s)),
        other => Err(TagError::DataIntegrity(format!(
            "expected TEXT or NULL in column {idx}, found {other:?}"
        ))),
    }
}

/// Reads a nullable INTEGER column.
pub(crate) fn opt_int(row: &Row, idx: usize) -> Result<Option<i64>, TagError> {
    match row.get_value(idx)? {
        TursoValue::Null => Ok(None),
        TursoValue::Integer(i) => Ok(Some(i)),
        other => Err(TagError::DataIntegrity(format!(
            "expected INTEGER or NULL in column {idx}, found {other:?}"
        ))),
    }
}
