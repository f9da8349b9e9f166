//! Sweeper Storage Layer
//!
//! Implements the `Database` trait on top of SQLite, plus [`ExpiryPolicy`],
//! a ready-made delete factory for "rows older than a retention window".
//!
//! # Examples
//!
//! ```no_run
//! use sweeper_store::SqliteDatabase;
//!
//! let db = SqliteDatabase::open("app.db").unwrap();
//! // db can now be handed to a sweeper
//! ```

#![warn(missing_docs)]

mod policy;

pub use policy::ExpiryPolicy;

use rusqlite::types::Value;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use sweeper_domain::traits::{Database, ExecResult};
use sweeper_domain::SqlValue;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Table or column name that cannot be safely embedded in SQL
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A previous holder of the connection panicked
    #[error("Connection lock poisoned")]
    Poisoned,
}

/// SQLite-based implementation of `Database`
///
/// # Thread Safety
///
/// The connection sits behind a mutex, so one `SqliteDatabase` can be shared
/// through an `Arc` between a sweeper and the rest of the application.
/// Statements from different holders are serialized.
pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Open (or create) the database at `path`
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Ok(Self::from_connection(conn))
    }

    /// Open a private in-memory database
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already configured connection
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Run `f` with exclusive access to the connection
    ///
    /// Meant for schema setup and inspection; sweeping goes through
    /// `Database::exec`.
    pub fn with_connection<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = self.lock()?;
        Ok(f(&conn)?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn to_value(value: &SqlValue) -> Value {
        match value {
            SqlValue::Null => Value::Null,
            SqlValue::Integer(v) => Value::Integer(*v),
            SqlValue::Real(v) => Value::Real(*v),
            SqlValue::Text(v) => Value::Text(v.clone()),
            SqlValue::Blob(v) => Value::Blob(v.clone()),
        }
    }
}

/// Row count returned by SQLite for one statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqliteExecResult {
    changes: usize,
}

impl ExecResult for SqliteExecResult {
    type Error = StoreError;

    fn rows_affected(&self) -> Result<u64, Self::Error> {
        u64::try_from(self.changes)
            .map_err(|_| StoreError::InvalidData(format!("Row count out of range: {}", self.changes)))
    }
}

impl Database for SqliteDatabase {
    type Error = StoreError;
    type Result = SqliteExecResult;

    fn exec(&self, sql: &str, params: &[SqlValue]) -> Result<Self::Result, Self::Error> {
        let conn = self.lock()?;
        let changes = conn.execute(sql, rusqlite::params_from_iter(params.iter().map(Self::to_value)))?;
        Ok(SqliteExecResult { changes })
    }
}
