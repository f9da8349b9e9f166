//! Trait definitions for external interactions
//!
//! These traits define the boundary between the sweep loop and the database.
//! Infrastructure implementations live in other crates.

use crate::SqlValue;

/// A database handle that can execute parameterized statements
///
/// Implemented by the infrastructure layer (sweeper-store) and by test doubles.
/// Calls are synchronous; any timeout belongs to the driver behind the handle.
pub trait Database {
    /// Error type for database operations
    type Error;

    /// Outcome of a successful execution
    type Result: ExecResult<Error = Self::Error>;

    /// Execute a statement with positional parameters
    fn exec(&self, sql: &str, params: &[SqlValue]) -> Result<Self::Result, Self::Error>;
}

/// The outcome of one statement execution
///
/// Retrieving the row count is a separate, fallible step: some drivers only
/// learn it lazily, and a failure there must be told apart from a failed
/// execution.
pub trait ExecResult {
    /// Error type for row count retrieval
    type Error;

    /// Number of rows the statement affected
    fn rows_affected(&self) -> Result<u64, Self::Error>;
}

impl<D: Database + ?Sized> Database for &D {
    type Error = D::Error;
    type Result = D::Result;

    fn exec(&self, sql: &str, params: &[SqlValue]) -> Result<Self::Result, Self::Error> {
        (**self).exec(sql, params)
    }
}

impl<D: Database + ?Sized> Database for std::sync::Arc<D> {
    type Error = D::Error;
    type Result = D::Result;

    fn exec(&self, sql: &str, params: &[SqlValue]) -> Result<Self::Result, Self::Error> {
        (**self).exec(sql, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::Arc;

    struct Affected(u64);

    impl ExecResult for Affected {
        type Error = String;

        fn rows_affected(&self) -> Result<u64, Self::Error> {
            Ok(self.0)
        }
    }

    struct CountingDb {
        calls: Cell<u64>,
    }

    impl Database for CountingDb {
        type Error = String;
        type Result = Affected;

        fn exec(&self, _sql: &str, params: &[SqlValue]) -> Result<Self::Result, Self::Error> {
            self.calls.set(self.calls.get() + 1);
            Ok(Affected(params.len() as u64))
        }
    }

    #[test]
    fn test_reference_forwards() {
        let db = CountingDb { calls: Cell::new(0) };
        let by_ref = &db;
        let result = by_ref.exec("DELETE FROM t", &[SqlValue::Null]).unwrap();
        assert_eq!(result.rows_affected().unwrap(), 1);
        assert_eq!(db.calls.get(), 1);
    }

    #[test]
    fn test_arc_forwards() {
        struct Fixed;
        impl Database for Fixed {
            type Error = String;
            type Result = Affected;
            fn exec(&self, _sql: &str, _params: &[SqlValue]) -> Result<Self::Result, Self::Error> {
                Ok(Affected(7))
            }
        }

        let db = Arc::new(Fixed);
        let result = db.exec("DELETE FROM t", &[]).unwrap();
        assert_eq!(result.rows_affected().unwrap(), 7);
    }
}
