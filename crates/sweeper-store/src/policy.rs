//! Retention-based delete statements for SQLite tables

use crate::StoreError;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use sweeper_domain::DeleteStatement;

/// Current timestamp in seconds since Unix epoch
fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn validate_identifier(name: &str) -> Result<(), StoreError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

/// Deletes rows whose timestamp column is older than a retention window
///
/// The column must hold unix seconds. SQLite builds usually lack
/// `DELETE ... LIMIT`, so the batch bound goes through a rowid subquery:
///
/// ```sql
/// DELETE FROM "reservation" WHERE rowid IN
///   (SELECT rowid FROM "reservation" WHERE "expiry" < ?1 LIMIT ?2)
/// ```
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use sweeper_store::ExpiryPolicy;
///
/// let policy = ExpiryPolicy::new("reservation", "expiry", 1000, Duration::from_secs(3600)).unwrap();
/// let stmt = policy.statement_at(10_000);
/// assert_eq!(stmt.params.len(), 2);
///
/// assert!(ExpiryPolicy::new("reservation; DROP TABLE x", "expiry", 1000, Duration::ZERO).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ExpiryPolicy {
    table: String,
    column: String,
    batch_size: u32,
    retention: Duration,
    sql: String,
}

impl ExpiryPolicy {
    /// Create a policy for `table`, keyed on `column`
    pub fn new(
        table: &str,
        column: &str,
        batch_size: u32,
        retention: Duration,
    ) -> Result<Self, StoreError> {
        validate_identifier(table)?;
        validate_identifier(column)?;
        if batch_size == 0 {
            return Err(StoreError::InvalidData("batch_size must be greater than zero".to_string()));
        }

        let sql = format!(
            r#"DELETE FROM "{table}" WHERE rowid IN (SELECT rowid FROM "{table}" WHERE "{column}" < ?1 LIMIT ?2)"#
        );

        Ok(Self {
            table: table.to_string(),
            column: column.to_string(),
            batch_size,
            retention,
            sql,
        })
    }

    /// Table the policy deletes from
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Timestamp column compared against the cutoff
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Maximum rows removed per statement
    pub fn batch_size(&self) -> u32 {
        self.batch_size
    }

    /// Cutoff for a given "now": rows strictly older are deleted
    pub fn cutoff_at(&self, now: i64) -> i64 {
        let retention = i64::try_from(self.retention.as_secs()).unwrap_or(i64::MAX);
        now.saturating_sub(retention)
    }

    /// Statement for an explicit "now"
    pub fn statement_at(&self, now: i64) -> DeleteStatement {
        DeleteStatement::new(self.sql.as_str())
            .bind(self.cutoff_at(now))
            .bind(self.batch_size)
    }

    /// Statement using the current wall clock
    pub fn statement(&self) -> DeleteStatement {
        self.statement_at(current_timestamp())
    }

    /// Turn the policy into a delete factory that recomputes the cutoff per batch
    pub fn into_factory(self) -> impl Fn() -> DeleteStatement + Send + Sync + 'static {
        move || self.statement()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweeper_domain::SqlValue;

    #[test]
    fn test_identifier_validation() {
        assert!(validate_identifier("reservation").is_ok());
        assert!(validate_identifier("_private_2").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("2fast").is_err());
        assert!(validate_identifier("my-table").is_err());
        assert!(validate_identifier("x\"; DROP TABLE y; --").is_err());
    }

    #[test]
    fn test_statement_text_and_params() {
        let policy = ExpiryPolicy::new("reservation", "expiry", 1000, Duration::from_secs(60)).unwrap();
        let stmt = policy.statement_at(1_000);

        assert_eq!(
            stmt.sql,
            r#"DELETE FROM "reservation" WHERE rowid IN (SELECT rowid FROM "reservation" WHERE "expiry" < ?1 LIMIT ?2)"#
        );
        assert_eq!(stmt.params, vec![SqlValue::Integer(940), SqlValue::Integer(1000)]);
        assert_eq!(policy.table(), "reservation");
        assert_eq!(policy.column(), "expiry");
        assert_eq!(policy.batch_size(), 1000);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let result = ExpiryPolicy::new("t", "c", 0, Duration::ZERO);
        assert!(matches!(result, Err(StoreError::InvalidData(_))));
    }

    #[test]
    fn test_cutoff_saturates() {
        let policy = ExpiryPolicy::new("t", "c", 1, Duration::from_secs(u64::MAX)).unwrap();
        assert_eq!(policy.cutoff_at(0), -i64::MAX);
    }

    #[test]
    fn test_factory_uses_wall_clock() {
        let policy = ExpiryPolicy::new("t", "c", 10, Duration::ZERO).unwrap();
        let before = current_timestamp();
        let factory = policy.into_factory();

        match factory().params.first() {
            Some(SqlValue::Integer(cutoff)) => assert!(*cutoff >= before),
            other => panic!("unexpected cutoff parameter: {:?}", other),
        }
    }
}
