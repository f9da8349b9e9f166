//! Statement module - delete statements and their positional parameters

use std::fmt;

/// A positional parameter bound into a delete statement
///
/// The variants follow the storage classes most SQL drivers understand.
/// Backends map each variant onto their own parameter type.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL NULL
    Null,

    /// Signed 64-bit integer (also used for unix timestamps)
    Integer(i64),

    /// 64-bit float
    Real(f64),

    /// UTF-8 text
    Text(String),

    /// Raw bytes
    Blob(Vec<u8>),
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Integer(v) => write!(f, "{}", v),
            SqlValue::Real(v) => write!(f, "{}", v),
            SqlValue::Text(v) => write!(f, "'{}'", v),
            SqlValue::Blob(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Integer(i64::from(value))
    }
}

impl From<u32> for SqlValue {
    fn from(value: u32) -> Self {
        SqlValue::Integer(i64::from(value))
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Real(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Integer(i64::from(value))
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(value: Vec<u8>) -> Self {
        SqlValue::Blob(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

/// A parameterized delete statement produced by a delete factory
///
/// `sql` is handed to the database driver untouched; `params` are bound
/// positionally in order. A factory builds a fresh statement for every
/// batch, so time-relative cutoffs may be recomputed on each call.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    /// Statement text understood by the target driver
    pub sql: String,

    /// Positional arguments substituted into the statement
    pub params: Vec<SqlValue>,
}

impl DeleteStatement {
    /// Create a statement with no parameters
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Append a positional parameter
    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.params.push(value.into());
        self
    }

    /// Replace the parameter list
    pub fn with_params(mut self, params: Vec<SqlValue>) -> Self {
        self.params = params;
        self
    }
}

impl fmt::Display for DeleteStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql)?;
        if !self.params.is_empty() {
            let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
            write!(f, " [{}]", params.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_appends_in_order() {
        let stmt = DeleteStatement::new("DELETE FROM reservation WHERE expiry < ?1 LIMIT ?2")
            .bind(1_700_000_000_i64)
            .bind(1000_i32);

        assert_eq!(
            stmt.params,
            vec![SqlValue::Integer(1_700_000_000), SqlValue::Integer(1000)]
        );
    }

    #[test]
    fn test_option_maps_to_null() {
        let none: Option<i64> = None;
        assert_eq!(SqlValue::from(none), SqlValue::Null);
        assert_eq!(SqlValue::from(Some("x")), SqlValue::Text("x".to_string()));
    }

    #[test]
    fn test_display() {
        let stmt = DeleteStatement::new("DELETE FROM t WHERE a = ?1 AND b = ?2")
            .bind("gone")
            .bind(vec![1_u8, 2, 3]);
        assert_eq!(
            stmt.to_string(),
            "DELETE FROM t WHERE a = ?1 AND b = ?2 ['gone', <3 bytes>]"
        );
        assert_eq!(DeleteStatement::new("DELETE FROM t").to_string(), "DELETE FROM t");
    }

    #[test]
    fn test_with_params_replaces() {
        let stmt = DeleteStatement::new("DELETE FROM t WHERE a = ?1")
            .bind(1_i64)
            .with_params(vec![SqlValue::Real(0.5)]);
        assert_eq!(stmt.params, vec![SqlValue::Real(0.5)]);
    }
}
