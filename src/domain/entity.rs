//! Name-driven access to entity columns.
//!
//! Stores that evaluate filters or sorts themselves (the in-memory store) read
//! columns through [`Record::field`] instead of per-entity mapping code.

use chrono::{DateTime, SecondsFormat, Utc};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

/// A single column value, as seen by filters, sorts and bind parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Int(i64),
    Bool(bool),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Equality as a SQL `=` would see it.
    ///
    /// Query-string filters always arrive as text, so a text value is compared
    /// against typed columns through its canonical rendering. `NULL` never
    /// matches anything.
    pub fn matches(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Null, _) | (_, FieldValue::Null) => false,
            (FieldValue::Uuid(u), FieldValue::Text(s)) | (FieldValue::Text(s), FieldValue::Uuid(u)) => {
                Uuid::parse_str(s.trim()).map(|p| p == *u).unwrap_or(false)
            }
            (a, b) if std::mem::discriminant(a) == std::mem::discriminant(b) => a == b,
            (a, b) => a.to_string() == b.to_string(),
        }
    }

    /// Total order used for sorting. NULLs sort last, like Postgres in ASC order.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => Ordering::Equal,
            (FieldValue::Null, _) => Ordering::Greater,
            (_, FieldValue::Null) => Ordering::Less,
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (FieldValue::Int(a), FieldValue::Int(b)) => a.cmp(b),
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a.cmp(b),
            (FieldValue::Uuid(a), FieldValue::Uuid(b)) => a.cmp(b),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => a.cmp(b),
            (a, b) => a.to_string().cmp(&b.to_string()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("NULL"),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Uuid(u) => write!(f, "{}", u.hyphenated()),
            FieldValue::Timestamp(t) => f.write_str(&t.to_rfc3339_opts(SecondsFormat::Micros, true)),
        }
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<Uuid> for FieldValue {
    fn from(v: Uuid) -> Self {
        FieldValue::Uuid(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// A persisted row with a stable identifier and columns addressable by name.
pub trait Record: Clone + Send + Sync + 'static {
    type Id: Clone + Ord + fmt::Display + Send + Sync + 'static;

    /// Column holding the identifier.
    const ID_COLUMN: &'static str = "id";

    fn id(&self) -> Self::Id;

    /// Returns the value of `column`, or `None` if the entity has no such column.
    fn field(&self, column: &str) -> Option<FieldValue>;
}
