//! Structured list parameters handed to a [`Repository`](super::Repository).

use crate::domain::entity::FieldValue;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterOperator {
    Eq(FieldValue),
    IsNull,
    IsNotNull,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    pub field: String,
    pub operator: FilterOperator,
}

impl FilterCondition {
    pub fn eq(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            field: field.into(),
            operator: FilterOperator::Eq(value.into()),
        }
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: FilterOperator::IsNull,
        }
    }

    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: FilterOperator::IsNotNull,
        }
    }
}

/// Opaque predicate fragment for cases the structured form cannot express.
///
/// `sql` uses `?` as the placeholder; `args` are bound in order. Only server
/// code builds these, never request input.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPredicate {
    pub sql: String,
    pub args: Vec<FieldValue>,
}

impl RawPredicate {
    pub fn new(sql: impl Into<String>, args: Vec<FieldValue>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }
}

/// Conjunction of conditions plus an optional raw fragment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub conditions: Vec<FilterCondition>,
    pub raw: Option<RawPredicate>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an equality filter from `(field, value)` pairs.
    pub fn from_equalities<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        Self {
            conditions: pairs
                .into_iter()
                .map(|(k, v)| FilterCondition::eq(k, v))
                .collect(),
            raw: None,
        }
    }

    pub fn eq(self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.and(FilterCondition::eq(field, value))
    }

    pub fn is_null(self, field: impl Into<String>) -> Self {
        self.and(FilterCondition::is_null(field))
    }

    pub fn is_not_null(self, field: impl Into<String>) -> Self {
        self.and(FilterCondition::is_not_null(field))
    }

    /// Adds a condition; existing conditions are kept.
    pub fn and(mut self, condition: FilterCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_raw(mut self, raw: RawPredicate) -> Self {
        self.raw = Some(raw);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.raw.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// Case-insensitive `ASC` / `DESC`.
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "ASC" => Some(SortDirection::Asc),
            "DESC" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Canonical storage-side pagination.
///
/// Page-based requests convert with `offset = (page - 1) * size`, `limit = size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Pagination {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    pub fn from_page(page: u32, size: u32) -> Self {
        let size = i64::from(size.max(1));
        let page = i64::from(page.max(1));
        Self {
            limit: size,
            offset: (page - 1) * size,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    pub filter: Filter,
    /// Applied left to right as primary, secondary, ... keys.
    pub sorts: Vec<Sort>,
    /// `None` returns every matching row.
    pub pagination: Option<Pagination>,
    /// Skip the total-count query; the returned total is then 0.
    pub skip_count: bool,
}

impl ListOptions {
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sorts.push(sort);
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn skip_count(mut self) -> Self {
        self.skip_count = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_converts_to_limit_offset() {
        assert_eq!(Pagination::from_page(1, 20), Pagination::new(20, 0));
        assert_eq!(Pagination::from_page(3, 10), Pagination::new(10, 20));
    }

    #[test]
    fn and_keeps_existing_conditions() {
        let filter = Filter::new().eq("name", "a").is_null("deleted_at");
        assert_eq!(filter.conditions.len(), 2);
        assert_eq!(filter.conditions[0], FilterCondition::eq("name", "a"));
        assert_eq!(filter.conditions[1].operator, FilterOperator::IsNull);
    }

    #[test]
    fn direction_is_case_insensitive() {
        assert_eq!(SortDirection::parse("asc"), Some(SortDirection::Asc));
        assert_eq!(SortDirection::parse(" Desc "), Some(SortDirection::Desc));
        assert_eq!(SortDirection::parse("down"), None);
    }
}
