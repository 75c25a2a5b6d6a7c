//! Turns an untrusted list query string into validated list parameters.
//!
//! Grammar:
//!
//! ```text
//! ?page=<int>&size=<int>&sort=<field>,<ASC|DESC>[&sort=...]&<filterField>=<value>...
//! ```
//!
//! Malformed `page`, `size` or `sort` values are rejected. Keys outside the
//! resource's filter allow-list are dropped.

use crate::domain::repository::{Filter, ListOptions, Pagination, RepoError, Sort, SortDirection};
use std::collections::BTreeMap;
use thiserror::Error;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_SIZE: u32 = 20;
pub const MAX_SIZE: u32 = 100;

const PAGE_KEY: &str = "page";
const SIZE_KEY: &str = "size";
const SORT_KEY: &str = "sort";

/// Per-resource allow-lists and paging defaults.
///
/// Page and size values must be plain integers in `1..=u32::MAX`; surrounding
/// whitespace is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQueryConfig {
    pub default_page: u32,
    pub default_size: u32,
    pub max_size: u32,
    pub sort_fields: &'static [&'static str],
    pub filter_fields: &'static [&'static str],
}

impl ListQueryConfig {
    pub const fn new(sort_fields: &'static [&'static str], filter_fields: &'static [&'static str]) -> Self {
        Self {
            default_page: DEFAULT_PAGE,
            default_size: DEFAULT_SIZE,
            max_size: MAX_SIZE,
            sort_fields,
            filter_fields,
        }
    }

    pub fn allows_sort(&self, field: &str) -> bool {
        self.sort_fields.contains(&field)
    }

    pub fn allows_filter(&self, field: &str) -> bool {
        self.filter_fields.contains(&field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListQueryError {
    #[error("invalid page value: {0}")]
    InvalidPage(String),

    #[error("invalid size value: {0}")]
    InvalidSize(String),

    #[error("invalid sort format: {0} (expected field,DIRECTION)")]
    InvalidSortFormat(String),

    #[error("sort field not allowed: {0}")]
    SortFieldNotAllowed(String),

    #[error("invalid sort direction: {0} (expected ASC or DESC)")]
    InvalidSortDirection(String),
}

impl From<ListQueryError> for RepoError {
    fn from(err: ListQueryError) -> Self {
        RepoError::Validation(err.to_string())
    }
}

/// Validated list parameters in page/size form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub page: u32,
    pub size: u32,
    pub sorts: Vec<Sort>,
    /// Allow-listed equality filters; the first value wins on repeated keys.
    pub filters: BTreeMap<String, String>,
}

impl ListParams {
    pub fn pagination(&self) -> Pagination {
        Pagination::from_page(self.page, self.size)
    }

    pub fn to_list_options(&self) -> ListOptions {
        ListOptions {
            filter: Filter::from_equalities(self.filters.iter().map(|(k, v)| (k.clone(), v.clone()))),
            sorts: self.sorts.clone(),
            pagination: Some(self.pagination()),
            skip_count: false,
        }
    }
}

fn first_value<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn parse_positive(raw: &str) -> Option<u32> {
    match raw.parse::<i64>() {
        Ok(n) if n >= 1 => u32::try_from(n).ok(),
        _ => None,
    }
}

fn parse_sort(raw: &str, config: &ListQueryConfig) -> Result<Sort, ListQueryError> {
    let (field, direction) = raw
        .split_once(',')
        .ok_or_else(|| ListQueryError::InvalidSortFormat(raw.to_string()))?;
    let field = field.trim();
    if !config.allows_sort(field) {
        return Err(ListQueryError::SortFieldNotAllowed(field.to_string()));
    }
    let direction = SortDirection::parse(direction)
        .ok_or_else(|| ListQueryError::InvalidSortDirection(direction.to_string()))?;
    Ok(Sort {
        field: field.to_string(),
        direction,
    })
}

/// Parses a multi-valued query (`sort` may repeat) against `config`.
pub fn parse_list_query(
    query: &[(String, String)],
    config: &ListQueryConfig,
) -> Result<ListParams, ListQueryError> {
    let page = match first_value(query, PAGE_KEY).filter(|v| !v.is_empty()) {
        Some(v) => parse_positive(v).ok_or_else(|| ListQueryError::InvalidPage(v.to_string()))?,
        None => config.default_page,
    };

    let size = match first_value(query, SIZE_KEY).filter(|v| !v.is_empty()) {
        Some(v) => parse_positive(v).ok_or_else(|| ListQueryError::InvalidSize(v.to_string()))?,
        None => config.default_size,
    };
    let size = size.min(config.max_size);

    let sorts = query
        .iter()
        .filter(|(k, _)| k == SORT_KEY)
        .map(|(_, v)| parse_sort(v, config))
        .collect::<Result<Vec<_>, _>>()?;

    let mut filters = BTreeMap::new();
    for (key, value) in query {
        if key == PAGE_KEY || key == SIZE_KEY || key == SORT_KEY || !config.allows_filter(key) {
            continue;
        }
        filters.entry(key.clone()).or_insert_with(|| value.clone());
    }

    Ok(ListParams {
        page,
        size,
        sorts,
        filters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: ListQueryConfig = ListQueryConfig::new(&["name", "created_at"], &["name", "source"]);

    fn q(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_when_empty() {
        let params = parse_list_query(&[], &CONFIG).unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.size, 20);
        assert!(params.sorts.is_empty());
        assert!(params.filters.is_empty());
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let params = parse_list_query(&q(&[("page", ""), ("size", "")]), &CONFIG).unwrap();
        assert_eq!((params.page, params.size), (1, 20));
    }

    #[test]
    fn error_names_offending_value() {
        let err = parse_list_query(&q(&[("size", "ten")]), &CONFIG).unwrap_err();
        assert_eq!(err.to_string(), "invalid size value: ten");
    }

    #[test]
    fn sort_requires_separator() {
        let err = parse_list_query(&q(&[("sort", "name")]), &CONFIG).unwrap_err();
        assert!(matches!(err, ListQueryError::InvalidSortFormat(_)));
    }

    #[test]
    fn first_filter_value_wins() {
        let params = parse_list_query(&q(&[("name", "a"), ("name", "b")]), &CONFIG).unwrap();
        assert_eq!(params.filters.get("name").map(String::as_str), Some("a"));
    }

    #[test]
    fn converts_to_list_options() {
        let params = parse_list_query(&q(&[("page", "3"), ("size", "5"), ("source", "app")]), &CONFIG).unwrap();
        let opts = params.to_list_options();
        assert_eq!(opts.pagination, Some(Pagination::new(5, 10)));
        assert_eq!(opts.filter.conditions.len(), 1);
        assert!(!opts.skip_count);
    }
}
