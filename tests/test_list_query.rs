//! List query parsing against the event-category allow-lists.

use guest_management::domain::category::EVENT_CATEGORY_LIST_CONFIG;
use guest_management::domain::query::{parse_list_query, ListQueryError, ListResult, MAX_SIZE};
use guest_management::domain::repository::{FilterOperator, Pagination, RepoError, Sort};

fn q(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn parse(pairs: &[(&str, &str)]) -> Result<guest_management::ListParams, ListQueryError> {
    parse_list_query(&q(pairs), &EVENT_CATEGORY_LIST_CONFIG)
}

#[test]
fn rejects_non_positive_and_non_numeric_paging() {
    for pairs in [
        vec![("page", "0")],
        vec![("page", "-1")],
        vec![("page", "two")],
        vec![("size", "0")],
        vec![("size", "-5")],
        vec![("size", "ten")],
    ] {
        let err = parse(&pairs).unwrap_err();
        let repo_err: RepoError = err.into();
        assert!(
            matches!(repo_err, RepoError::Validation(_)),
            "{:?} should be a validation error",
            pairs
        );
    }
}

#[test]
fn paging_values_must_be_plain_integers() {
    assert!(matches!(
        parse(&[("page", " 2")]),
        Err(ListQueryError::InvalidPage(_))
    ));
    assert!(matches!(
        parse(&[("size", "10 ")]),
        Err(ListQueryError::InvalidSize(_))
    ));
    assert!(matches!(
        parse(&[("page", "4294967296")]),
        Err(ListQueryError::InvalidPage(_))
    ));
    assert_eq!(parse(&[("page", "4294967295")]).unwrap().page, u32::MAX);
}

#[test]
fn size_is_clamped() {
    let params = parse(&[("size", "500")]).unwrap();
    assert_eq!(params.size, MAX_SIZE);
    assert_eq!(params.size, 100);
}

#[test]
fn page_and_size_map_to_offset() {
    let params = parse(&[("page", "3"), ("size", "10")]).unwrap();
    assert_eq!(params.pagination(), Pagination::new(10, 20));

    let opts = params.to_list_options();
    assert_eq!(opts.pagination, Some(Pagination::new(10, 20)));
    assert!(!opts.skip_count);
}

#[test]
fn sort_field_must_be_allow_listed() {
    let err = parse(&[("sort", "unknownfield,ASC")]).unwrap_err();
    assert_eq!(err, ListQueryError::SortFieldNotAllowed("unknownfield".into()));

    // Soft-delete column is never sortable.
    assert!(parse(&[("sort", "deleted_at,ASC")]).is_err());
}

#[test]
fn sort_direction_is_case_insensitive() {
    let params = parse(&[("sort", "name,asc")]).unwrap();
    assert_eq!(params.sorts, vec![Sort::asc("name")]);

    let params = parse(&[("sort", "created_at,Desc")]).unwrap();
    assert_eq!(params.sorts, vec![Sort::desc("created_at")]);
}

#[test]
fn malformed_sort_is_rejected() {
    assert!(matches!(
        parse(&[("sort", "name")]),
        Err(ListQueryError::InvalidSortFormat(_))
    ));
    assert!(matches!(
        parse(&[("sort", "name,sideways")]),
        Err(ListQueryError::InvalidSortDirection(_))
    ));
}

#[test]
fn repeated_sorts_keep_their_order() {
    let params = parse(&[("sort", "source,ASC"), ("sort", "name,DESC")]).unwrap();
    assert_eq!(params.sorts, vec![Sort::asc("source"), Sort::desc("name")]);
}

#[test]
fn unknown_filter_keys_are_dropped() {
    let params = parse(&[("foo", "bar"), ("deleted_at", "x"), ("name", "Wedding")]).unwrap();
    assert_eq!(params.filters.len(), 1);
    assert_eq!(params.filters.get("name").map(String::as_str), Some("Wedding"));

    let opts = params.to_list_options();
    assert_eq!(opts.filter.conditions.len(), 1);
    assert_eq!(opts.filter.conditions[0].field, "name");
    assert_eq!(
        opts.filter.conditions[0].operator,
        FilterOperator::Eq("Wedding".into())
    );
}

#[test]
fn first_filter_value_wins() {
    let params = parse(&[("source", "app"), ("source", "tenant")]).unwrap();
    assert_eq!(params.filters.get("source").map(String::as_str), Some("app"));
}

#[test]
fn list_result_metadata() {
    let page: ListResult<u8> = ListResult::new(vec![0; 10], 25, 2, 10);
    assert_eq!(page.total_pages, 3);
    assert!(page.has_prev);
    assert!(page.has_next);

    let last: ListResult<u8> = ListResult::new(vec![0; 5], 25, 3, 10);
    assert!(!last.has_next);

    let empty: ListResult<u8> = ListResult::new(Vec::new(), 0, 1, 20);
    assert_eq!(empty.total_pages, 0);
    assert!(!empty.has_prev);
    assert!(!empty.has_next);
}
