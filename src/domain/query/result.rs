use serde::Serialize;

/// One page of a list response with derived paging metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub size: u32,
    pub total_pages: i64,
    pub has_prev: bool,
    pub has_next: bool,
}

impl<T> ListResult<T> {
    pub fn new(items: Vec<T>, total: i64, page: u32, size: u32) -> Self {
        let total = total.max(0);
        let size_i = i64::from(size.max(1));
        let page_i = i64::from(page);
        Self {
            items,
            total,
            page,
            size,
            total_pages: (total + size_i - 1) / size_i,
            has_prev: page > 1,
            has_next: page_i * size_i < total,
        }
    }
}
