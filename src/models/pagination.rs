use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

/// Normalized page request. `page` starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    // Out-of-range input falls back to defaults instead of failing the request.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = limit
            .filter(|l| (1..=MAX_LIMIT).contains(l))
            .unwrap_or(DEFAULT_LIMIT);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub page: u32,
    pub limit: u32,
    pub total_items: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(p: Pagination, total_items: i64, data: Vec<T>) -> Self {
        let limit = i64::from(p.limit);
        let total_pages = (total_items + limit - 1) / limit;
        Self {
            page: p.page,
            limit: p.limit,
            total_items,
            total_pages,
            has_next: i64::from(p.page) < total_pages,
            has_prev: p.page > 1,
            data,
        }
    }
}
