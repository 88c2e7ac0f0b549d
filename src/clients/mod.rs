//! Typed clients in front of the resource actors.

#[macro_use]
mod macros;
pub mod order_client;
pub mod product_client;

pub use order_client::*;
pub use product_client::*;

use serde::Serialize;

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// 1-based page selection. Out-of-range values are clamped, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: DEFAULT_PAGE_LIMIT }
    }
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub pages: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Cuts one page out of an already filtered and sorted snapshot, so the
/// total always describes the same data as the page.
pub(crate) fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let request = PageRequest::new(request.page, request.limit);
    let total = items.len();
    let limit = request.limit as usize;
    let items = items.into_iter().skip(request.offset()).take(limit).collect();

    Page {
        items,
        pagination: Pagination {
            page: request.page,
            limit: request.limit,
            total,
            pages: total.div_ceil(limit),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_middle_page() {
        let page = paginate((1..=45).collect::<Vec<_>>(), PageRequest::new(2, 20));
        assert_eq!(page.items.first(), Some(&21));
        assert_eq!(page.items.len(), 20);
        assert_eq!(page.pagination, Pagination { page: 2, limit: 20, total: 45, pages: 3 });
    }

    #[test]
    fn test_paginate_past_the_end_is_empty() {
        let page = paginate(vec![1, 2, 3], PageRequest::new(5, 2));
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.pages, 2);
    }

    #[test]
    fn test_page_request_is_clamped() {
        assert_eq!(PageRequest::new(0, 0), PageRequest { page: 1, limit: 1 });
        assert_eq!(PageRequest::new(3, 1000).limit, MAX_PAGE_LIMIT);
    }
}
