//! Pagination types for list queries.

use serde::{Deserialize, Serialize};

/// Default page size.
pub const DEFAULT_PAGE_SIZE: u64 = 10;
/// Maximum page size.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Number of items per page.
    #[serde(default = "default_limit")]
    pub limit: u64,
}

impl PageRequest {
    /// Create a page request, clamping into the default bounds.
    pub fn new(page: u64, limit: u64) -> Self {
        Self::bounded(page, limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)
    }

    /// Create a page request with explicit bounds.
    ///
    /// A page below 1 becomes 1; a limit outside `1..=max_limit` falls back
    /// to `default_limit`.
    pub fn bounded(page: u64, limit: u64, default_limit: u64, max_limit: u64) -> Self {
        let limit = if (1..=max_limit).contains(&limit) {
            limit
        } else {
            default_limit
        };
        Self {
            page: page.max(1),
            limit,
        }
    }

    /// Calculate the SQL `OFFSET` value, saturating for absurd pages.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Paginated response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Current page number (1-based).
    pub page: u64,
    /// Number of items per page.
    pub limit: u64,
    /// Total number of matching items across all pages.
    pub total: u64,
}

impl<T> PageResponse<T> {
    /// Create a new paginated response.
    pub fn new(items: Vec<T>, request: &PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page,
            limit: request.limit,
            total,
        }
    }

    /// Total number of pages.
    pub fn total_pages(&self) -> u64 {
        if self.total == 0 {
            1
        } else {
            self.total.div_ceil(self.limit.max(1))
        }
    }

    /// Whether there is a next page.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    DEFAULT_PAGE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_limit_falls_back_to_default() {
        assert_eq!(PageRequest::new(1, 0).limit, DEFAULT_PAGE_SIZE);
        assert_eq!(PageRequest::new(1, 101).limit, DEFAULT_PAGE_SIZE);
        assert_eq!(PageRequest::new(1, 100).limit, 100);
    }

    #[test]
    fn test_page_zero_becomes_first_page() {
        let page = PageRequest::new(0, 20);
        assert_eq!(page.page, 1);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(3, 25).offset(), 50);
    }

    #[test]
    fn test_offset_saturates_on_huge_page() {
        assert_eq!(PageRequest::new(u64::MAX, 10).offset(), u64::MAX);
        assert_eq!(PageRequest::new(u64::MAX, 1).offset(), u64::MAX - 1);
    }

    #[test]
    fn test_total_pages() {
        let resp = PageResponse::new(vec![1, 2], &PageRequest::new(1, 2), 5);
        assert_eq!(resp.total_pages(), 3);
        assert!(resp.has_next());
        let empty: PageResponse<u8> = PageResponse::new(vec![], &PageRequest::default(), 0);
        assert_eq!(empty.total_pages(), 1);
        assert!(!empty.has_next());
    }
}
