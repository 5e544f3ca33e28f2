//! Paginated results.

use serde::{Deserialize, Serialize};

use super::contrato::Contrato;

/// One page of results.
///
/// `total_pages` is trusted as sent by the server; it is expected to equal
/// `ceil(total / limit)` (see [`expected_total_pages`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// Items on this page, in server order.
    pub items: Vec<T>,
    /// Page number, 1-based.
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Total number of matching items.
    pub total: u64,
    /// Total number of pages.
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
}

/// Listing response of `GET /contratos`.
pub type ContratosResponse = PagedResult<Contrato>;

impl<T> PagedResult<T> {
    /// Returns true if the page has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns pagination state for this page.
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.total_pages)
    }
}

/// `ceil(total / limit)`, or 0 when `limit` is 0.
pub fn expected_total_pages(total: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(u64::from(limit))
}

// ============================================================================
// Pagination
// ============================================================================

/// Previous/next availability for a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page, 1-based.
    pub page: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

impl Pagination {
    /// Creates pagination state.
    pub fn new(page: u32, total_pages: u32) -> Self {
        Self { page, total_pages }
    }

    /// Returns true if a previous page exists.
    pub fn can_go_back(&self) -> bool {
        self.page > 1
    }

    /// Returns true if a next page exists.
    pub fn can_go_forward(&self) -> bool {
        self.page < self.total_pages
    }

    /// Returns true if page controls are worth showing.
    pub fn is_multi_page(&self) -> bool {
        self.total_pages > 1
    }

    /// Returns the previous page number, if any.
    pub fn previous(&self) -> Option<u32> {
        self.can_go_back().then(|| self.page - 1)
    }

    /// Returns the next page number, if any.
    pub fn next(&self) -> Option<u32> {
        self.can_go_forward().then(|| self.page + 1)
    }
}
