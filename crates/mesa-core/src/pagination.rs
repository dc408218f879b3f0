//! Lenient pagination.
//!
//! Query strings are parsed by hand rather than rejected: a missing,
//! non-numeric or out-of-range `page`/`page_size` silently falls back to the
//! default instead of producing a 400.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Page size used when none (or a bad one) is given.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page size accepted by [`PageRequest::new`].
pub const MAX_PAGE_SIZE: i64 = 100;

/// A normalised page request. `page` is 1-based.
///
/// Fields are private: every constructor falls back to defaults, so
/// `page >= 1` and `page_size >= 1` always hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    page_size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Builds a request with the crate-wide default and maximum size.
    ///
    /// ```rust
    /// use mesa_core::pagination::PageRequest;
    ///
    /// let req = PageRequest::new(1, 0);
    /// assert_eq!((req.page(), req.page_size()), (1, 20));
    /// ```
    pub fn new(page: i64, page_size: i64) -> Self {
        Self::clamp(Some(page), Some(page_size), DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)
    }

    /// Normalises raw query values.
    ///
    /// ```rust
    /// use mesa_core::pagination::PageRequest;
    ///
    /// let req = PageRequest::from_raw(Some("0"), Some("abc"), 20, 100);
    /// assert_eq!((req.page(), req.page_size()), (1, 20));
    /// ```
    pub fn from_raw(
        page: Option<&str>,
        page_size: Option<&str>,
        default_size: i64,
        max_size: i64,
    ) -> Self {
        let parse = |v: Option<&str>| v.and_then(|s| s.trim().parse::<i64>().ok());
        Self::clamp(parse(page), parse(page_size), default_size, max_size)
    }

    fn clamp(page: Option<i64>, page_size: Option<i64>, default_size: i64, max_size: i64) -> Self {
        let max_size = max_size.max(1);
        let default_size = default_size.clamp(1, max_size);

        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let page_size = page_size
            .filter(|s| (1..=max_size).contains(s))
            .unwrap_or(default_size);

        PageRequest { page, page_size }
    }

    #[inline]
    pub fn page(&self) -> i64 {
        self.page
    }

    #[inline]
    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    #[inline]
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    #[inline]
    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

/// Pagination block returned alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(req: PageRequest, total: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + req.page_size - 1) / req.page_size
        };

        Pagination {
            page: req.page,
            page_size: req.page_size,
            total,
            total_pages,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}
