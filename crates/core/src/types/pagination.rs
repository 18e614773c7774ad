//! Offset pagination for list endpoints.

use thiserror::Error;

/// Errors produced while reading pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("Invalid page number")]
    InvalidPage,
    #[error("Invalid pageSize number")]
    InvalidPageSize,
}

/// A validated page request (1-based page, positive page size).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub const DEFAULT_PAGE: u32 = 1;
    pub const DEFAULT_PAGE_SIZE: u32 = 10;

    /// Build a page request from raw query-string values.
    ///
    /// Missing values fall back to the defaults. Present values must parse as
    /// integers greater than zero.
    ///
    /// # Errors
    ///
    /// Returns [`PageError`] naming the first invalid parameter.
    pub fn from_query(page: Option<&str>, page_size: Option<&str>) -> Result<Self, PageError> {
        let page = parse_positive(page, Self::DEFAULT_PAGE).ok_or(PageError::InvalidPage)?;
        let page_size =
            parse_positive(page_size, Self::DEFAULT_PAGE_SIZE).ok_or(PageError::InvalidPageSize)?;
        Ok(Self { page, page_size })
    }

    /// Build a page request from already-validated numbers.
    ///
    /// Returns `None` if either value is zero.
    #[must_use]
    pub const fn new(page: u32, page_size: u32) -> Option<Self> {
        if page == 0 || page_size == 0 {
            return None;
        }
        Some(Self { page, page_size })
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of rows to fetch (SQL `LIMIT`).
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    /// Number of rows to skip (SQL `OFFSET`).
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }

    /// Total number of pages needed for `total` rows.
    #[must_use]
    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        let size = i64::from(self.page_size);
        (total + size - 1) / size
    }
}

fn parse_positive(raw: Option<&str>, default: u32) -> Option<u32> {
    match raw {
        None => Some(default),
        Some(value) => value.trim().parse::<u32>().ok().filter(|n| *n > 0),
    }
}
