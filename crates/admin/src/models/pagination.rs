//! Page/limit handling shared by list endpoints.

use serde::Serialize;

/// Default page size when `limit` is omitted.
pub const DEFAULT_LIMIT: i64 = 20;
/// Largest page size a client may request.
pub const MAX_LIMIT: i64 = 100;

/// Normalized pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Clamp raw query values: page >= 1, limit in `1..=MAX_LIMIT`.
    #[must_use]
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    /// Rows to skip.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    /// Describe this window given the total row count.
    #[must_use]
    pub const fn info(&self, total: i64) -> PageInfo {
        let total_pages = if total == 0 {
            0
        } else {
            (total + self.limit - 1) / self.limit
        };
        PageInfo {
            page: self.page,
            limit: self.limit,
            total,
            total_pages,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Pagination block returned alongside list results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// A page of rows plus its pagination block.
#[derive(Debug, Clone, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub pagination: PageInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_clamping() {
        assert_eq!(Pagination::new(None, None), Pagination { page: 1, limit: 20 });
        assert_eq!(Pagination::new(Some(0), Some(0)), Pagination { page: 1, limit: 1 });
        assert_eq!(Pagination::new(Some(-4), Some(500)).limit, MAX_LIMIT);
    }

    #[test]
    fn test_offset_and_total_pages() {
        let window = Pagination::new(Some(3), Some(20));
        assert_eq!(window.offset(), 40);
        assert_eq!(window.info(41).total_pages, 3);
        assert_eq!(window.info(40).total_pages, 2);
        assert_eq!(window.info(0).total_pages, 0);
    }
}
