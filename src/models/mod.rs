pub mod conversation;
pub mod message;
pub mod notification;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 20;
pub const MESSAGES_DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 100;

/// Query-string pagination parameters shared by the list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    /// Normalize into (page, limit, offset) with the given default limit.
    pub fn resolve(&self, default_limit: i64) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(DEFAULT_PAGE).max(1);
        let limit = self.limit.unwrap_or(default_limit).clamp(1, MAX_LIMIT);
        (page, limit, (page - 1) * limit)
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        Self {
            page,
            limit,
            total,
            total_pages: if limit > 0 { (total + limit - 1) / limit } else { 0 },
        }
    }

    /// Zeroed pagination for the empty-membership short-circuit.
    pub fn empty(limit: i64) -> Self {
        Self {
            page: 1,
            limit,
            total: 0,
            total_pages: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_applies_defaults_and_caps() {
        let q = PageQuery { page: None, limit: None };
        assert_eq!(q.resolve(20), (1, 20, 0));

        let q = PageQuery { page: Some(3), limit: Some(10) };
        assert_eq!(q.resolve(20), (3, 10, 20));

        let q = PageQuery { page: Some(0), limit: Some(10_000) };
        assert_eq!(q.resolve(20), (1, MAX_LIMIT, 0));
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(Pagination::new(1, 20, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 20, 20).total_pages, 1);
        assert_eq!(Pagination::new(1, 20, 21).total_pages, 2);
        assert_eq!(Pagination::empty(50).total, 0);
    }
}
