// Shared pagination query parameters and list envelope

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 50;

/// `?page=&limit=` query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,

    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}
fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PageQuery {
    /// 1-based page, never below 1
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }

    /// Saturates so an absurd `page` yields an empty page instead of overflowing
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

/// `%term%` for ILIKE with the LIKE metacharacters escaped.
/// Blank terms yield `None` so callers skip the filter.
pub fn contains_pattern(term: &str) -> Option<String> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{}%", escaped))
}

/// List response with paging metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, query: &PageQuery) -> Self {
        let limit = query.limit();
        Self {
            items,
            total,
            page: query.page(),
            limit,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_capped() {
        let query = PageQuery { page: 2, limit: 500 };
        assert_eq!(query.limit(), MAX_PAGE_SIZE);
        assert_eq!(query.offset(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_page_floor() {
        let query = PageQuery { page: 0, limit: 0 };
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 1);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let query = PageQuery {
            page: i64::MAX,
            limit: 10,
        };
        assert_eq!(query.page(), i64::MAX);
        assert_eq!(query.offset(), i64::MAX);

        let capped = PageQuery {
            page: i64::MAX,
            limit: i64::MAX,
        };
        assert_eq!(capped.offset(), i64::MAX);
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern(" rust "), Some("%rust%".to_string()));
        assert_eq!(contains_pattern("100%_"), Some("%100\\%\\_%".to_string()));
        assert_eq!(contains_pattern("   "), None);
    }

    #[test]
    fn test_total_pages() {
        let query = PageQuery { page: 1, limit: 10 };
        let page = Paginated::new(vec![1, 2, 3], 21, &query);
        assert_eq!(page.total_pages, 3);

        let empty: Paginated<i32> = Paginated::new(vec![], 0, &query);
        assert_eq!(empty.total_pages, 0);
    }
}
