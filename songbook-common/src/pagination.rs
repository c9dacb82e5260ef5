//! Pagination utilities shared by group, song, and verse listings
//!
//! Page numbers are 1-indexed. Bad or missing `page`/`limit` values never
//! fail a request: they fall back to [`DEFAULT_PAGE`] and [`DEFAULT_LIMIT`].

use std::future::Future;

use serde::Serialize;
use tracing::error;

use crate::{Error, Result};

/// Page used when the request omits or garbles `page`
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when the request omits or garbles `limit`
pub const DEFAULT_LIMIT: i64 = 10;

/// Resolved page request
///
/// Only constructible through [`PageRequest::resolve`] or [`PageRequest::new`],
/// so `page >= 1` and `limit >= 1` always hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    limit: i64,
}

impl PageRequest {
    /// Parse untyped query-string values
    ///
    /// # Examples
    /// ```
    /// use songbook_common::pagination::PageRequest;
    ///
    /// let p = PageRequest::resolve(Some("3"), Some("20"));
    /// assert_eq!((p.page(), p.limit(), p.offset()), (3, 20, 40));
    ///
    /// // Garbage falls back to page 1, limit 10
    /// let p = PageRequest::resolve(Some("abc"), Some("-5"));
    /// assert_eq!((p.page(), p.limit(), p.offset()), (1, 10, 0));
    /// ```
    pub fn resolve(raw_page: Option<&str>, raw_limit: Option<&str>) -> Self {
        let page = raw_page.and_then(|s| s.trim().parse::<i64>().ok());
        let limit = raw_limit.and_then(|s| s.trim().parse::<i64>().ok());
        Self::new(page.unwrap_or(DEFAULT_PAGE), limit.unwrap_or(DEFAULT_LIMIT))
    }

    /// Build from already-typed values, applying the same fallbacks
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: if page < 1 { DEFAULT_PAGE } else { page },
            limit: if limit < 1 { DEFAULT_LIMIT } else { limit },
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Row offset for SQL LIMIT/OFFSET: `(page - 1) * limit`
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

/// Number of pages needed for `total` rows: `ceil(total / limit)`
///
/// `limit` is positive for every [`PageRequest`]; a non-positive value here
/// is an internal invariant violation and is reported, never papered over.
pub fn page_count(total: i64, limit: i64) -> Result<i64> {
    if limit <= 0 {
        error!(total, limit, "page_count called with non-positive limit");
        return Err(Error::Internal(format!(
            "page size must be positive, got {}",
            limit
        )));
    }
    let total = total.max(0);
    Ok(total / limit + i64::from(total % limit != 0))
}

/// One page of results plus the metadata clients need to walk the rest
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    #[serde(rename = "data")]
    pub items: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
    pub total: i64,
}

impl<T> Page<T> {
    /// Assemble a page from rows already fetched for `request`
    pub fn from_parts(items: Vec<T>, request: PageRequest, total: i64) -> Result<Self> {
        Ok(Self {
            items,
            page: request.page(),
            limit: request.limit(),
            pages: page_count(total, request.limit())?,
            total,
        })
    }

    /// Replace the rows, keeping the page metadata
    pub fn with_items<U>(self, items: Vec<U>) -> Page<U> {
        Page {
            items,
            page: self.page,
            limit: self.limit,
            pages: self.pages,
            total: self.total,
        }
    }
}

/// Fetch one page of rows plus the matching total
///
/// Every paginated listing goes through here so that the row fetch and the
/// count are always issued as a pair. Callers pass closures that capture the
/// same filter value, which keeps the two predicates identical.
pub async fn paginate<T, RowsFn, RowsFut, CountFn, CountFut>(
    request: PageRequest,
    fetch_rows: RowsFn,
    count_rows: CountFn,
) -> Result<Page<T>>
where
    RowsFn: FnOnce(i64, i64) -> RowsFut,
    RowsFut: Future<Output = Result<Vec<T>>>,
    CountFn: FnOnce() -> CountFut,
    CountFut: Future<Output = Result<i64>>,
{
    let items = fetch_rows(request.limit(), request.offset()).await?;
    let total = count_rows().await?;
    Page::from_parts(items, request, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults_when_absent() {
        let p = PageRequest::resolve(None, None);
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 10);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_resolve_normal() {
        let p = PageRequest::resolve(Some("2"), Some("25"));
        assert_eq!(p.page(), 2);
        assert_eq!(p.limit(), 25);
        assert_eq!(p.offset(), 25);
    }

    #[test]
    fn test_resolve_non_positive_falls_back() {
        let p = PageRequest::resolve(Some("0"), Some("0"));
        assert_eq!((p.page(), p.limit()), (1, 10));

        let p = PageRequest::resolve(Some("-3"), Some("-1"));
        assert_eq!((p.page(), p.limit()), (1, 10));
    }

    #[test]
    fn test_resolve_unparseable_falls_back_independently() {
        let p = PageRequest::resolve(Some("two"), Some("5"));
        assert_eq!((p.page(), p.limit()), (1, 5));

        let p = PageRequest::resolve(Some("4"), Some("1.5"));
        assert_eq!((p.page(), p.limit()), (4, 10));
    }

    #[test]
    fn test_offset_saturates() {
        let p = PageRequest::new(i64::MAX, i64::MAX);
        assert_eq!(p.offset(), i64::MAX);
    }

    #[test]
    fn test_page_count_ceiling() {
        assert_eq!(page_count(0, 10).unwrap(), 0);
        assert_eq!(page_count(1, 10).unwrap(), 1);
        assert_eq!(page_count(10, 10).unwrap(), 1);
        assert_eq!(page_count(11, 10).unwrap(), 2);
        assert_eq!(page_count(25, 10).unwrap(), 3);
        assert_eq!(page_count(7, 1).unwrap(), 7);
    }

    #[test]
    fn test_page_count_matches_float_ceiling() {
        for total in 0..200i64 {
            for limit in 1..15i64 {
                let expected = (total as f64 / limit as f64).ceil() as i64;
                assert_eq!(page_count(total, limit).unwrap(), expected);
            }
        }
    }

    #[test]
    fn test_page_count_rejects_non_positive_limit() {
        assert!(matches!(page_count(10, 0), Err(Error::Internal(_))));
        assert!(matches!(page_count(10, -2), Err(Error::Internal(_))));
    }

    #[tokio::test]
    async fn test_paginate_passes_limit_and_offset() {
        let request = PageRequest::new(3, 4);
        let page = paginate(
            request,
            |limit, offset| async move {
                assert_eq!((limit, offset), (4, 8));
                Ok(vec!["i", "j"])
            },
            || async { Ok(10) },
        )
        .await
        .unwrap();

        assert_eq!(page.items, vec!["i", "j"]);
        assert_eq!(page.page, 3);
        assert_eq!(page.limit, 4);
        assert_eq!(page.total, 10);
        assert_eq!(page.pages, 3);
    }

    #[tokio::test]
    async fn test_paginate_propagates_count_error() {
        let result: Result<Page<i32>> = paginate(
            PageRequest::default(),
            |_, _| async { Ok(vec![]) },
            || async { Err(Error::Timeout(10)) },
        )
        .await;
        assert!(matches!(result, Err(Error::Timeout(10))));
    }

    #[test]
    fn test_page_serializes_items_as_data() {
        let page = Page::from_parts(vec![1, 2], PageRequest::new(1, 2), 3).unwrap();
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert_eq!(json["pages"], 2);
        assert_eq!(json["total"], 3);
    }
}
