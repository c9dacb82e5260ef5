//! HTTP API handlers for songbook-svc

use serde::Serialize;
use songbook_common::pagination::PageRequest;

pub mod groups;
pub mod health;
pub mod songs;

pub use groups::group_routes;
pub use health::health_routes;
pub use songs::song_routes;

/// Raw query-string pairs in request order
///
/// Extracting pairs instead of a struct never rejects: repeated keys and
/// unknown keys are simply carried along.
pub type QueryPairs = Vec<(String, String)>;

/// First value given for `key`
pub fn first_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Pagination query parameters
///
/// Kept as raw text so unparseable values fall back to defaults instead of
/// rejecting the request.
#[derive(Debug, Default)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageQuery {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            page: first_value(pairs, "page").map(str::to_string),
            limit: first_value(pairs, "limit").map(str::to_string),
        }
    }

    pub fn request(&self) -> PageRequest {
        PageRequest::resolve(self.page.as_deref(), self.limit.as_deref())
    }
}

/// Single-record response envelope
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> QueryPairs {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_repeated_key_takes_first_value() {
        let query = PageQuery::from_pairs(&pairs(&[("page", "2"), ("page", "9"), ("limit", "x")]));
        let request = query.request();
        assert_eq!((request.page(), request.limit()), (2, 10));
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let request = PageQuery::from_pairs(&pairs(&[("other", "1")])).request();
        assert_eq!((request.page(), request.limit()), (1, 10));
    }
}
