//! Shared query parameter types for API handlers.
//!
//! Listing endpoints all take `?page=&size=&sort=`; the resource-specific
//! filter parameters are deserialized separately by each handler. Extract
//! with `axum_extra::extract::Query`, which supports the repeatable `sort`
//! parameter.

use serde::Deserialize;

use filmclub_core::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use filmclub_core::sort::{parse_sort, SortKey};

/// Generic listing parameters (`?page=&size=&sort=`).
///
/// `sort` is repeatable and carries `+field`/`-field` directives. Page and
/// size are clamped to the same bounds the repository layer applies, so
/// the page envelope and the executed query always agree.
#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    #[serde(default)]
    pub sort: Vec<String>,
}

impl PageParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(0).max(0)
    }

    pub fn size(&self) -> i64 {
        self.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Parse the raw sort tokens into ordered sort keys.
    pub fn sort_keys(&self) -> Vec<SortKey> {
        parse_sort(&self.sort)
    }

    /// The raw sort tokens as link parameters, so pagination links
    /// reconstruct an equivalent query.
    pub fn echo(&self) -> Vec<(&'static str, String)> {
        self.sort.iter().map(|token| ("sort", token.clone())).collect()
    }
}
