//! Paging math, the page response envelope, and relation-link building.
//!
//! Listing endpoints return a [`Page`] body and advertise the well-known
//! relation links (`self`, `first`, `last`, `next`, `previous`) as RFC-8288
//! `Link` response headers. Link construction is skipped entirely for empty
//! result sets; the service surfaces those as a not-found signal instead of
//! a zero-item page.

use serde::Serialize;

/// Default page size for listing endpoints.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size for listing endpoints.
pub const MAX_PAGE_SIZE: i64 = 100;

/// One page of a listing result.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, page: i64, size: i64, total_elements: i64) -> Self {
        Page {
            content,
            page,
            size,
            total_elements,
            total_pages: total_pages(total_elements, size),
        }
    }
}

/// Number of pages needed for `count` elements at `size` per page.
///
/// Zero elements means zero pages; a non-positive size is treated as empty
/// rather than dividing by zero (request parsing clamps sizes before this
/// is reached).
pub fn total_pages(count: i64, size: i64) -> i64 {
    if count <= 0 || size <= 0 {
        return 0;
    }
    (count + size - 1) / size
}

/// A pagination relation link: `(rel, url)`.
pub type RelationLink = (&'static str, String);

/// Build the five pagination relation links for a non-empty listing.
///
/// `extra` carries the request's sort and filter parameters so every link
/// reconstructs an equivalent query. `next` and `previous` clamp to the
/// valid page range. Must only be called with `total_pages >= 1`.
pub fn relation_links(
    base: &str,
    page: i64,
    size: i64,
    total_pages: i64,
    extra: &[(&str, String)],
) -> Vec<RelationLink> {
    let last = total_pages - 1;
    let url = |p: i64| page_url(base, p, size, extra);

    vec![
        ("self", url(page)),
        ("first", url(0)),
        ("last", url(last)),
        ("next", url((page + 1).min(last))),
        ("previous", url((page - 1).max(0))),
    ]
}

/// Render one relation link as an RFC-8288 `Link` header value.
pub fn link_header(rel: &str, url: &str) -> String {
    format!("<{url}>; rel=\"{rel}\"")
}

fn page_url(base: &str, page: i64, size: i64, extra: &[(&str, String)]) -> String {
    let mut url = format!("{base}?page={page}&size={size}");
    for (name, value) in extra {
        url.push('&');
        url.push_str(name);
        url.push('=');
        url.push_str(&urlencoding::encode(value));
    }
    url
}
