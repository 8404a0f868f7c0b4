//! Response helpers shared by the listing handlers.

use axum::http::header::LINK;
use axum::http::{HeaderMap, HeaderValue};

use filmclub_core::pagination::{link_header, RelationLink};

/// Render pagination relation links as `Link` response headers, one header
/// value per relation.
pub fn link_headers(links: &[RelationLink]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (rel, url) in links {
        if let Ok(value) = HeaderValue::from_str(&link_header(rel, url)) {
            headers.append(LINK, value);
        }
    }
    headers
}
