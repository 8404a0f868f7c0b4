//! Domain logic shared by the filmclub service.
//!
//! Everything in this crate is pure: sort-directive parsing, the partial
//! update (patch) pipeline, pagination math and relation links, and the
//! error taxonomy. No I/O happens here; the `db` and `api` crates compose
//! these pieces around the store.

pub mod error;
pub mod pagination;
pub mod patch;
pub mod sort;
pub mod types;
