//! Request handlers: one module per resource.
//!
//! Each module is the resource service for its entity, composing the sort
//! parser, filter structs, patch pipeline, and pagination links from
//! `filmclub_core` around the repository layer.

pub mod assessment;
pub mod friendship;
pub mod movie;
pub mod user;
