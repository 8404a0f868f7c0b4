//! Row structs, request DTOs, and filter types for the four entities.

pub mod assessment;
pub mod friendship;
pub mod movie;
pub mod user;
