//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Listing methods build
//! their WHERE clause dynamically from the supplied filter (ILIKE for
//! substring matching on strings, `=` for exact values, `@>` for array
//! containment), splice in an allowlisted ORDER BY from the parsed sort
//! keys, and run a COUNT query over the same conditions.

pub mod assessment_repo;
pub mod friendship_repo;
pub mod movie_repo;
pub mod sequence_repo;
pub mod user_repo;

pub use assessment_repo::AssessmentRepo;
pub use friendship_repo::FriendshipRepo;
pub use movie_repo::MovieRepo;
pub use sequence_repo::SequenceRepo;
pub use user_repo::UserRepo;

use filmclub_core::pagination::MAX_PAGE_SIZE;
use filmclub_core::sort::SortKey;

pub(crate) fn clamp_page(page: i64) -> i64 {
    page.max(0)
}

pub(crate) fn clamp_size(size: i64) -> i64 {
    size.clamp(1, MAX_PAGE_SIZE)
}

/// Render an ORDER BY clause from parsed sort keys.
///
/// `allowed` maps client-facing sort fields onto column names; keys not in
/// the allowlist are dropped rather than spliced into SQL. Returns an
/// empty string (store default order) when nothing survives.
pub(crate) fn order_by(sort: &[SortKey], allowed: &[(&str, &str)]) -> String {
    let keys: Vec<String> = sort
        .iter()
        .filter_map(|key| {
            allowed
                .iter()
                .find(|(field, _)| *field == key.field)
                .map(|(_, column)| format!("{column} {}", key.direction.as_sql()))
        })
        .collect();

    if keys.is_empty() {
        String::new()
    } else {
        format!("ORDER BY {} ", keys.join(", "))
    }
}
