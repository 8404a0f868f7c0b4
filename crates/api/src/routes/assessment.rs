//! Route definitions for the `/assessments` resource.
//!
//! Creation happens through `/movies/{id}/assessments`; this tree covers
//! the collection listing and the item operations.

use axum::routing::get;
use axum::Router;

use crate::handlers::assessment;
use crate::state::AppState;

/// Routes mounted at `/assessments`.
///
/// ```text
/// GET    /          -> list_assessments
/// GET    /{id}      -> get_assessment
/// PUT    /{id}      -> replace_assessment
/// PATCH  /{id}      -> patch_assessment
/// DELETE /{id}      -> delete_assessment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(assessment::list_assessments))
        .route(
            "/{id}",
            get(assessment::get_assessment)
                .put(assessment::replace_assessment)
                .patch(assessment::patch_assessment)
                .delete(assessment::delete_assessment),
        )
}
