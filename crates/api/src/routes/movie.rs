//! Route definitions for the `/movies` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::movie;
use crate::state::AppState;

/// Routes mounted at `/movies`.
///
/// ```text
/// GET    /                        -> list_movies
/// POST   /                        -> create_movie
/// GET    /{id}                    -> get_movie
/// PUT    /{id}                    -> replace_movie
/// PATCH  /{id}                    -> patch_movie
/// DELETE /{id}                    -> delete_movie
///
/// GET    /{id}/assessments        -> list_movie_assessments
/// POST   /{id}/assessments        -> create_assessment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(movie::list_movies).post(movie::create_movie))
        .route(
            "/{id}",
            get(movie::get_movie)
                .put(movie::replace_movie)
                .patch(movie::patch_movie)
                .delete(movie::delete_movie),
        )
        .route(
            "/{id}/assessments",
            get(movie::list_movie_assessments).post(movie::create_assessment),
        )
}
