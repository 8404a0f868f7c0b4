//! Route tree assembly.

pub mod assessment;
pub mod health;
pub mod movie;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the resource route tree (mounted at the server root).
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/users", user::router())
        .nest("/movies", movie::router())
        .nest("/assessments", assessment::router())
}
