//! Route definitions for the `/users` resource.
//!
//! Also nests the assessment and friendship sub-resources under
//! `/users/{email}/...`.

use axum::routing::get;
use axum::Router;

use crate::handlers::{friendship, user};
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /                                  -> list_users
/// POST   /                                  -> create_user
/// GET    /{email}                           -> get_user
/// PUT    /{email}                           -> replace_user
/// PATCH  /{email}                           -> patch_user
/// DELETE /{email}                           -> delete_user
///
/// GET    /{email}/assessments               -> list_user_assessments
///
/// GET    /{email}/friends                   -> list_friends
/// GET    /{email}/friends/{friendEmail}     -> get_friendship
/// POST   /{email}/friends/{friendEmail}     -> add_friend
/// PATCH  /{email}/friends/{friendEmail}     -> confirm_friendship
/// DELETE /{email}/friends/{friendEmail}     -> delete_friendship
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(user::list_users).post(user::create_user))
        .route(
            "/{email}",
            get(user::get_user)
                .put(user::replace_user)
                .patch(user::patch_user)
                .delete(user::delete_user),
        )
        .route("/{email}/assessments", get(user::list_user_assessments))
        .route("/{email}/friends", get(friendship::list_friends))
        .route(
            "/{email}/friends/{friend}",
            get(friendship::get_friendship)
                .post(friendship::add_friend)
                .patch(friendship::confirm_friendship)
                .delete(friendship::delete_friendship),
        )
}
