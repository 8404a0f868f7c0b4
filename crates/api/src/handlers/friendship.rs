//! Handlers for the `/users/{email}/friends` sub-resource.
//!
//! A friendship is requested by one user and addressed to another; the
//! addressee confirms it by patching `/confirmed` to true, which stamps
//! `since`. Lookup always considers both orientations through the
//! repository's pair accessor.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::Query;
use chrono::Utc;

use filmclub_core::error::CoreError;
use filmclub_core::pagination::{relation_links, Page};
use filmclub_core::patch::{apply_patch, PatchOperation};

use filmclub_db::repositories::{FriendshipRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::query::PageParams;
use crate::response::link_headers;
use crate::state::AppState;

/// GET /users/{email}/friends?page=&size=&sort=
///
/// List the friendships a user appears in, on either side.
pub async fn list_friends(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Query(params): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    if UserRepo::find_by_email(&state.pool, &email).await?.is_none() {
        return Err(CoreError::not_found("User", &email).into());
    }

    let sort = params.sort_keys();
    let (rows, total) =
        FriendshipRepo::list_for_user(&state.pool, &email, &sort, params.page(), params.size())
            .await?;

    if rows.is_empty() {
        return Err(AppError::NoResults);
    }

    let body = Page::new(rows, params.page(), params.size(), total);
    let base = format!("/users/{email}/friends");
    let links = relation_links(&base, body.page, body.size, body.total_pages, &params.echo());

    Ok((link_headers(&links), Json(body)))
}

/// GET /users/{email}/friends/{friendEmail}
///
/// Fetch the friendship between two users, in whichever orientation it
/// was stored.
pub async fn get_friendship(
    State(state): State<AppState>,
    Path((email, friend)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let friendship = FriendshipRepo::find_by_pair(&state.pool, &email, &friend)
        .await?
        .ok_or_else(|| CoreError::not_found("Friendship", format!("{email}/{friend}")))?;

    Ok(Json(friendship))
}

/// POST /users/{email}/friends/{friendEmail}
///
/// Request a friendship. Both users must exist; a friendship between the
/// pair — in either orientation — is a 409.
pub async fn add_friend(
    State(state): State<AppState>,
    Path((email, friend)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    if email == friend {
        return Err(CoreError::Validation("a user can not befriend themselves".into()).into());
    }
    if UserRepo::find_by_email(&state.pool, &email).await?.is_none() {
        return Err(CoreError::not_found("User", &email).into());
    }
    if UserRepo::find_by_email(&state.pool, &friend).await?.is_none() {
        return Err(CoreError::not_found("User", &friend).into());
    }

    if FriendshipRepo::find_by_pair(&state.pool, &email, &friend)
        .await?
        .is_some()
    {
        return Err(
            CoreError::Conflict(format!("{email} and {friend} are already related")).into(),
        );
    }

    // A concurrent duplicate slips past the check above and trips the
    // pair index instead, surfacing as 409 through the error mapping.
    let friendship = FriendshipRepo::create(&state.pool, &email, &friend).await?;

    tracing::info!(
        friendship_id = friendship.id,
        user = %friendship.user_email,
        friend = %friendship.friend_email,
        "Friendship requested"
    );

    Ok((StatusCode::CREATED, Json(friendship)))
}

/// PATCH /users/{email}/friends/{friendEmail}
///
/// Confirm (or retract confirmation of) a friendship. Only `/confirmed`
/// is patchable; the pair fields and `since` are protected. The record
/// must be stored as requested-by `{email}`, addressed-to
/// `{friendEmail}` — a confirm addressed the wrong way round is refused.
pub async fn confirm_friendship(
    State(state): State<AppState>,
    Path((email, friend)): Path<(String, String)>,
    Json(ops): Json<Vec<PatchOperation>>,
) -> AppResult<impl IntoResponse> {
    let Some(friendship) = FriendshipRepo::find_directed(&state.pool, &email, &friend).await?
    else {
        // Distinguish "wrong orientation" from "no relation at all".
        return if FriendshipRepo::find_by_pair(&state.pool, &email, &friend)
            .await?
            .is_some()
        {
            Err(CoreError::Unprocessable(
                "only the addressed party can confirm a friendship".into(),
            )
            .into())
        } else {
            Err(CoreError::not_found("Friendship", format!("{email}/{friend}")).into())
        };
    };

    let patched = apply_patch(&friendship, &ops)?;

    // `since` records the moment of confirmation and nothing else.
    let since = if patched.confirmed {
        friendship.since.or_else(|| Some(Utc::now()))
    } else {
        None
    };

    let saved = FriendshipRepo::save_confirmation(&state.pool, friendship.id, patched.confirmed, since)
        .await?
        .ok_or_else(|| CoreError::not_found("Friendship", format!("{email}/{friend}")))?;

    tracing::info!(
        friendship_id = saved.id,
        confirmed = saved.confirmed,
        "Friendship updated"
    );

    Ok(Json(saved))
}

/// DELETE /users/{email}/friends/{friendEmail}
///
/// Remove the friendship between two users, in whichever orientation it
/// was stored.
pub async fn delete_friendship(
    State(state): State<AppState>,
    Path((email, friend)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let friendship = FriendshipRepo::find_by_pair(&state.pool, &email, &friend)
        .await?
        .ok_or_else(|| CoreError::not_found("Friendship", format!("{email}/{friend}")))?;

    FriendshipRepo::delete(&state.pool, friendship.id).await?;

    tracing::info!(friendship_id = friendship.id, "Friendship deleted");

    Ok(StatusCode::NO_CONTENT)
}
