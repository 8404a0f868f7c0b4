//! Handlers for the `/users` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::Query;
use validator::Validate;

use filmclub_core::error::CoreError;
use filmclub_core::pagination::{relation_links, Page};
use filmclub_core::patch::{apply_patch, PatchOperation};

use filmclub_db::models::user::{CreateUser, ReplaceUser, User, UserFilter};
use filmclub_db::repositories::{AssessmentRepo, UserRepo};
use filmclub_db::repositories::assessment_repo::AssessmentFilter;

use crate::error::{AppError, AppResult};
use crate::query::PageParams;
use crate::response::link_headers;
use crate::state::AppState;

/// GET /users?page=&size=&sort=&email=&name=
///
/// List users matching the optional filters. An empty result is a 404,
/// never a zero-item page.
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(filter): Query<UserFilter>,
) -> AppResult<impl IntoResponse> {
    let sort = params.sort_keys();
    let (rows, total) =
        UserRepo::list(&state.pool, &filter, &sort, params.page(), params.size()).await?;

    if rows.is_empty() {
        return Err(AppError::NoResults);
    }

    let body = Page::new(rows, params.page(), params.size(), total);

    let mut extra = params.echo();
    if let Some(ref email) = filter.email {
        extra.push(("email", email.clone()));
    }
    if let Some(ref name) = filter.name {
        extra.push(("name", name.clone()));
    }
    let links = relation_links("/users", body.page, body.size, body.total_pages, &extra);

    Ok((link_headers(&links), Json(body)))
}

/// POST /users
///
/// Create a new user. The email is the identity; a duplicate is a 409.
pub async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| CoreError::Unprocessable(e.to_string()))?;

    if UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .is_some()
    {
        return Err(CoreError::Conflict(format!("user {} already exists", input.email)).into());
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("password hashing failed: {e}")))?;

    let user = User {
        email: input.email,
        name: input.name,
        country: input.country,
        picture: input.picture,
        birthday: input.birthday,
        password_hash,
        roles: input.roles,
    };
    let created = UserRepo::create(&state.pool, &user).await?;

    tracing::info!(email = %created.email, "User created");

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /users/{email}
pub async fn get_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &email))?;

    Ok(Json(user))
}

/// PUT /users/{email}
///
/// Replace the mutable profile attributes (name, country, picture).
pub async fn replace_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(input): Json<ReplaceUser>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::replace_profile(&state.pool, &email, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &email))?;

    tracing::info!(email = %user.email, "User profile replaced");

    Ok(Json(user))
}

/// PATCH /users/{email}
///
/// Apply a list of patch operations. The email is protected; a patch that
/// touches it is rejected whole.
pub async fn patch_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(ops): Json<Vec<PatchOperation>>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &email))?;

    let patched = apply_patch(&user, &ops)?;
    let saved = UserRepo::save(&state.pool, &patched).await?;

    tracing::info!(email = %saved.email, ops = ops.len(), "User patched");

    Ok(Json(saved))
}

/// DELETE /users/{email}
///
/// Remove a user. Assessments and friendships referencing the user are
/// left untouched.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<impl IntoResponse> {
    if !UserRepo::delete(&state.pool, &email).await? {
        return Err(CoreError::not_found("User", &email).into());
    }

    tracing::info!(email = %email, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/{email}/assessments?page=&size=&sort=
///
/// List the assessments written by one user.
pub async fn list_user_assessments(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Query(params): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    if UserRepo::find_by_email(&state.pool, &email).await?.is_none() {
        return Err(CoreError::not_found("User", &email).into());
    }

    let filter = AssessmentFilter {
        user_email: Some(email.clone()),
        movie_id: None,
    };
    let sort = params.sort_keys();
    let (rows, total) =
        AssessmentRepo::list(&state.pool, &filter, &sort, params.page(), params.size()).await?;

    if rows.is_empty() {
        return Err(AppError::NoResults);
    }

    let body = Page::new(rows, params.page(), params.size(), total);
    let base = format!("/users/{email}/assessments");
    let links = relation_links(&base, body.page, body.size, body.total_pages, &params.echo());

    Ok((link_headers(&links), Json(body)))
}

/// Hash a plaintext password with Argon2id and a random salt, returning
/// the PHC-formatted string that is stored.
fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::password_hash::rand_core::OsRng;
    use argon2::password_hash::{PasswordHasher, SaltString};
    use argon2::Argon2;

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}
