//! Handlers for the `/movies` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::Query;
use validator::Validate;

use filmclub_core::error::CoreError;
use filmclub_core::pagination::{relation_links, Page};
use filmclub_core::patch::{apply_patch, PatchOperation};

use filmclub_db::models::assessment::CreateAssessment;
use filmclub_db::models::movie::{Movie, MovieFilter};
use filmclub_db::repositories::assessment_repo::AssessmentFilter;
use filmclub_db::repositories::{AssessmentRepo, MovieRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::query::PageParams;
use crate::response::link_headers;
use crate::state::AppState;

/// GET /movies?page=&size=&sort=&title=&status=&release_date=&genres=&keywords=
///
/// List movies matching the optional filters. An empty result is a 404,
/// never a zero-item page.
pub async fn list_movies(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(filter): Query<MovieFilter>,
) -> AppResult<impl IntoResponse> {
    let sort = params.sort_keys();
    let (rows, total) =
        MovieRepo::list(&state.pool, &filter, &sort, params.page(), params.size()).await?;

    if rows.is_empty() {
        return Err(AppError::NoResults);
    }

    let body = Page::new(rows, params.page(), params.size(), total);

    let mut extra = params.echo();
    if let Some(ref title) = filter.title {
        extra.push(("title", title.clone()));
    }
    if let Some(ref status) = filter.status {
        extra.push(("status", status.clone()));
    }
    if let Some(date) = filter.release_date {
        extra.push(("release_date", date.to_string()));
    }
    for genre in &filter.genres {
        extra.push(("genres", genre.clone()));
    }
    for keyword in &filter.keywords {
        extra.push(("keywords", keyword.clone()));
    }
    let links = relation_links("/movies", body.page, body.size, body.total_pages, &extra);

    Ok((link_headers(&links), Json(body)))
}

/// POST /movies
///
/// Create a new movie under a caller-supplied id; a duplicate is a 409.
pub async fn create_movie(
    State(state): State<AppState>,
    Json(input): Json<Movie>,
) -> AppResult<impl IntoResponse> {
    if input.id.is_empty() {
        return Err(CoreError::Validation("movie id must not be empty".into()).into());
    }

    if MovieRepo::find_by_id(&state.pool, &input.id).await?.is_some() {
        return Err(CoreError::Conflict(format!("movie {} already exists", input.id)).into());
    }

    let created = MovieRepo::create(&state.pool, &input).await?;

    tracing::info!(movie_id = %created.id, "Movie created");

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /movies/{id}
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let movie = MovieRepo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| CoreError::not_found("Movie", &id))?;

    Ok(Json(movie))
}

/// PUT /movies/{id}
///
/// Replace every descriptive attribute with the body's values. The path
/// id names the movie; an id in the body is ignored.
pub async fn replace_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut input): Json<Movie>,
) -> AppResult<impl IntoResponse> {
    input.id = id.clone();

    let movie = MovieRepo::update(&state.pool, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Movie", &id))?;

    tracing::info!(movie_id = %movie.id, "Movie replaced");

    Ok(Json(movie))
}

/// PATCH /movies/{id}
///
/// Apply a list of patch operations. The id is protected; a patch that
/// touches it is rejected whole.
pub async fn patch_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(ops): Json<Vec<PatchOperation>>,
) -> AppResult<impl IntoResponse> {
    let movie = MovieRepo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| CoreError::not_found("Movie", &id))?;

    let patched = apply_patch(&movie, &ops)?;
    let saved = MovieRepo::update(&state.pool, &patched)
        .await?
        .ok_or_else(|| CoreError::not_found("Movie", &id))?;

    tracing::info!(movie_id = %saved.id, ops = ops.len(), "Movie patched");

    Ok(Json(saved))
}

/// DELETE /movies/{id}
///
/// Remove a movie. Assessments referencing it are left untouched.
pub async fn delete_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    if !MovieRepo::delete(&state.pool, &id).await? {
        return Err(CoreError::not_found("Movie", &id).into());
    }

    tracing::info!(movie_id = %id, "Movie deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /movies/{id}/assessments?page=&size=&sort=
///
/// List the assessments for one movie.
pub async fn list_movie_assessments(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    if MovieRepo::find_by_id(&state.pool, &id).await?.is_none() {
        return Err(CoreError::not_found("Movie", &id).into());
    }

    let filter = AssessmentFilter {
        user_email: None,
        movie_id: Some(id.clone()),
    };
    let sort = params.sort_keys();
    let (rows, total) =
        AssessmentRepo::list(&state.pool, &filter, &sort, params.page(), params.size()).await?;

    if rows.is_empty() {
        return Err(AppError::NoResults);
    }

    let body = Page::new(rows, params.page(), params.size(), total);
    let base = format!("/movies/{id}/assessments");
    let links = relation_links(&base, body.page, body.size, body.total_pages, &params.echo());

    Ok((link_headers(&links), Json(body)))
}

/// POST /movies/{id}/assessments
///
/// Create an assessment of this movie. Both references are validated
/// strictly: an unknown user (or an unknown movie id in the path) rejects
/// the request with 422 instead of persisting a dangling reference. A
/// caller-supplied assessment id that already exists is a 409.
pub async fn create_assessment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<CreateAssessment>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| CoreError::Unprocessable(e.to_string()))?;

    if MovieRepo::find_by_id(&state.pool, &id).await?.is_none() {
        return Err(CoreError::Unprocessable(format!("movie {id} does not exist")).into());
    }
    if UserRepo::find_by_email(&state.pool, &input.user_email)
        .await?
        .is_none()
    {
        return Err(
            CoreError::Unprocessable(format!("user {} does not exist", input.user_email)).into(),
        );
    }
    if let Some(ref body_movie) = input.movie_id {
        if body_movie != &id {
            return Err(CoreError::Validation(
                "movie reference in body does not match the path".into(),
            )
            .into());
        }
    }
    if let Some(assessment_id) = input.id {
        if AssessmentRepo::find_by_id(&state.pool, assessment_id)
            .await?
            .is_some()
        {
            return Err(
                CoreError::Conflict(format!("assessment {assessment_id} already exists")).into(),
            );
        }
    }

    let created = AssessmentRepo::create(&state.pool, &input, &id).await?;

    tracing::info!(
        assessment_id = created.id,
        movie_id = %created.movie_id,
        user = %created.user_email,
        "Assessment created"
    );

    Ok((StatusCode::CREATED, Json(created)))
}
