//! Handlers for the `/assessments` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::Query;
use validator::Validate;

use filmclub_core::error::CoreError;
use filmclub_core::pagination::{relation_links, Page};
use filmclub_core::patch::{apply_patch, PatchOperation};
use filmclub_core::types::SeqId;

use filmclub_db::models::assessment::ReplaceAssessment;
use filmclub_db::repositories::assessment_repo::AssessmentFilter;
use filmclub_db::repositories::AssessmentRepo;

use crate::error::{AppError, AppResult};
use crate::query::PageParams;
use crate::response::link_headers;
use crate::state::AppState;

/// GET /assessments?page=&size=&sort=&user=&movie=
///
/// List assessments, optionally scoped to a user or a movie. An empty
/// result is a 404, never a zero-item page.
pub async fn list_assessments(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(filter): Query<AssessmentFilter>,
) -> AppResult<impl IntoResponse> {
    let sort = params.sort_keys();
    let (rows, total) =
        AssessmentRepo::list(&state.pool, &filter, &sort, params.page(), params.size()).await?;

    if rows.is_empty() {
        return Err(AppError::NoResults);
    }

    let body = Page::new(rows, params.page(), params.size(), total);

    let mut extra = params.echo();
    if let Some(ref user) = filter.user_email {
        extra.push(("user", user.clone()));
    }
    if let Some(ref movie) = filter.movie_id {
        extra.push(("movie", movie.clone()));
    }
    let links = relation_links("/assessments", body.page, body.size, body.total_pages, &extra);

    Ok((link_headers(&links), Json(body)))
}

/// GET /assessments/{id}
pub async fn get_assessment(
    State(state): State<AppState>,
    Path(id): Path<SeqId>,
) -> AppResult<impl IntoResponse> {
    let assessment = AssessmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Assessment", id))?;

    Ok(Json(assessment))
}

/// PUT /assessments/{id}
///
/// Replace the mutable attributes (rating, comment). The id and both
/// references are fixed at creation time.
pub async fn replace_assessment(
    State(state): State<AppState>,
    Path(id): Path<SeqId>,
    Json(input): Json<ReplaceAssessment>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| CoreError::Unprocessable(e.to_string()))?;

    let assessment = AssessmentRepo::update(&state.pool, id, input.rating, input.comment.as_deref())
        .await?
        .ok_or_else(|| CoreError::not_found("Assessment", id))?;

    tracing::info!(assessment_id = assessment.id, "Assessment replaced");

    Ok(Json(assessment))
}

/// PATCH /assessments/{id}
///
/// Apply a list of patch operations. The id and the user/movie references
/// are protected; the patched rating must stay within range.
pub async fn patch_assessment(
    State(state): State<AppState>,
    Path(id): Path<SeqId>,
    Json(ops): Json<Vec<PatchOperation>>,
) -> AppResult<impl IntoResponse> {
    let assessment = AssessmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Assessment", id))?;

    let patched = apply_patch(&assessment, &ops)?;
    patched
        .validate()
        .map_err(|e| CoreError::Unprocessable(e.to_string()))?;

    let saved = AssessmentRepo::update(&state.pool, id, patched.rating, patched.comment.as_deref())
        .await?
        .ok_or_else(|| CoreError::not_found("Assessment", id))?;

    tracing::info!(assessment_id = saved.id, ops = ops.len(), "Assessment patched");

    Ok(Json(saved))
}

/// DELETE /assessments/{id}
pub async fn delete_assessment(
    State(state): State<AppState>,
    Path(id): Path<SeqId>,
) -> AppResult<impl IntoResponse> {
    if !AssessmentRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Assessment", id).into());
    }

    tracing::info!(assessment_id = id, "Assessment deleted");

    Ok(StatusCode::NO_CONTENT)
}
