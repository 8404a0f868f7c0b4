//! Repository for the `assessments` table.

use sqlx::PgPool;

use filmclub_core::sort::SortKey;
use filmclub_core::types::SeqId;

use super::{clamp_page, clamp_size, order_by, SequenceRepo};
use crate::models::assessment::{Assessment, CreateAssessment, SEQUENCE_NAME};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, rating, user_email, movie_id, comment";

/// Client-facing sort fields and the columns they map to.
const SORTABLE: &[(&str, &str)] = &[
    ("id", "id"),
    ("rating", "rating"),
    ("user", "user_email"),
    ("movie", "movie_id"),
];

/// Scoping filters for assessment listings. References match exactly.
#[derive(Debug, Default, serde::Deserialize)]
pub struct AssessmentFilter {
    #[serde(rename = "user")]
    pub user_email: Option<String>,
    #[serde(rename = "movie")]
    pub movie_id: Option<String>,
}

/// Provides CRUD operations for assessments.
pub struct AssessmentRepo;

impl AssessmentRepo {
    /// Insert a new assessment, returning the created row.
    ///
    /// When the caller did not supply an id, one is drawn from the
    /// assessment sequence counter — exactly once per persisted row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAssessment,
        movie_id: &str,
    ) -> Result<Assessment, sqlx::Error> {
        let id = match input.id {
            Some(id) => id,
            None => SequenceRepo::next_value(pool, SEQUENCE_NAME).await?,
        };

        let query = format!(
            "INSERT INTO assessments (id, rating, user_email, movie_id, comment)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Assessment>(&query)
            .bind(id)
            .bind(input.rating)
            .bind(&input.user_email)
            .bind(movie_id)
            .bind(&input.comment)
            .fetch_one(pool)
            .await
    }

    /// Find an assessment by id.
    pub async fn find_by_id(pool: &PgPool, id: SeqId) -> Result<Option<Assessment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assessments WHERE id = $1");
        sqlx::query_as::<_, Assessment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List assessments, optionally scoped to a user or a movie, one page
    /// at a time. Returns the page rows and the total match count.
    pub async fn list(
        pool: &PgPool,
        filter: &AssessmentFilter,
        sort: &[SortKey],
        page: i64,
        size: i64,
    ) -> Result<(Vec<Assessment>, i64), sqlx::Error> {
        let page = clamp_page(page);
        let size = clamp_size(size);

        let mut conditions = Vec::new();
        let mut bind_idx = 1u32;
        if filter.user_email.is_some() {
            conditions.push(format!("user_email = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.movie_id.is_some() {
            conditions.push(format!("movie_id = ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {} ", conditions.join(" AND "))
        };
        let order_clause = order_by(sort, SORTABLE);

        let query = format!(
            "SELECT {COLUMNS} FROM assessments {where_clause}{order_clause}\
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            next_idx = bind_idx + 1,
        );

        let mut rows = sqlx::query_as::<_, Assessment>(&query);
        if let Some(ref user_email) = filter.user_email {
            rows = rows.bind(user_email);
        }
        if let Some(ref movie_id) = filter.movie_id {
            rows = rows.bind(movie_id);
        }
        let rows = rows.bind(size).bind(page * size).fetch_all(pool).await?;

        let count_query = format!("SELECT COUNT(*) FROM assessments {where_clause}");
        let mut count = sqlx::query_scalar::<_, i64>(&count_query);
        if let Some(ref user_email) = filter.user_email {
            count = count.bind(user_email);
        }
        if let Some(ref movie_id) = filter.movie_id {
            count = count.bind(movie_id);
        }
        let total = count.fetch_one(pool).await?;

        Ok((rows, total))
    }

    /// Overwrite the mutable attributes of an assessment (used by both PUT
    /// replace and the write half of the patch pipeline).
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: SeqId,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<Option<Assessment>, sqlx::Error> {
        let query = format!(
            "UPDATE assessments SET rating = $2, comment = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Assessment>(&query)
            .bind(id)
            .bind(rating)
            .bind(comment)
            .fetch_optional(pool)
            .await
    }

    /// Delete an assessment. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: SeqId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM assessments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
