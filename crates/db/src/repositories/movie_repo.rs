//! Repository for the `movies` table.

use sqlx::PgPool;

use filmclub_core::sort::SortKey;

use super::{clamp_page, clamp_size, order_by};
use crate::models::movie::{Movie, MovieFilter};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, overview, tagline, status, release_date, \
                       budget, revenue, runtime, genres, keywords, \
                       collection, producers, crew, cast_members, resources";

/// Client-facing sort fields and the columns they map to.
const SORTABLE: &[(&str, &str)] = &[
    ("id", "id"),
    ("title", "title"),
    ("status", "status"),
    ("release_date", "release_date"),
    ("budget", "budget"),
    ("revenue", "revenue"),
    ("runtime", "runtime"),
];

/// Provides CRUD operations for movies.
pub struct MovieRepo;

impl MovieRepo {
    /// Insert a new movie, returning the created row.
    pub async fn create(pool: &PgPool, movie: &Movie) -> Result<Movie, sqlx::Error> {
        let query = format!(
            "INSERT INTO movies (id, title, overview, tagline, status, release_date,
                                 budget, revenue, runtime, genres, keywords,
                                 collection, producers, crew, cast_members, resources)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Movie>(&query)
            .bind(&movie.id)
            .bind(&movie.title)
            .bind(&movie.overview)
            .bind(&movie.tagline)
            .bind(&movie.status)
            .bind(movie.release_date)
            .bind(movie.budget)
            .bind(movie.revenue)
            .bind(movie.runtime)
            .bind(&movie.genres)
            .bind(&movie.keywords)
            .bind(&movie.collection)
            .bind(&movie.producers)
            .bind(&movie.crew)
            .bind(&movie.cast_members)
            .bind(&movie.resources)
            .fetch_one(pool)
            .await
    }

    /// Find a movie by id.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Movie>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM movies WHERE id = $1");
        sqlx::query_as::<_, Movie>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List movies matching the filter, one page at a time.
    ///
    /// Returns the page rows together with the total match count. String
    /// fields match case-insensitively by substring; `genres` and
    /// `keywords` match by array containment (every supplied value must be
    /// present); `release_date` matches exactly.
    pub async fn list(
        pool: &PgPool,
        filter: &MovieFilter,
        sort: &[SortKey],
        page: i64,
        size: i64,
    ) -> Result<(Vec<Movie>, i64), sqlx::Error> {
        let page = clamp_page(page);
        let size = clamp_size(size);

        let title = filter.title.as_deref().filter(|s| !s.is_empty());
        let status = filter.status.as_deref().filter(|s| !s.is_empty());
        let genres = (!filter.genres.is_empty()).then_some(&filter.genres);
        let keywords = (!filter.keywords.is_empty()).then_some(&filter.keywords);

        let mut conditions = Vec::new();
        let mut bind_idx = 1u32;
        if title.is_some() {
            conditions.push(format!("title ILIKE ${bind_idx}"));
            bind_idx += 1;
        }
        if status.is_some() {
            conditions.push(format!("status ILIKE ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.release_date.is_some() {
            conditions.push(format!("release_date = ${bind_idx}"));
            bind_idx += 1;
        }
        if genres.is_some() {
            conditions.push(format!("genres @> ${bind_idx}"));
            bind_idx += 1;
        }
        if keywords.is_some() {
            conditions.push(format!("keywords @> ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {} ", conditions.join(" AND "))
        };
        let order_clause = order_by(sort, SORTABLE);

        let query = format!(
            "SELECT {COLUMNS} FROM movies {where_clause}{order_clause}\
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            next_idx = bind_idx + 1,
        );

        let mut rows = sqlx::query_as::<_, Movie>(&query);
        if let Some(title) = title {
            rows = rows.bind(format!("%{title}%"));
        }
        if let Some(status) = status {
            rows = rows.bind(format!("%{status}%"));
        }
        if let Some(date) = filter.release_date {
            rows = rows.bind(date);
        }
        if let Some(genres) = genres {
            rows = rows.bind(genres);
        }
        if let Some(keywords) = keywords {
            rows = rows.bind(keywords);
        }
        let rows = rows.bind(size).bind(page * size).fetch_all(pool).await?;

        let count_query = format!("SELECT COUNT(*) FROM movies {where_clause}");
        let mut count = sqlx::query_scalar::<_, i64>(&count_query);
        if let Some(title) = title {
            count = count.bind(format!("%{title}%"));
        }
        if let Some(status) = status {
            count = count.bind(format!("%{status}%"));
        }
        if let Some(date) = filter.release_date {
            count = count.bind(date);
        }
        if let Some(genres) = genres {
            count = count.bind(genres);
        }
        if let Some(keywords) = keywords {
            count = count.bind(keywords);
        }
        let total = count.fetch_one(pool).await?;

        Ok((rows, total))
    }

    /// Overwrite every descriptive attribute of a movie (used by both PUT
    /// replace and the write half of the patch pipeline).
    ///
    /// Returns `None` if no row with the movie's id exists.
    pub async fn update(pool: &PgPool, movie: &Movie) -> Result<Option<Movie>, sqlx::Error> {
        let query = format!(
            "UPDATE movies SET
                title = $2, overview = $3, tagline = $4, status = $5,
                release_date = $6, budget = $7, revenue = $8, runtime = $9,
                genres = $10, keywords = $11, collection = $12,
                producers = $13, crew = $14, cast_members = $15, resources = $16
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Movie>(&query)
            .bind(&movie.id)
            .bind(&movie.title)
            .bind(&movie.overview)
            .bind(&movie.tagline)
            .bind(&movie.status)
            .bind(movie.release_date)
            .bind(movie.budget)
            .bind(movie.revenue)
            .bind(movie.runtime)
            .bind(&movie.genres)
            .bind(&movie.keywords)
            .bind(&movie.collection)
            .bind(&movie.producers)
            .bind(&movie.crew)
            .bind(&movie.cast_members)
            .bind(&movie.resources)
            .fetch_optional(pool)
            .await
    }

    /// Delete a movie. Returns `true` if a row was removed. Dependent
    /// assessments are left untouched.
    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
