//! Repository for the `users` table.

use sqlx::PgPool;

use filmclub_core::sort::SortKey;

use super::{clamp_page, clamp_size, order_by};
use crate::models::user::{ReplaceUser, User, UserFilter};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "email, name, country, picture, birthday, password_hash, roles";

/// Client-facing sort fields and the columns they map to.
const SORTABLE: &[(&str, &str)] = &[
    ("email", "email"),
    ("name", "name"),
    ("country", "country"),
    ("birthday", "birthday"),
];

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, user: &User) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, name, country, picture, birthday, password_hash, roles)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.country)
            .bind(&user.picture)
            .bind(user.birthday)
            .bind(&user.password_hash)
            .bind(&user.roles)
            .fetch_one(pool)
            .await
    }

    /// Find a user by email.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List users matching the filter, one page at a time.
    ///
    /// Returns the page rows together with the total match count. Empty
    /// filter fields impose no constraint.
    pub async fn list(
        pool: &PgPool,
        filter: &UserFilter,
        sort: &[SortKey],
        page: i64,
        size: i64,
    ) -> Result<(Vec<User>, i64), sqlx::Error> {
        let page = clamp_page(page);
        let size = clamp_size(size);

        let email = filter.email.as_deref().filter(|s| !s.is_empty());
        let name = filter.name.as_deref().filter(|s| !s.is_empty());

        let mut conditions = Vec::new();
        let mut bind_idx = 1u32;
        if email.is_some() {
            conditions.push(format!("email ILIKE ${bind_idx}"));
            bind_idx += 1;
        }
        if name.is_some() {
            conditions.push(format!("name ILIKE ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {} ", conditions.join(" AND "))
        };
        let order_clause = order_by(sort, SORTABLE);

        let query = format!(
            "SELECT {COLUMNS} FROM users {where_clause}{order_clause}\
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            next_idx = bind_idx + 1,
        );

        let mut rows = sqlx::query_as::<_, User>(&query);
        if let Some(email) = email {
            rows = rows.bind(format!("%{email}%"));
        }
        if let Some(name) = name {
            rows = rows.bind(format!("%{name}%"));
        }
        let rows = rows.bind(size).bind(page * size).fetch_all(pool).await?;

        let count_query = format!("SELECT COUNT(*) FROM users {where_clause}");
        let mut count = sqlx::query_scalar::<_, i64>(&count_query);
        if let Some(email) = email {
            count = count.bind(format!("%{email}%"));
        }
        if let Some(name) = name {
            count = count.bind(format!("%{name}%"));
        }
        let total = count.fetch_one(pool).await?;

        Ok((rows, total))
    }

    /// Replace the mutable profile attributes.
    ///
    /// Returns `None` if no row with the given `email` exists.
    pub async fn replace_profile(
        pool: &PgPool,
        email: &str,
        input: &ReplaceUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET name = $2, country = $3, picture = $4
             WHERE email = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .bind(&input.name)
            .bind(&input.country)
            .bind(&input.picture)
            .fetch_optional(pool)
            .await
    }

    /// Persist a patched row wholesale (the write half of the patch
    /// pipeline's read-modify-write).
    pub async fn save(pool: &PgPool, user: &User) -> Result<User, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                name = $2,
                country = $3,
                picture = $4,
                birthday = $5,
                password_hash = $6,
                roles = $7
             WHERE email = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.country)
            .bind(&user.picture)
            .bind(user.birthday)
            .bind(&user.password_hash)
            .bind(&user.roles)
            .fetch_one(pool)
            .await
    }

    /// Delete a user. Returns `true` if a row was removed. Dependent
    /// assessments and friendships are left untouched.
    pub async fn delete(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE email = $1")
            .bind(email)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
