//! Repository for the `friendship` table.
//!
//! Friendships are stored directed (requester, addressee); the unordered
//! pair is unique by index. [`FriendshipRepo::find_by_pair`] is the single
//! accessor that matches both orientations — every caller that cares about
//! "are these two related at all" goes through it.

use sqlx::PgPool;

use filmclub_core::sort::SortKey;
use filmclub_core::types::{SeqId, Timestamp};

use super::{clamp_page, clamp_size, order_by, SequenceRepo};
use crate::models::friendship::{Friendship, SEQUENCE_NAME};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_email, friend_email, confirmed, since";

/// Client-facing sort fields and the columns they map to.
const SORTABLE: &[(&str, &str)] = &[
    ("id", "id"),
    ("user", "user_email"),
    ("friend", "friend_email"),
    ("confirmed", "confirmed"),
    ("since", "since"),
];

/// Provides CRUD operations for friendships.
pub struct FriendshipRepo;

impl FriendshipRepo {
    /// Insert a new, unconfirmed friendship requested by `user` and
    /// addressed to `friend`, returning the created row.
    ///
    /// The id is drawn from the friendship sequence counter. A concurrent
    /// duplicate for the same unordered pair trips the `uq_friendship_pair`
    /// index and surfaces as a unique-violation error.
    pub async fn create(
        pool: &PgPool,
        user: &str,
        friend: &str,
    ) -> Result<Friendship, sqlx::Error> {
        let id = SequenceRepo::next_value(pool, SEQUENCE_NAME).await?;

        let query = format!(
            "INSERT INTO friendship (id, user_email, friend_email, confirmed)
             VALUES ($1, $2, $3, FALSE)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Friendship>(&query)
            .bind(id)
            .bind(user)
            .bind(friend)
            .fetch_one(pool)
            .await
    }

    /// Find the friendship between two users, in whichever orientation it
    /// was stored.
    pub async fn find_by_pair(
        pool: &PgPool,
        a: &str,
        b: &str,
    ) -> Result<Option<Friendship>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM friendship
             WHERE (user_email = $1 AND friend_email = $2)
                OR (user_email = $2 AND friend_email = $1)"
        );
        sqlx::query_as::<_, Friendship>(&query)
            .bind(a)
            .bind(b)
            .fetch_optional(pool)
            .await
    }

    /// Find the friendship stored exactly as requested-by `user`,
    /// addressed-to `friend`. Used by confirmation, where orientation
    /// matters.
    pub async fn find_directed(
        pool: &PgPool,
        user: &str,
        friend: &str,
    ) -> Result<Option<Friendship>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM friendship
             WHERE user_email = $1 AND friend_email = $2"
        );
        sqlx::query_as::<_, Friendship>(&query)
            .bind(user)
            .bind(friend)
            .fetch_optional(pool)
            .await
    }

    /// List the friendships a user appears in, on either side, one page at
    /// a time. Returns the page rows and the total match count.
    pub async fn list_for_user(
        pool: &PgPool,
        email: &str,
        sort: &[SortKey],
        page: i64,
        size: i64,
    ) -> Result<(Vec<Friendship>, i64), sqlx::Error> {
        let page = clamp_page(page);
        let size = clamp_size(size);
        let order_clause = order_by(sort, SORTABLE);

        let query = format!(
            "SELECT {COLUMNS} FROM friendship
             WHERE user_email = $1 OR friend_email = $1
             {order_clause}LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, Friendship>(&query)
            .bind(email)
            .bind(size)
            .bind(page * size)
            .fetch_all(pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM friendship WHERE user_email = $1 OR friend_email = $1",
        )
        .bind(email)
        .fetch_one(pool)
        .await?;

        Ok((rows, total))
    }

    /// Persist a confirmation: set `confirmed` and stamp `since`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn save_confirmation(
        pool: &PgPool,
        id: SeqId,
        confirmed: bool,
        since: Option<Timestamp>,
    ) -> Result<Option<Friendship>, sqlx::Error> {
        let query = format!(
            "UPDATE friendship SET confirmed = $2, since = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Friendship>(&query)
            .bind(id)
            .bind(confirmed)
            .bind(since)
            .fetch_optional(pool)
            .await
    }

    /// Delete a friendship by id. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: SeqId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM friendship WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
