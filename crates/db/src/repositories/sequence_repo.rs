//! Persisted sequence counters.

use sqlx::PgPool;

use filmclub_core::types::SeqId;

/// Provides atomic id assignment for entities with generated integer
/// identities.
pub struct SequenceRepo;

impl SequenceRepo {
    /// Atomically increment and return the counter named `name`.
    ///
    /// The read-and-increment is a single store statement, so two
    /// concurrent creators can never receive the same value; the first
    /// call for an unknown name creates the counter at 1.
    pub async fn next_value(pool: &PgPool, name: &str) -> Result<SeqId, sqlx::Error> {
        sqlx::query_scalar::<_, SeqId>(
            "INSERT INTO sequence_counters (name, value) VALUES ($1, 1)
             ON CONFLICT (name) DO UPDATE SET value = sequence_counters.value + 1
             RETURNING value",
        )
        .bind(name)
        .fetch_one(pool)
        .await
    }
}
