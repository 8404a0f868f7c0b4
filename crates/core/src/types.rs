/// Sequence-assigned primary keys (assessments, friendships) are BIGINT.
pub type SeqId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
