//! Assessment model: a user's rating of a movie.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use filmclub_core::patch::{self, PatchError, PatchOperation, Patchable};
use filmclub_core::types::SeqId;

/// Counter record name used to assign assessment ids.
pub const SEQUENCE_NAME: &str = "assessment_sequence";

/// A row from the `assessments` table.
#[derive(Debug, Clone, Serialize, FromRow, Validate)]
pub struct Assessment {
    pub id: SeqId,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,
    #[serde(rename = "user")]
    pub user_email: String,
    #[serde(rename = "movie")]
    pub movie_id: String,
    pub comment: Option<String>,
}

/// DTO for creating an assessment. Both references must resolve to
/// existing entities; the movie id may instead come from the request path.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAssessment {
    /// Caller-supplied id; assigned from the sequence counter when absent.
    pub id: Option<SeqId>,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,
    #[serde(rename = "user")]
    pub user_email: String,
    #[serde(rename = "movie")]
    pub movie_id: Option<String>,
    pub comment: Option<String>,
}

/// DTO for the PUT replace operation: the mutable attributes only. The id
/// and both references are fixed at creation time.
#[derive(Debug, Deserialize, Validate)]
pub struct ReplaceAssessment {
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,
    pub comment: Option<String>,
}

impl Patchable for Assessment {
    const PROTECTED: &'static [&'static str] = &["/id", "/user", "/movie"];

    fn apply_op(&mut self, op: &PatchOperation) -> Result<(), PatchError> {
        let parsed = patch::parse_path(&op.path)?;
        match (parsed.field, parsed.index) {
            ("rating", None) => patch::apply_required(&mut self.rating, op),
            ("comment", None) => patch::apply_scalar(&mut self.comment, op),
            _ => Err(PatchError::BadPath {
                path: op.path.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filmclub_core::patch::{apply_patch, PatchOp};
    use serde_json::json;
    use validator::Validate;

    fn assessment() -> Assessment {
        Assessment {
            id: 1,
            rating: 3,
            user_email: "a@x.com".into(),
            movie_id: "m1".into(),
            comment: Some("fine".into()),
        }
    }

    fn op(kind: PatchOp, path: &str, value: serde_json::Value) -> PatchOperation {
        PatchOperation {
            op: kind,
            path: path.into(),
            value: Some(value),
        }
    }

    #[test]
    fn references_and_id_are_protected() {
        for path in ["/id", "/user", "/movie"] {
            let ops = vec![op(PatchOp::Replace, path, json!("other"))];
            assert!(
                matches!(
                    apply_patch(&assessment(), &ops),
                    Err(PatchError::ProtectedField { .. })
                ),
                "{path} must be protected"
            );
        }
    }

    #[test]
    fn rating_and_comment_are_patchable() {
        let ops = vec![
            op(PatchOp::Replace, "/rating", json!(5)),
            op(PatchOp::Remove, "/comment", json!(null)),
        ];
        let patched = apply_patch(&assessment(), &ops).unwrap();
        assert_eq!(patched.rating, 5);
        assert_eq!(patched.comment, None);
    }

    #[test]
    fn out_of_range_rating_fails_validation_after_patch() {
        let ops = vec![op(PatchOp::Replace, "/rating", json!(7))];
        let patched = apply_patch(&assessment(), &ops).unwrap();
        // The patch itself applies; the range invariant is enforced by the
        // service before persisting.
        assert!(patched.validate().is_err());
    }

    #[test]
    fn rating_can_not_be_removed() {
        let ops = vec![op(PatchOp::Remove, "/rating", json!(null))];
        assert!(matches!(
            apply_patch(&assessment(), &ops),
            Err(PatchError::RequiredField { .. })
        ));
    }
}
