//! Friendship model: a directed request between two users.
//!
//! The record keeps its direction (`user` asked, `friend` was asked)
//! because only the addressee may confirm; the store enforces at most one
//! record per unordered pair.

use serde::Serialize;
use sqlx::FromRow;

use filmclub_core::patch::{self, PatchError, PatchOperation, Patchable};
use filmclub_core::types::{SeqId, Timestamp};

/// Counter record name used to assign friendship ids.
pub const SEQUENCE_NAME: &str = "friendship_sequence";

/// A row from the `friendship` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Friendship {
    pub id: SeqId,
    #[serde(rename = "user")]
    pub user_email: String,
    #[serde(rename = "friend")]
    pub friend_email: String,
    pub confirmed: bool,
    pub since: Option<Timestamp>,
}

impl Patchable for Friendship {
    const PROTECTED: &'static [&'static str] = &["/id", "/user", "/friend", "/since"];

    fn apply_op(&mut self, op: &PatchOperation) -> Result<(), PatchError> {
        let parsed = patch::parse_path(&op.path)?;
        match (parsed.field, parsed.index) {
            ("confirmed", None) => patch::apply_required(&mut self.confirmed, op),
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

    fn friendship() -> Friendship {
        Friendship {
            id: 1,
            user_email: "a@x.com".into(),
            friend_email: "b@x.com".into(),
            confirmed: false,
            since: None,
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
    fn only_confirmed_is_patchable() {
        let ops = vec![op(PatchOp::Replace, "/confirmed", json!(true))];
        let patched = apply_patch(&friendship(), &ops).unwrap();
        assert!(patched.confirmed);
    }

    #[test]
    fn identity_and_pair_fields_are_protected() {
        for path in ["/id", "/user", "/friend", "/since"] {
            let ops = vec![op(PatchOp::Replace, path, json!("x"))];
            assert!(
                matches!(
                    apply_patch(&friendship(), &ops),
                    Err(PatchError::ProtectedField { .. })
                ),
                "{path} must be protected"
            );
        }
    }

    #[test]
    fn empty_confirm_patch_is_rejected() {
        assert!(matches!(
            apply_patch(&friendship(), &[]),
            Err(PatchError::EmptyPatch)
        ));
    }
}
