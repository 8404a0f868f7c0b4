//! The partial-update (patch) pipeline.
//!
//! A PATCH request carries an ordered list of [`PatchOperation`]s in the
//! RFC-6902 style (`{"op": "replace", "path": "/name", "value": "x"}`).
//! The pipeline runs in three steps:
//!
//! 1. an empty operation list is rejected outright;
//! 2. the immutability guard scans every operation's path and rejects the
//!    whole request if any targets a protected field;
//! 3. the operations are applied in order to a clone of the stored entity.
//!
//! Application is all-or-nothing: the clone is only returned (and only then
//! persisted by the caller) if every operation succeeds. Each entity
//! declares its own closed set of patchable paths by implementing
//! [`Patchable`]; there is no reflective walking of arbitrary object
//! graphs.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Operation kind. Unknown strings deserialize to `Unknown` and fail the
/// patch at apply time rather than at body-parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOp {
    Add,
    Remove,
    Replace,
    Unknown,
}

impl<'de> Deserialize<'de> for PatchOp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "add" => PatchOp::Add,
            "remove" => PatchOp::Remove,
            "replace" => PatchOp::Replace,
            _ => PatchOp::Unknown,
        })
    }
}

/// One patch instruction. Transient input; never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct PatchOperation {
    pub op: PatchOp,
    pub path: String,
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    #[error("empty patch")]
    EmptyPatch,

    #[error("patch may not modify protected field {path}")]
    ProtectedField { path: String },

    #[error("unsupported patch operation")]
    UnknownOp,

    #[error("bad patch path: {path}")]
    BadPath { path: String },

    #[error("no value at {path}")]
    PathNotFound { path: String },

    #[error("missing value for operation at {path}")]
    MissingValue { path: String },

    #[error("value at {path} has the wrong type")]
    TypeMismatch { path: String },

    #[error("list index out of bounds at {path}")]
    IndexOutOfBounds { path: String },

    #[error("field {path} can not be removed")]
    RequiredField { path: String },
}

impl PatchError {
    /// Guard rejections are semantic (422); everything else is a malformed
    /// or failed patch (400).
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            PatchError::EmptyPatch | PatchError::ProtectedField { .. }
        )
    }
}

/// An entity with a closed set of patchable field paths.
pub trait Patchable: Clone {
    /// Paths (as `/field` pointers) no patch operation may target.
    const PROTECTED: &'static [&'static str];

    /// Apply a single operation in place.
    fn apply_op(&mut self, op: &PatchOperation) -> Result<(), PatchError>;
}

/// Run the full pipeline against `entity`, returning the patched copy.
///
/// The input entity is never mutated; on any failure nothing should be
/// persisted.
pub fn apply_patch<T: Patchable>(entity: &T, ops: &[PatchOperation]) -> Result<T, PatchError> {
    if ops.is_empty() {
        return Err(PatchError::EmptyPatch);
    }

    // Immutability guard: scan every path before applying anything.
    for op in ops {
        for protected in T::PROTECTED {
            if op.path == *protected || op.path.starts_with(&format!("{protected}/")) {
                return Err(PatchError::ProtectedField {
                    path: op.path.clone(),
                });
            }
        }
    }

    let mut patched = entity.clone();
    for op in ops {
        patched.apply_op(op)?;
    }
    Ok(patched)
}

// ---------------------------------------------------------------------------
// Path parsing and field-level helpers for Patchable implementations
// ---------------------------------------------------------------------------

/// Position within a list field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListIndex {
    At(usize),
    /// The `-` pointer token: one past the last element.
    End,
}

/// A parsed single- or two-segment field pointer (`/field`, `/field/3`,
/// `/field/-`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath<'a> {
    pub field: &'a str,
    pub index: Option<ListIndex>,
}

/// Parse a patch path into its field name and optional list index.
pub fn parse_path(path: &str) -> Result<FieldPath<'_>, PatchError> {
    let bad = || PatchError::BadPath {
        path: path.to_string(),
    };

    let rest = path.strip_prefix('/').ok_or_else(bad)?;
    if rest.is_empty() {
        return Err(bad());
    }

    let mut segments = rest.splitn(2, '/');
    let field = segments.next().ok_or_else(bad)?;
    let index = match segments.next() {
        None => None,
        Some("-") => Some(ListIndex::End),
        Some(raw) => Some(ListIndex::At(raw.parse().map_err(|_| bad())?)),
    };

    Ok(FieldPath { field, index })
}

fn take_value<T: DeserializeOwned>(op: &PatchOperation) -> Result<T, PatchError> {
    let value = op.value.clone().ok_or(PatchError::MissingValue {
        path: op.path.clone(),
    })?;
    serde_json::from_value(value).map_err(|_| PatchError::TypeMismatch {
        path: op.path.clone(),
    })
}

/// Apply an operation to an optional scalar field.
///
/// `replace` requires the field to be present, `add` sets it either way,
/// `remove` clears a present field.
pub fn apply_scalar<T: DeserializeOwned>(
    slot: &mut Option<T>,
    op: &PatchOperation,
) -> Result<(), PatchError> {
    match op.op {
        PatchOp::Replace => {
            if slot.is_none() {
                return Err(PatchError::PathNotFound {
                    path: op.path.clone(),
                });
            }
            *slot = Some(take_value(op)?);
            Ok(())
        }
        PatchOp::Add => {
            *slot = Some(take_value(op)?);
            Ok(())
        }
        PatchOp::Remove => {
            if slot.is_none() {
                return Err(PatchError::PathNotFound {
                    path: op.path.clone(),
                });
            }
            *slot = None;
            Ok(())
        }
        PatchOp::Unknown => Err(PatchError::UnknownOp),
    }
}

/// Apply an operation to a required (non-optional) scalar field.
///
/// The field always exists, so `replace` and `add` both overwrite it;
/// `remove` is refused.
pub fn apply_required<T: DeserializeOwned>(
    slot: &mut T,
    op: &PatchOperation,
) -> Result<(), PatchError> {
    match op.op {
        PatchOp::Replace | PatchOp::Add => {
            *slot = take_value(op)?;
            Ok(())
        }
        PatchOp::Remove => Err(PatchError::RequiredField {
            path: op.path.clone(),
        }),
        PatchOp::Unknown => Err(PatchError::UnknownOp),
    }
}

/// Apply an operation to an optional list field, with optional element
/// addressing (`/field/3`, `/field/-`).
///
/// Without an index the whole list is treated as a scalar. With an index,
/// `add` inserts (or appends at `-`), `replace` overwrites an existing
/// element, and `remove` deletes one; all element operations require the
/// list itself to be present.
pub fn apply_list<T: DeserializeOwned>(
    slot: &mut Option<Vec<T>>,
    op: &PatchOperation,
    index: Option<ListIndex>,
) -> Result<(), PatchError> {
    let Some(index) = index else {
        return apply_scalar(slot, op);
    };

    let list = slot.as_mut().ok_or(PatchError::PathNotFound {
        path: op.path.clone(),
    })?;

    match (op.op, index) {
        (PatchOp::Add, ListIndex::End) => {
            list.push(take_value(op)?);
            Ok(())
        }
        (PatchOp::Add, ListIndex::At(i)) => {
            if i > list.len() {
                return Err(PatchError::IndexOutOfBounds {
                    path: op.path.clone(),
                });
            }
            list.insert(i, take_value(op)?);
            Ok(())
        }
        (PatchOp::Replace, ListIndex::At(i)) => {
            if i >= list.len() {
                return Err(PatchError::IndexOutOfBounds {
                    path: op.path.clone(),
                });
            }
            list[i] = take_value(op)?;
            Ok(())
        }
        (PatchOp::Remove, ListIndex::At(i)) => {
            if i >= list.len() {
                return Err(PatchError::IndexOutOfBounds {
                    path: op.path.clone(),
                });
            }
            list.remove(i);
            Ok(())
        }
        // `-` only makes sense for add.
        (PatchOp::Replace | PatchOp::Remove, ListIndex::End) => Err(PatchError::BadPath {
            path: op.path.clone(),
        }),
        (PatchOp::Unknown, _) => Err(PatchError::UnknownOp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq)]
    struct Profile {
        id: String,
        nickname: Option<String>,
        score: i32,
        tags: Option<Vec<String>>,
    }

    impl Patchable for Profile {
        const PROTECTED: &'static [&'static str] = &["/id"];

        fn apply_op(&mut self, op: &PatchOperation) -> Result<(), PatchError> {
            let parsed = parse_path(&op.path)?;
            match (parsed.field, parsed.index) {
                ("nickname", None) => apply_scalar(&mut self.nickname, op),
                ("score", None) => apply_required(&mut self.score, op),
                ("tags", index) => apply_list(&mut self.tags, op, index),
                _ => Err(PatchError::BadPath {
                    path: op.path.clone(),
                }),
            }
        }
    }

    fn profile() -> Profile {
        Profile {
            id: "p1".into(),
            nickname: Some("ace".into()),
            score: 3,
            tags: Some(vec!["old".into()]),
        }
    }

    fn op(op: PatchOp, path: &str, value: Option<Value>) -> PatchOperation {
        PatchOperation {
            op,
            path: path.into(),
            value,
        }
    }

    #[test]
    fn empty_patch_is_rejected() {
        let err = apply_patch(&profile(), &[]).unwrap_err();
        assert_eq!(err, PatchError::EmptyPatch);
        assert!(err.is_rejection());
    }

    #[test]
    fn protected_path_rejects_whole_patch() {
        let ops = vec![
            op(PatchOp::Replace, "/nickname", Some(json!("new"))),
            op(PatchOp::Replace, "/id", Some(json!("p2"))),
        ];
        let err = apply_patch(&profile(), &ops).unwrap_err();
        assert_eq!(err, PatchError::ProtectedField { path: "/id".into() });
        assert!(err.is_rejection());
    }

    #[test]
    fn protected_prefix_also_rejects_nested_paths() {
        let ops = vec![op(PatchOp::Remove, "/id/sub", None)];
        assert!(matches!(
            apply_patch(&profile(), &ops),
            Err(PatchError::ProtectedField { .. })
        ));
    }

    #[test]
    fn replace_overwrites_existing_value() {
        let ops = vec![op(PatchOp::Replace, "/nickname", Some(json!("new")))];
        let patched = apply_patch(&profile(), &ops).unwrap();
        assert_eq!(patched.nickname.as_deref(), Some("new"));
    }

    #[test]
    fn replace_on_absent_value_fails() {
        let mut subject = profile();
        subject.nickname = None;
        let ops = vec![op(PatchOp::Replace, "/nickname", Some(json!("new")))];
        assert!(matches!(
            apply_patch(&subject, &ops),
            Err(PatchError::PathNotFound { .. })
        ));
    }

    #[test]
    fn add_creates_absent_value() {
        let mut subject = profile();
        subject.nickname = None;
        let ops = vec![op(PatchOp::Add, "/nickname", Some(json!("fresh")))];
        let patched = apply_patch(&subject, &ops).unwrap();
        assert_eq!(patched.nickname.as_deref(), Some("fresh"));
    }

    #[test]
    fn remove_clears_value() {
        let ops = vec![op(PatchOp::Remove, "/nickname", None)];
        let patched = apply_patch(&profile(), &ops).unwrap();
        assert_eq!(patched.nickname, None);
    }

    #[test]
    fn remove_required_field_fails() {
        let ops = vec![op(PatchOp::Remove, "/score", None)];
        assert!(matches!(
            apply_patch(&profile(), &ops),
            Err(PatchError::RequiredField { .. })
        ));
    }

    #[test]
    fn type_mismatch_fails() {
        let ops = vec![op(PatchOp::Replace, "/score", Some(json!("not a number")))];
        assert!(matches!(
            apply_patch(&profile(), &ops),
            Err(PatchError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn missing_value_fails() {
        let ops = vec![op(PatchOp::Replace, "/nickname", None)];
        assert!(matches!(
            apply_patch(&profile(), &ops),
            Err(PatchError::MissingValue { .. })
        ));
    }

    #[test]
    fn unknown_op_fails() {
        let ops = vec![op(PatchOp::Unknown, "/nickname", Some(json!("x")))];
        assert_eq!(apply_patch(&profile(), &ops), Err(PatchError::UnknownOp));
    }

    #[test]
    fn unknown_field_fails() {
        let ops = vec![op(PatchOp::Replace, "/no_such_field", Some(json!(1)))];
        assert!(matches!(
            apply_patch(&profile(), &ops),
            Err(PatchError::BadPath { .. })
        ));
    }

    #[test]
    fn bad_path_syntax_fails() {
        for path in ["nickname", "", "/tags/x"] {
            let ops = vec![op(PatchOp::Replace, path, Some(json!(1)))];
            assert!(
                matches!(apply_patch(&profile(), &ops), Err(PatchError::BadPath { .. })),
                "path {path:?} should be a bad path"
            );
        }
    }

    #[test]
    fn list_append_and_insert() {
        let ops = vec![
            op(PatchOp::Add, "/tags/-", Some(json!("appended"))),
            op(PatchOp::Add, "/tags/0", Some(json!("inserted"))),
        ];
        let patched = apply_patch(&profile(), &ops).unwrap();
        assert_eq!(
            patched.tags.unwrap(),
            vec!["inserted".to_string(), "old".into(), "appended".into()]
        );
    }

    #[test]
    fn list_replace_and_remove_by_index() {
        let ops = vec![
            op(PatchOp::Replace, "/tags/0", Some(json!("replaced"))),
            op(PatchOp::Remove, "/tags/0", None),
        ];
        let patched = apply_patch(&profile(), &ops).unwrap();
        assert_eq!(patched.tags.unwrap(), Vec::<String>::new());
    }

    #[test]
    fn list_index_out_of_bounds_fails() {
        let ops = vec![op(PatchOp::Replace, "/tags/5", Some(json!("x")))];
        assert!(matches!(
            apply_patch(&profile(), &ops),
            Err(PatchError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn whole_list_replace() {
        let ops = vec![op(PatchOp::Replace, "/tags", Some(json!(["a", "b"])))];
        let patched = apply_patch(&profile(), &ops).unwrap();
        assert_eq!(patched.tags.unwrap(), vec!["a".to_string(), "b".into()]);
    }

    #[test]
    fn failed_patch_leaves_input_untouched() {
        let subject = profile();
        let ops = vec![
            op(PatchOp::Replace, "/nickname", Some(json!("changed"))),
            op(PatchOp::Replace, "/score", Some(json!("boom"))),
        ];
        assert!(apply_patch(&subject, &ops).is_err());
        // All-or-nothing: the input is untouched even though the first
        // operation would have succeeded.
        assert_eq!(subject, profile());
    }

    #[test]
    fn operations_apply_in_order() {
        let ops = vec![
            op(PatchOp::Replace, "/nickname", Some(json!("first"))),
            op(PatchOp::Replace, "/nickname", Some(json!("second"))),
        ];
        let patched = apply_patch(&profile(), &ops).unwrap();
        assert_eq!(patched.nickname.as_deref(), Some("second"));
    }

    #[test]
    fn operation_deserializes_from_wire_form() {
        let raw = json!({"op": "replace", "path": "/nickname", "value": "x"});
        let parsed: PatchOperation = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.op, PatchOp::Replace);
        assert_eq!(parsed.path, "/nickname");

        let raw = json!({"op": "copy", "path": "/nickname", "value": "x"});
        let parsed: PatchOperation = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.op, PatchOp::Unknown);
    }
}
