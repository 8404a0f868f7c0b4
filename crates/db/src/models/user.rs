//! User model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use filmclub_core::patch::{self, PatchError, PatchOperation, Patchable};

/// A row from the `users` table. The password hash never leaves the
/// service.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub email: String,
    pub name: Option<String>,
    pub country: Option<String>,
    pub picture: Option<String>,
    pub birthday: Option<NaiveDate>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub roles: Vec<String>,
}

/// DTO for creating a user. The plaintext password is hashed by the
/// handler before the row reaches the repository.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    pub name: Option<String>,
    pub country: Option<String>,
    pub picture: Option<String>,
    pub birthday: Option<NaiveDate>,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// DTO for the PUT replace operation. Only the mutable profile attributes
/// are replaceable; identity, password, and roles are not.
#[derive(Debug, Deserialize)]
pub struct ReplaceUser {
    pub name: Option<String>,
    pub country: Option<String>,
    pub picture: Option<String>,
}

/// Optional listing filters. Strings match case-insensitively by
/// substring; unset (or empty) fields match anything.
#[derive(Debug, Default, Deserialize)]
pub struct UserFilter {
    pub email: Option<String>,
    pub name: Option<String>,
}

impl Patchable for User {
    const PROTECTED: &'static [&'static str] = &["/email"];

    fn apply_op(&mut self, op: &PatchOperation) -> Result<(), PatchError> {
        let parsed = patch::parse_path(&op.path)?;
        match (parsed.field, parsed.index) {
            ("name", None) => patch::apply_scalar(&mut self.name, op),
            ("country", None) => patch::apply_scalar(&mut self.country, op),
            ("picture", None) => patch::apply_scalar(&mut self.picture, op),
            ("birthday", None) => patch::apply_scalar(&mut self.birthday, op),
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

    fn user() -> User {
        User {
            email: "a@x.com".into(),
            name: Some("Ada".into()),
            country: None,
            picture: None,
            birthday: None,
            password_hash: "$argon2id$stub".into(),
            roles: vec![],
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
    fn email_is_protected() {
        let ops = vec![op(PatchOp::Replace, "/email", json!("b@x.com"))];
        assert!(matches!(
            apply_patch(&user(), &ops),
            Err(PatchError::ProtectedField { .. })
        ));
    }

    #[test]
    fn profile_fields_are_patchable() {
        let ops = vec![
            op(PatchOp::Replace, "/name", json!("Grace")),
            op(PatchOp::Add, "/country", json!("UK")),
            op(PatchOp::Add, "/birthday", json!("1990-12-09")),
        ];
        let patched = apply_patch(&user(), &ops).unwrap();
        assert_eq!(patched.name.as_deref(), Some("Grace"));
        assert_eq!(patched.country.as_deref(), Some("UK"));
        assert!(patched.birthday.is_some());
    }

    #[test]
    fn password_and_roles_are_not_patchable() {
        for path in ["/password_hash", "/password", "/roles"] {
            let ops = vec![op(PatchOp::Replace, path, json!("x"))];
            assert!(
                matches!(apply_patch(&user(), &ops), Err(PatchError::BadPath { .. })),
                "{path} must not be patchable"
            );
        }
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let body = serde_json::to_value(user()).unwrap();
        assert!(body.get("password_hash").is_none());
    }
}
