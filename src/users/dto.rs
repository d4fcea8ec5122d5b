use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::model::User;

/// Request body for signup. Fields are optional at the wire level so that
/// missing ones reach validation instead of being rejected by the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Request body for `PATCH /users/:id`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub token: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl UserResponse {
    /// Includes the current token; only for signup and login.
    pub fn with_token(user: User) -> Self {
        let token = user.token.clone();
        Self {
            token,
            ..Self::from(user)
        }
    }
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            username: u.username,
            email: u.email,
            role: u.role,
            token: None,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$hash".into(),
            role: "mentor".into(),
            token: Some("tok-123".into()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn token_only_when_requested() {
        let plain = serde_json::to_value(UserResponse::from(user())).unwrap();
        assert!(plain.get("token").is_none());
        assert!(plain.get("password_hash").is_none());

        let with = serde_json::to_value(UserResponse::with_token(user())).unwrap();
        assert_eq!(with["token"], "tok-123");
        assert_eq!(with["role"], "mentor");
    }

    #[test]
    fn signup_request_tolerates_missing_fields() {
        let req: SignupRequest = serde_json::from_str(r#"{"password":"x"}"#).unwrap();
        assert!(req.name.is_none());
        assert_eq!(req.password.as_deref(), Some("x"));
    }
}
