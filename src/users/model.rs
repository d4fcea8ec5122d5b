use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::store::StoreError;

/// User record as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string
    pub role: String,
    #[serde(skip_serializing)]
    pub token: Option<String>, // current bearer token
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fields of a user about to be created. Built through [`NewUser::new`] so
/// that every instance has passed field validation.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<String>,
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.-]{3,32}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_name(name: &str) -> Result<String, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::Validation("name must not be empty".into()));
    }
    Ok(name.to_string())
}

pub fn validate_username(username: &str) -> Result<String, StoreError> {
    let username = username.trim();
    if !is_valid_username(username) {
        return Err(StoreError::Validation(format!(
            "invalid username `{username}`"
        )));
    }
    Ok(username.to_string())
}

pub fn validate_email(email: &str) -> Result<String, StoreError> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(StoreError::Validation(format!("invalid email `{email}`")));
    }
    Ok(email)
}

pub fn validate_role(role: &str) -> Result<String, StoreError> {
    let role = role.trim();
    if role.is_empty() {
        return Err(StoreError::Validation("role must not be empty".into()));
    }
    Ok(role.to_string())
}

pub fn validate_password(password: &str) -> Result<(), StoreError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(StoreError::Validation("password too short".into()));
    }
    Ok(())
}

fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, StoreError> {
    value.ok_or_else(|| StoreError::Validation(format!("`{field}` is required")))
}

impl NewUser {
    /// Validates raw signup fields. The password is hashed by the caller
    /// once validation has passed, so only the hash is carried here.
    pub fn new(
        name: Option<&str>,
        username: Option<&str>,
        email: Option<&str>,
        role: Option<&str>,
        default_role: &str,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            name: validate_name(required("name", name)?)?,
            username: validate_username(required("username", username)?)?,
            email: validate_email(required("email", email)?)?,
            password_hash: String::new(),
            role: validate_role(role.unwrap_or(default_role))?,
        })
    }

    pub fn with_password_hash(mut self, hash: String) -> Self {
        self.password_hash = hash;
        self
    }
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.username.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
    }

    /// Applies the present fields onto `user` in place.
    pub fn apply(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(username) = &self.username {
            user.username = username.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(hash) = &self.password_hash {
            user.password_hash = hash.clone();
        }
        if let Some(role) = &self.role {
            user.role = role.clone();
        }
    }
}

/// Parses a path identifier. Anything that is not a UUID is an invalid
/// argument rather than a missing record.
pub fn parse_id(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw).map_err(|_| StoreError::InvalidId(raw.to_string()))
}
