use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::{basic::parse_basic_auth_header, services::validate_token};
use crate::{error::AppError, state::AppState, users::model::User};

/// The user owning the request's bearer token.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AppError::Unauthenticated("Missing Authorization header"))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::Unauthenticated("Invalid Authorization header"))?;

        validate_token(state, token).await.map(CurrentUser)
    }
}

/// Username and password from an HTTP Basic header. Any problem with the
/// header is a failed login.
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for BasicCredentials
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AppError::InvalidLogin)?;

        let (username, password) = parse_basic_auth_header(header).map_err(|e| {
            warn!(error = %e, "malformed basic credentials");
            AppError::InvalidLogin
        })?;
        Ok(BasicCredentials { username, password })
    }
}
