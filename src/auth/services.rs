use axum::extract::FromRef;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{jwt::JwtKeys, password};
use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
    state::AppState,
    users::{model::User, store::StoreError},
};

/// Checks a username/password pair. Unknown users and wrong passwords both
/// come back as [`AppError::InvalidLogin`].
pub async fn verify_credentials(
    state: &AppState,
    username: &str,
    plain: &str,
) -> AppResult<User> {
    let user = match state.users.find_by_username(username).await {
        Ok(u) => u,
        Err(StoreError::NotFound) => {
            password::verify_dummy(plain);
            warn!(%username, "login unknown username");
            return Err(AppError::InvalidLogin);
        }
        Err(e) => return Err(e.into()),
    };

    if !password::verify_password(plain, &user.password_hash)? {
        warn!(%username, user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidLogin);
    }
    Ok(user)
}

/// Signs a fresh token and records it as the user's current one, which
/// invalidates whatever was issued before.
pub async fn issue_token(state: &AppState, user: &mut User) -> AppResult<String> {
    let keys = JwtKeys::from_ref(state);
    let token = keys.sign(user.id)?;
    state.users.set_token(user.id, &token).await?;
    user.token = Some(token.clone());
    info!(user_id = %user.id, "token issued");
    Ok(token)
}

/// Resolves a bearer token to its owner.
pub async fn validate_token(state: &AppState, token: &str) -> AppResult<User> {
    let keys = JwtKeys::from_ref(state);
    let claims = keys.verify(token).map_err(|e| {
        warn!(error = %e, "invalid or expired token");
        AppError::Unauthenticated("Invalid or expired token")
    })?;

    let user = match state.users.find_by_id(&claims.sub.to_string()).await {
        Ok(u) => u,
        Err(StoreError::NotFound) => {
            debug!(user_id = %claims.sub, "token owner no longer exists");
            return Err(AppError::Unauthenticated("Invalid or expired token"));
        }
        Err(e) => return Err(e.into()),
    };

    if user.token.as_deref() != Some(token) {
        warn!(user_id = %user.id, "superseded token presented");
        return Err(AppError::Unauthenticated("Invalid or expired token"));
    }
    Ok(user)
}

/// Owners may delete themselves; privileged roles may delete anyone.
pub fn can_delete(config: &AppConfig, actor: &User, target: Uuid) -> bool {
    actor.id == target || config.is_privileged(&actor.role)
}

/// Password changes follow the delete rule.
pub fn can_change_password(config: &AppConfig, actor: &User, target: Uuid) -> bool {
    can_delete(config, actor, target)
}

/// Only privileged roles assign roles, including their own.
pub fn can_change_role(config: &AppConfig, actor: &User) -> bool {
    config.is_privileged(&actor.role)
}
