use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{debug, error, info, instrument, warn};

use super::{
    dto::{SignupRequest, UpdateUserRequest, UserResponse},
    model::{
        parse_id, validate_email, validate_name, validate_password, validate_role,
        validate_username, NewUser, UserPatch,
    },
    store::StoreError,
};
use crate::{
    app::route_not_found,
    auth::{
        password::hash_password,
        services::{
            can_change_password, can_change_role, can_delete, issue_token, verify_credentials,
        },
        BasicCredentials, CurrentUser,
    },
    error::{AppError, AppResult},
    extract::JsonBody,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup).fallback(route_not_found))
        .route("/login", post(login).fallback(route_not_found))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).fallback(route_not_found))
        .route(
            "/users/:id",
            get(get_user)
                .patch(update_user)
                .delete(delete_user)
                .fallback(route_not_found),
        )
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SignupRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let new_user = NewUser::new(
        payload.name.as_deref(),
        payload.username.as_deref(),
        payload.email.as_deref(),
        payload.role.as_deref(),
        &state.config.default_role,
    )?;
    let password = payload
        .password
        .as_deref()
        .ok_or_else(|| StoreError::Validation("`password` is required".into()))?;
    validate_password(password)?;

    let hash = hash_password(password)?;
    let mut user = state.users.create(new_user.with_password_hash(hash)).await?;
    if let Err(err) = issue_token(&state, &mut user).await {
        // a tokenless record would block the username for good
        if let Err(cleanup) = state.users.delete(&user.id.to_string()).await {
            error!(user_id = %user.id, error = %cleanup, "failed to remove user after token error");
        }
        return Err(err);
    }

    info!(user_id = %user.id, username = %user.username, "user signed up");
    Ok((StatusCode::CREATED, Json(UserResponse::with_token(user))))
}

#[instrument(skip(state, password))]
pub async fn login(
    State(state): State<AppState>,
    BasicCredentials { username, password }: BasicCredentials,
) -> AppResult<Json<UserResponse>> {
    let mut user = verify_credentials(&state, &username, &password).await?;
    issue_token(&state, &mut user).await?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(UserResponse::with_token(user)))
}

#[instrument(skip(state, actor))]
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.users.list().await?;
    debug!(actor_id = %actor.id, count = users.len(), "listed users");
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[instrument(skip(state, actor))]
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = state.users.find_by_id(&id).await?;
    debug!(actor_id = %actor.id, user_id = %user.id, "fetched user");
    Ok(Json(user.into()))
}

#[instrument(skip(state, actor, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let target = parse_id(&id)?;
    if payload.role.is_some() && !can_change_role(&state.config, &actor) {
        warn!(actor_id = %actor.id, role = %actor.role, %target, "role change not permitted");
        return Err(AppError::Forbidden);
    }
    if payload.password.is_some() && !can_change_password(&state.config, &actor, target) {
        warn!(actor_id = %actor.id, %target, "password change not permitted");
        return Err(AppError::Forbidden);
    }

    let patch = UserPatch {
        name: payload.name.as_deref().map(validate_name).transpose()?,
        username: payload.username.as_deref().map(validate_username).transpose()?,
        email: payload.email.as_deref().map(validate_email).transpose()?,
        role: payload.role.as_deref().map(validate_role).transpose()?,
        password_hash: match payload.password.as_deref() {
            Some(p) => {
                validate_password(p)?;
                Some(hash_password(p)?)
            }
            None => None,
        },
    };

    let user = if patch.is_empty() {
        state.users.find_by_id(&id).await?
    } else {
        state.users.update(&id, patch).await?
    };

    info!(user_id = %user.id, actor_id = %actor.id, "user updated");
    Ok(Json(user.into()))
}

#[instrument(skip(state, actor))]
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let target = parse_id(&id)?;
    if !can_delete(&state.config, &actor, target) {
        warn!(actor_id = %actor.id, role = %actor.role, %target, "delete not permitted");
        return Err(AppError::Forbidden);
    }

    state.users.delete(&id).await?;
    info!(user_id = %target, actor_id = %actor.id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
