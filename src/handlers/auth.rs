use axum::Json;
use axum::extract::State;
use chrono::Utc;
use tracing::{info, warn};

use crate::PresenterError;
use crate::db::models::NewUser;
use crate::middleware::{AuthUser, ValidJson};
use crate::router::PresenterState;
use crate::types::MessageResponse;
use crate::types::auth::{AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest};

const BAD_CREDENTIALS: &str = "Invalid username or password";

/// POST /api/auth/login
pub async fn login(
    State(state): State<PresenterState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<Json<AuthResponse>, PresenterError> {
    let Some(user) = state.storage.find_user_by_username(&req.username).await? else {
        warn!(username = %req.username, "login for unknown user");
        return Err(PresenterError::unauthorized(BAD_CREDENTIALS));
    };

    if !state
        .passwords
        .verify(req.password, user.password_hash.clone())
        .await?
    {
        warn!(user_id = user.id, "login with wrong password");
        return Err(PresenterError::unauthorized(BAD_CREDENTIALS));
    }

    state.storage.touch_last_login(user.id, Utc::now()).await?;
    let token = state.tokens.issue(&user)?;
    info!(user_id = user.id, "user logged in");

    Ok(Json(AuthResponse {
        token,
        username: user.username,
        email: user.email,
    }))
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<PresenterState>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> Result<Json<AuthResponse>, PresenterError> {
    if state.storage.username_exists(&req.username).await? {
        return Err(PresenterError::validation("Username already exists"));
    }
    if state.storage.email_exists(&req.email).await? {
        return Err(PresenterError::validation("Email already registered"));
    }

    let password_hash = state.passwords.hash(req.password).await?;
    let user = state
        .storage
        .insert_user(NewUser {
            username: req.username,
            email: req.email,
            password_hash,
        })
        .await?;
    let token = state.tokens.issue(&user)?;
    info!(user_id = user.id, username = %user.username, "user registered");

    Ok(Json(AuthResponse {
        token,
        username: user.username,
        email: user.email,
    }))
}

/// POST /api/auth/change-password
pub async fn change_password(
    State(state): State<PresenterState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, PresenterError> {
    let user = state
        .storage
        .find_user_by_id(auth.id)
        .await?
        .ok_or_else(|| PresenterError::not_found("User not found"))?;

    if !state
        .passwords
        .verify(req.current_password, user.password_hash)
        .await?
    {
        return Err(PresenterError::validation("Current password is incorrect"));
    }

    let password_hash = state.passwords.hash(req.new_password).await?;
    if !state
        .storage
        .update_password_hash(user.id, &password_hash)
        .await?
    {
        return Err(PresenterError::not_found("User not found"));
    }
    info!(user_id = user.id, "password changed");

    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<PresenterState>,
    auth: AuthUser,
) -> Result<Json<AuthResponse>, PresenterError> {
    let user = state
        .storage
        .find_user_by_id(auth.id)
        .await?
        .ok_or_else(|| PresenterError::not_found("User not found"))?;

    Ok(Json(AuthResponse {
        token: String::new(),
        username: user.username,
        email: user.email,
    }))
}
