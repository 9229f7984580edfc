//! Signup, login and logout.

use std::sync::Arc;

use accounts::Session;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /users/signup: create an account and start a session.
#[tracing::instrument(skip_all, fields(username = %req.username))]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let session = state
        .accounts
        .signup(&req.username, &req.password, &req.password_confirmation)
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// POST /users/login
#[tracing::instrument(skip_all, fields(username = %req.username))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Session>, ApiError> {
    let session = state.accounts.login(&req.username, &req.password).await?;
    Ok(Json(session))
}

/// POST /users/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<StatusCode, ApiError> {
    state.accounts.logout(&user.token).await?;
    Ok(StatusCode::NO_CONTENT)
}
