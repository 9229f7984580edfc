//! Bearer-token extractors.

use std::sync::Arc;

use accounts::{Account, AccountError};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::AppState;
use crate::error::ApiError;

/// The account behind the request's `Authorization: Bearer <token>` header.
pub struct CurrentUser {
    pub account: Account,
    pub token: String,
}

/// A [`CurrentUser`] with staff rights.
pub struct StaffUser(pub Account);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("Authentication required.".to_string()))?
            .to_string();
        let account = state.accounts.authenticate(&token).await.map_err(|e| match e {
            AccountError::InvalidSession => {
                ApiError::Unauthorized("Authentication required.".to_string())
            }
            other => other.into(),
        })?;
        Ok(Self { account, token })
    }
}

impl FromRequestParts<Arc<AppState>> for StaffUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser { account, .. } = CurrentUser::from_request_parts(parts, state).await?;
        if !account.is_staff {
            tracing::warn!(user_id = %account.id, "staff route denied");
            return Err(ApiError::Forbidden("Staff access required.".to_string()));
        }
        Ok(Self(account))
    }
}
