use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::{error, warn};

use crate::{
    auth::{claims::TokenKind, repo_types::PublicUser},
    error::AppError,
    state::AppState,
};

/// Authenticated caller. Rejects with 401 before the handler runs.
#[derive(Debug, Clone)]
pub struct AuthUser(pub PublicUser);

/// Caller identity if a valid session token was presented; never rejects.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<PublicUser>);

/// Token from `Authorization: Bearer <token>`.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = auth
        .strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then_some(token)
}

async fn authenticate(parts: &Parts, state: &AppState) -> Result<PublicUser, AppError> {
    let token = bearer_token(&parts.headers)
        .ok_or_else(|| AppError::Unauthenticated("Authentication required".into()))?;

    let claims = state.jwt.verify(token, TokenKind::Session).map_err(|e| {
        warn!(error = %e, "session token rejected");
        AppError::Unauthenticated("Invalid or expired token".into())
    })?;

    match state.store.find_by_id(claims.user_id).await? {
        Some(user) => Ok(user.into()),
        None => {
            warn!(user_id = %claims.user_id, "token for missing user");
            Err(AppError::Unauthenticated("User not found".into()))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).await.map(AuthUser)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match authenticate(parts, state).await {
            Ok(user) => Ok(MaybeAuthUser(Some(user))),
            Err(AppError::Internal(e)) => {
                error!(error = ?e, "optional auth lookup failed");
                Ok(MaybeAuthUser(None))
            }
            Err(_) => Ok(MaybeAuthUser(None)),
        }
    }
}
