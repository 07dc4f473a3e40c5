use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            AuthResponse, CheckAuthResponse, ForgotPasswordRequest, LoginRequest, MessageResponse,
            ProfileResponse, RegisterRequest, ResetPasswordRequest,
        },
        extractors::{AuthUser, MaybeAuthUser},
        services,
    },
    error::AppResult,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile))
        .route("/check-auth", get(check_auth))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let out = services::register(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "Registration successful".into(),
            user: out.user,
            token: out.token,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let out = services::login(&state, payload).await?;
    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".into(),
        user: out.user,
        token: out.token,
    }))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let message = services::forgot_password(&state, payload).await?;
    Ok(Json(MessageResponse::ok(message)))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    services::reset_password(&state, payload).await?;
    Ok(Json(MessageResponse::ok(
        "Password has been reset successfully. You can now log in with your new password.",
    )))
}

pub async fn profile(AuthUser(user): AuthUser) -> Json<ProfileResponse> {
    Json(ProfileResponse { success: true, user })
}

pub async fn check_auth(MaybeAuthUser(user): MaybeAuthUser) -> Json<CheckAuthResponse> {
    Json(CheckAuthResponse {
        authenticated: user.is_some(),
        user,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::{NewUser, PublicUser};

    #[tokio::test]
    async fn check_auth_reports_anonymous() {
        let Json(body) = check_auth(MaybeAuthUser(None)).await;
        assert!(!body.authenticated);
        assert!(body.user.is_none());
    }

    #[tokio::test]
    async fn profile_echoes_guarded_user() {
        let user: PublicUser = NewUser {
            name: "Ann".into(),
            email: "ann@x.com".into(),
            password_hash: "h".into(),
        }
        .into_user(time::OffsetDateTime::now_utc())
        .into();
        let Json(body) = profile(AuthUser(user.clone())).await;
        assert!(body.success);
        assert_eq!(body.user, user);
    }
}
