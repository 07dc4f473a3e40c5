use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{error, info, warn};

use crate::{
    auth::{
        claims::TokenKind,
        dto::{ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest},
        password::{hash_password, verify_password, MIN_PASSWORD_LEN},
        repo::StoreError,
        repo_types::{NewUser, PublicUser},
    },
    error::{AppError, AppResult},
    notifier::reset_email,
    state::AppState,
};

/// Same text whether or not the account exists.
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account exists with this email, you will receive a password reset link shortly.";

const MIN_NAME_LEN: usize = 2;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn require(value: &str, field: &'static str, message: &str) -> AppResult<()> {
    if value.is_empty() {
        return Err(AppError::validation(field, message));
    }
    Ok(())
}

fn check_password_len(password: &str, field: &'static str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(
            field,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters long"),
        ));
    }
    Ok(())
}

/// Trims and checks a registration body; returns it with the email normalized.
pub fn validate_registration(mut req: RegisterRequest) -> AppResult<RegisterRequest> {
    req.name = req.name.trim().to_string();
    req.email = normalize_email(&req.email);

    require(&req.name, "name", "Full name is required")?;
    require(&req.email, "email", "Email is required")?;
    require(&req.password, "password", "Password is required")?;
    require(&req.confirm_password, "confirmPassword", "Please confirm your password")?;

    if req.name.chars().count() < MIN_NAME_LEN {
        return Err(AppError::validation(
            "name",
            format!("Name must be at least {MIN_NAME_LEN} characters long"),
        ));
    }
    if !is_valid_email(&req.email) {
        return Err(AppError::validation("email", "Please enter a valid email address"));
    }
    if req.password != req.confirm_password {
        return Err(AppError::validation("confirmPassword", "Passwords do not match"));
    }
    check_password_len(&req.password, "password")?;
    Ok(req)
}

fn email_taken() -> AppError {
    AppError::Conflict {
        field: "email",
        message: "An account with this email already exists".into(),
    }
}

/// A sanitized user and a fresh session token.
#[derive(Debug)]
pub struct AuthOutcome {
    pub user: PublicUser,
    pub token: String,
}

pub async fn register(state: &AppState, req: RegisterRequest) -> AppResult<AuthOutcome> {
    let req = validate_registration(req)?;

    if state.store.find_by_email(&req.email).await?.is_some() {
        warn!(email = %req.email, "email already registered");
        return Err(email_taken());
    }

    let password_hash = hash_password(&req.password)?;
    let user = match state
        .store
        .insert(NewUser {
            name: req.name,
            email: req.email,
            password_hash,
        })
        .await
    {
        Ok(u) => u,
        Err(StoreError::Duplicate) => {
            warn!("email registered concurrently");
            return Err(email_taken());
        }
        Err(StoreError::Other(e)) => return Err(e.into()),
    };

    let token = state.jwt.issue_session(user.id, &user.email)?;
    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(AuthOutcome {
        user: user.into(),
        token,
    })
}

pub async fn login(state: &AppState, req: LoginRequest) -> AppResult<AuthOutcome> {
    let email = normalize_email(&req.email);
    if email.is_empty() || req.password.is_empty() {
        let field = if email.is_empty() { "email" } else { "password" };
        return Err(AppError::validation(field, "Email and password are required"));
    }

    let Some(mut user) = state.store.find_by_email(&email).await? else {
        warn!(%email, "login unknown email");
        return Err(AppError::invalid_credentials());
    };
    if !user.is_active {
        warn!(user_id = %user.id, "login on disabled account");
        return Err(AppError::invalid_credentials());
    }
    if !verify_password(&req.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::invalid_credentials());
    }

    let now = OffsetDateTime::now_utc();
    state.store.touch_last_login(user.id, now).await?;
    user.last_login = Some(now);

    let token = state.jwt.issue_session(user.id, &user.email)?;
    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(AuthOutcome {
        user: user.into(),
        token,
    })
}

/// Always ends in the generic message unless the input itself is bad or the store fails.
pub async fn forgot_password(state: &AppState, req: ForgotPasswordRequest) -> AppResult<&'static str> {
    let email = normalize_email(&req.email);
    require(&email, "email", "Email is required")?;
    if !is_valid_email(&email) {
        return Err(AppError::validation("email", "Please enter a valid email address"));
    }

    let user = match state.store.find_by_email(&email).await? {
        Some(u) if u.is_active => u,
        Some(u) => {
            info!(user_id = %u.id, "password reset requested for disabled account");
            return Ok(FORGOT_PASSWORD_MESSAGE);
        }
        None => {
            info!(%email, "password reset requested for unknown email");
            return Ok(FORGOT_PASSWORD_MESSAGE);
        }
    };

    let (token, expires_at) = state.jwt.issue_reset(user.id, &user.email)?;
    state.store.set_reset_token(user.id, &token, expires_at).await?;

    let link = format!("{}/reset-password?token={}", state.config.app_base_url, token);
    let (subject, body) = reset_email(&user.name, &link, state.jwt.reset_ttl);
    match state.notifier.send(&user.email, &subject, &body).await {
        Ok(()) => info!(user_id = %user.id, "password reset email sent"),
        Err(e) => error!(error = ?e, user_id = %user.id, "password reset email delivery failed"),
    }
    Ok(FORGOT_PASSWORD_MESSAGE)
}

pub async fn reset_password(state: &AppState, req: ResetPasswordRequest) -> AppResult<()> {
    let token = req.token.trim();
    require(token, "token", "Reset token is required")?;
    require(&req.new_password, "new_password", "New password is required")?;
    check_password_len(&req.new_password, "new_password")?;

    let claims = state.jwt.verify(token, TokenKind::Reset).map_err(|e| {
        warn!(error = %e, "reset token rejected");
        AppError::ResetToken(e)
    })?;

    let Some(user) = state.store.find_by_id(claims.user_id).await? else {
        warn!(user_id = %claims.user_id, "reset token for missing user");
        return Err(AppError::NotFound);
    };

    let password_hash = hash_password(&req.new_password)?;
    let consumed = state
        .store
        .consume_reset_token(user.id, token, &password_hash, OffsetDateTime::now_utc())
        .await?;
    if !consumed {
        warn!(user_id = %user.id, "reset token is not the current one");
        return Err(AppError::TokenMismatch);
    }

    info!(user_id = %user.id, "password reset");
    Ok(())
}
