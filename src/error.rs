use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::auth::jwt::TokenError;

/// Message shared by every credential failure on login.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        field: Option<&'static str>,
        message: String,
    },

    #[error("{message}")]
    Conflict { field: &'static str, message: String },

    #[error("{0}")]
    Unauthenticated(String),

    #[error(transparent)]
    ResetToken(TokenError),

    #[error("Invalid or expired reset token")]
    NotFound,

    #[error("Reset token is no longer valid")]
    TokenMismatch,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: Some(field),
            message: message.into(),
        }
    }

    pub fn invalid_credentials() -> Self {
        AppError::Unauthenticated(INVALID_CREDENTIALS.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation { .. }
            | AppError::Conflict { .. }
            | AppError::ResetToken(_)
            | AppError::NotFound
            | AppError::TokenMismatch => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let field = match &self {
            AppError::Validation { field, .. } => *field,
            AppError::Conflict { field, .. } => Some(*field),
            AppError::ResetToken(_) | AppError::NotFound | AppError::TokenMismatch => {
                Some("token")
            }
            _ => None,
        };
        if let AppError::Internal(err) = &self {
            error!(error = ?err, "request failed");
        }

        let body = Json(ErrorBody {
            success: false,
            message: self.to_string(),
            field,
        });
        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
