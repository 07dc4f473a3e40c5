use serde::{Deserialize, Serialize};

use crate::auth::repo_types::PublicUser;

/// Request body for registration. Missing fields arrive as empty strings and
/// are reported by validation, not by the JSON extractor.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "confirmPassword", alias = "confirm_password")]
    pub confirm_password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResetPasswordRequest {
    pub token: String,
    #[serde(alias = "newPassword")]
    pub new_password: String,
}

/// Returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub user: PublicUser,
    pub token: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct CheckAuthResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_reads_camel_and_snake_confirm() {
        let camel: RegisterRequest = serde_json::from_str(
            r#"{"name":"Ann","email":"a@x.com","password":"p","confirmPassword":"c"}"#,
        )
        .unwrap();
        assert_eq!(camel.confirm_password, "c");

        let snake: RegisterRequest = serde_json::from_str(r#"{"confirm_password":"s"}"#).unwrap();
        assert_eq!(snake.confirm_password, "s");
        assert!(snake.name.is_empty());
    }

    #[test]
    fn reset_request_accepts_missing_fields() {
        let req: ResetPasswordRequest = serde_json::from_str("{}").unwrap();
        assert!(req.token.is_empty());
        assert!(req.new_password.is_empty());
    }

    #[test]
    fn check_auth_omits_absent_user() {
        let json = serde_json::to_string(&CheckAuthResponse {
            authenticated: false,
            user: None,
        })
        .unwrap();
        assert_eq!(json, r#"{"authenticated":false}"#);
    }
}
