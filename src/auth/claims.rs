use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Purpose of a JWT: login session or password reset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Session,
    Reset,
}

/// JWT payload shared by session and reset tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub email: String,
    pub iat: usize,      // issued at (unix timestamp)
    pub exp: usize,      // expires at (unix timestamp)
    pub iss: String,
    pub aud: String,
    pub jti: Uuid,       // unique per token
    pub kind: TokenKind,
}
