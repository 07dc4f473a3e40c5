use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

pub const DEFAULT_ROLE: &str = "user";

/// User record as stored. Never serialized directly; see [`PublicUser`].
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,                 // trimmed + lowercased, unique
    pub password_hash: String,         // argon2 PHC string
    pub role: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub last_login: Option<OffsetDateTime>,
    pub password_reset_token: Option<String>,
    pub password_reset_expires: Option<OffsetDateTime>,
}

/// Fields supplied on registration; the store fills in the rest.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn into_user(self, now: OffsetDateTime) -> User {
        User {
            id: Uuid::new_v4(),
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role: DEFAULT_ROLE.to_string(),
            is_active: true,
            created_at: now,
            last_login: None,
            password_reset_token: None,
            password_reset_expires: None,
        }
    }
}

/// User without the password hash and reset fields; the only shape that leaves the server.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login: Option<OffsetDateTime>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            is_active: u.is_active,
            created_at: u.created_at,
            last_login: u.last_login,
        }
    }
}
