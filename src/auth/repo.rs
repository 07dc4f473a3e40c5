use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    Duplicate,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Persistence for user records. Emails are passed already normalized.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    /// Fails with [`StoreError::Duplicate`] when the email is taken.
    async fn insert(&self, new: NewUser) -> Result<User, StoreError>;
    async fn touch_last_login(&self, id: Uuid, at: OffsetDateTime) -> anyhow::Result<()>;
    async fn set_reset_token(&self, id: Uuid, token: &str, expires: OffsetDateTime) -> anyhow::Result<()>;
    /// Replace the password and clear both reset fields in one step, but only
    /// if `token` is the stored one and its stored expiry is after `now`.
    /// Returns whether the update happened.
    async fn consume_reset_token(
        &self,
        id: Uuid,
        token: &str,
        new_password_hash: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<bool>;
    async fn ping(&self) -> anyhow::Result<()>;
    fn backend(&self) -> &'static str;
}

const USER_COLUMNS: &str = "id, name, email, password_hash, role, is_active, created_at, \
     last_login, password_reset_token, password_reset_expires";

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("find user by id")?;
        Ok(user)
    }

    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        let user = new.into_user(OffsetDateTime::now_utc());
        let res = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user.is_active)
        .bind(user.created_at)
        .fetch_one(&self.db)
        .await;

        match res {
            Ok(u) => Ok(u),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(StoreError::Duplicate),
            Err(e) => Err(StoreError::Other(anyhow::Error::new(e).context("insert user"))),
        }
    }

    async fn touch_last_login(&self, id: Uuid, at: OffsetDateTime) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.db)
            .await
            .context("update last_login")?;
        Ok(())
    }

    async fn set_reset_token(&self, id: Uuid, token: &str, expires: OffsetDateTime) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
               SET password_reset_token = $2,
                   password_reset_expires = $3
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token)
        .bind(expires)
        .execute(&self.db)
        .await
        .context("store reset token")?;
        Ok(())
    }

    async fn consume_reset_token(
        &self,
        id: Uuid,
        token: &str,
        new_password_hash: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE users
               SET password_hash = $3,
                   password_reset_token = NULL,
                   password_reset_expires = NULL
             WHERE id = $1
               AND password_reset_token = $2
               AND password_reset_expires > $4
            "#,
        )
        .bind(id)
        .bind(token)
        .bind(new_password_hash)
        .bind(now)
        .execute(&self.db)
        .await
        .context("consume reset token")?;
        Ok(res.rows_affected() == 1)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.db)
            .await
            .context("ping database")?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
