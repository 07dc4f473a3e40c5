use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    repo::{StoreError, UserStore},
    repo_types::{NewUser, User},
};

/// Process-local store used when no database is configured.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the active flag; accounts are disabled out of band.
    pub async fn set_active(&self, id: Uuid, active: bool) -> bool {
        match self.users.write().await.get_mut(&id) {
            Some(u) => {
                u.is_active = active;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email.eq_ignore_ascii_case(&new.email)) {
            return Err(StoreError::Duplicate);
        }
        let user = new.into_user(OffsetDateTime::now_utc());
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn touch_last_login(&self, id: Uuid, at: OffsetDateTime) -> anyhow::Result<()> {
        if let Some(u) = self.users.write().await.get_mut(&id) {
            u.last_login = Some(at);
        }
        Ok(())
    }

    async fn set_reset_token(&self, id: Uuid, token: &str, expires: OffsetDateTime) -> anyhow::Result<()> {
        if let Some(u) = self.users.write().await.get_mut(&id) {
            u.password_reset_token = Some(token.to_string());
            u.password_reset_expires = Some(expires);
        }
        Ok(())
    }

    async fn consume_reset_token(
        &self,
        id: Uuid,
        token: &str,
        new_password_hash: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<bool> {
        let mut users = self.users.write().await;
        let Some(u) = users.get_mut(&id) else {
            return Ok(false);
        };
        let matches = u.password_reset_token.as_deref() == Some(token)
            && u.password_reset_expires.is_some_and(|exp| exp > now);
        if !matches {
            return Ok(false);
        }
        u.password_hash = new_password_hash.to_string();
        u.password_reset_token = None;
        u.password_reset_expires = None;
        Ok(true)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
