use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub session_ttl_minutes: i64,
    pub reset_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Postgres connection string. Without it the in-memory store is used.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    /// Prefix for links sent out by email, e.g. the password reset page.
    pub app_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "questgen".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "questgen-users".into()),
            session_ttl_minutes: env_minutes("JWT_SESSION_TTL_MINUTES", 60 * 24 * 7),
            reset_ttl_minutes: env_minutes("JWT_RESET_TTL_MINUTES", 60),
        };
        let app_base_url = std::env::var("APP_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".into())
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            database_url,
            jwt,
            app_base_url,
        })
    }

    /// Config for tests and local tooling: memory store, fixed secret.
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                session_ttl_minutes: 60 * 24 * 7,
                reset_ttl_minutes: 60,
            },
            app_base_url: "http://localhost:8080".into(),
        }
    }
}

fn env_minutes(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}
