use std::time::Duration;

use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{
    auth::claims::{Claims, TokenKind},
    config::JwtConfig,
};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        }
    }
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub session_ttl: Duration,
    pub reset_ttl: Duration,
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            session_ttl_minutes,
            reset_ttl_minutes,
        } = cfg.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            session_ttl: Duration::from_secs((session_ttl_minutes as u64) * 60),
            reset_ttl: Duration::from_secs((reset_ttl_minutes as u64) * 60),
        }
    }

    fn sign_at(
        &self,
        user_id: Uuid,
        email: &str,
        kind: TokenKind,
        now: OffsetDateTime,
    ) -> anyhow::Result<(String, OffsetDateTime)> {
        let ttl = match kind {
            TokenKind::Session => self.session_ttl,
            TokenKind::Reset => self.reset_ttl,
        };
        let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
        let claims = Claims {
            user_id,
            email: email.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4(),
            kind,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, kind = ?kind, "jwt signed");
        Ok((token, exp))
    }

    pub fn issue_session(&self, user_id: Uuid, email: &str) -> anyhow::Result<String> {
        let (token, _) = self.sign_at(user_id, email, TokenKind::Session, OffsetDateTime::now_utc())?;
        Ok(token)
    }

    /// Returns the token and its expiry; the caller stores both on the user.
    pub fn issue_reset(&self, user_id: Uuid, email: &str) -> anyhow::Result<(String, OffsetDateTime)> {
        self.sign_at(user_id, email, TokenKind::Reset, OffsetDateTime::now_utc())
    }

    /// Signature, issuer, audience, expiry and kind. Never looks at the store.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        // expired from the exp instant on, no grace window
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        if data.claims.kind != expected {
            debug!(kind = ?data.claims.kind, expected = ?expected, "jwt kind mismatch");
            return Err(TokenError::Invalid);
        }
        debug!(user_id = %data.claims.user_id, kind = ?data.claims.kind, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        let mut cfg = AppConfig::for_tests().jwt;
        cfg.secret = secret.into();
        cfg.issuer = issuer.into();
        cfg.audience = audience.into();
        JwtKeys::new(&cfg)
    }

    #[test]
    fn issue_and_verify_session_token() {
        let keys = make_keys("dev-secret", "test-issuer", "test-aud");
        let user_id = Uuid::new_v4();
        let token = keys.issue_session(user_id, "ann@x.com").expect("sign session");
        let claims = keys.verify(&token, TokenKind::Session).expect("verify token");
        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.email, "ann@x.com");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert_eq!(claims.kind, TokenKind::Session);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn reset_token_lives_one_hour() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let before = OffsetDateTime::now_utc();
        let (token, expires_at) = keys.issue_reset(Uuid::new_v4(), "ann@x.com").expect("sign reset");
        let lifetime = expires_at - before;
        assert!(lifetime <= TimeDuration::minutes(60) + TimeDuration::seconds(1));
        assert!(lifetime >= TimeDuration::minutes(59));
        let claims = keys.verify(&token, TokenKind::Reset).expect("verify reset");
        assert_eq!(claims.kind, TokenKind::Reset);
    }

    #[test]
    fn tokens_issued_back_to_back_differ() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let user_id = Uuid::new_v4();
        let a = keys.issue_session(user_id, "ann@x.com").unwrap();
        let b = keys.issue_session(user_id, "ann@x.com").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn verify_rejects_wrong_kind() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let session = keys.issue_session(Uuid::new_v4(), "ann@x.com").unwrap();
        assert_eq!(keys.verify(&session, TokenKind::Reset).unwrap_err(), TokenError::Invalid);

        let (reset, _) = keys.issue_reset(Uuid::new_v4(), "ann@x.com").unwrap();
        assert_eq!(keys.verify(&reset, TokenKind::Session).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn verify_rejects_foreign_secret_issuer_or_audience() {
        let good = make_keys("same-secret", "good-iss", "good-aud");
        let token = good.issue_session(Uuid::new_v4(), "ann@x.com").unwrap();

        let other_secret = make_keys("other-secret", "good-iss", "good-aud");
        assert_eq!(other_secret.verify(&token, TokenKind::Session).unwrap_err(), TokenError::Invalid);

        let other_claims = make_keys("same-secret", "bad-iss", "bad-aud");
        assert_eq!(other_claims.verify(&token, TokenKind::Session).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn verify_rejects_garbage() {
        let keys = make_keys("dev-secret", "iss", "aud");
        assert_eq!(keys.verify("not-a-jwt", TokenKind::Session).unwrap_err(), TokenError::Invalid);
        assert_eq!(keys.verify("", TokenKind::Session).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn expired_session_token_reports_expired() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let issued = OffsetDateTime::now_utc() - TimeDuration::days(8);
        let (token, _) = keys
            .sign_at(Uuid::new_v4(), "ann@x.com", TokenKind::Session, issued)
            .unwrap();
        assert_eq!(keys.verify(&token, TokenKind::Session).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn expired_reset_token_reports_expired() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let issued = OffsetDateTime::now_utc() - TimeDuration::hours(2);
        let (token, _) = keys
            .sign_at(Uuid::new_v4(), "ann@x.com", TokenKind::Reset, issued)
            .unwrap();
        assert_eq!(keys.verify(&token, TokenKind::Reset).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn session_token_fails_seconds_after_expiry() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let issued = OffsetDateTime::now_utc() - TimeDuration::days(7) - TimeDuration::seconds(5);
        let (token, exp) = keys
            .sign_at(Uuid::new_v4(), "ann@x.com", TokenKind::Session, issued)
            .unwrap();
        assert!(exp < OffsetDateTime::now_utc());
        assert_eq!(keys.verify(&token, TokenKind::Session).unwrap_err(), TokenError::Expired);
    }
}
