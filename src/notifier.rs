use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

/// Outbound email. Delivery itself (SMTP, provider API) lives outside this crate.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Writes messages to the log instead of delivering them.
#[derive(Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        info!(%to, %subject, "email queued");
        // body carries the reset link
        debug!(%to, %body, "email body");
        Ok(())
    }
}

/// Human wording for a link lifetime: "1 hour", "90 minutes".
fn lifetime_text(ttl: Duration) -> String {
    let minutes = ttl.as_secs() / 60;
    match minutes {
        60 => "1 hour".to_string(),
        m if m > 0 && m % 60 == 0 => format!("{} hours", m / 60),
        1 => "1 minute".to_string(),
        m => format!("{m} minutes"),
    }
}

pub fn reset_email(name: &str, link: &str, ttl: Duration) -> (String, String) {
    let subject = "Password Reset Request".to_string();
    let lifetime = lifetime_text(ttl);
    let body = format!(
        "Hello {name},\n\n\
         We received a request to reset the password for your account.\n\
         Open the link below to choose a new password. The link expires in {lifetime}.\n\n\
         {link}\n\n\
         If you did not request a password reset, you can ignore this email."
    );
    (subject, body)
}
