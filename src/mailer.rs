use anyhow::Context;
use async_trait::async_trait;
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()>;
}

/// SMTP mailer over STARTTLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: lettre::message::Mailbox,
}

impl SmtpMailer {
    pub fn new(cfg: &SmtpConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)
            .context("smtp relay")?
            .port(cfg.port)
            .credentials(Credentials::new(cfg.username.clone(), cfg.password.clone()))
            .build();
        let from = cfg.from.parse().context("smtp from address")?;
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse().context("recipient address")?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())
            .context("build message")?;
        self.transport.send(message).await.context("smtp send")?;
        Ok(())
    }
}

/// Verification email body; the raw token rides in the link only.
pub fn verification_email(frontend_url: &str, first_name: &str, token: &str) -> (String, String) {
    let url = format!("{frontend_url}/verify-email?token={token}");
    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2>Email Verification</h2>
  <p>Hello {first_name},</p>
  <p>Thank you for registering! Please click the link below to verify your email address:</p>
  <a href="{url}">Verify Email</a>
  <p>If you didn't create an account, please ignore this email.</p>
  <p>This link will expire in 24 hours.</p>
</div>"#
    );
    ("Verify Your Email Address".to_string(), html)
}

pub fn password_reset_email(frontend_url: &str, first_name: &str, token: &str) -> (String, String) {
    let url = format!("{frontend_url}/reset-password?token={token}");
    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2>Password Reset</h2>
  <p>Hello {first_name},</p>
  <p>You requested a password reset. Click the link below to reset your password:</p>
  <a href="{url}">Reset Password</a>
  <p>If you didn't request this, please ignore this email.</p>
  <p>This link will expire in 1 hour.</p>
</div>"#
    );
    ("Password Reset Request".to_string(), html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_email_embeds_token_link() {
        let (subject, html) = verification_email("https://app.example.com", "Ada", "abc123");
        assert_eq!(subject, "Verify Your Email Address");
        assert!(html.contains("https://app.example.com/verify-email?token=abc123"));
        assert!(html.contains("Hello Ada"));
    }

    #[test]
    fn reset_email_embeds_token_link() {
        let (subject, html) = password_reset_email("https://app.example.com", "Ada", "xyz789");
        assert_eq!(subject, "Password Reset Request");
        assert!(html.contains("https://app.example.com/reset-password?token=xyz789"));
    }
}
