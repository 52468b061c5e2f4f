use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use lettre::message::{Mailbox, Message, MultiPart};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};
use tracing::{info, warn};

use super::Notifier;

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_FROM_NAME: &str = "Tech News Bot";

/// SMTP settings read from the environment.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub host: String,
    pub port: Option<u16>,
    /// Use STARTTLS (usually port 587) instead of implicit TLS.
    pub starttls: bool,
    pub user: String,
    pub password: String,
    pub recipient: String,
    pub from_name: String,
}

impl EmailConfig {
    /// `None` when any of `EMAIL_USER`, `EMAIL_APP_PASSWORD`, `RECIPIENT_EMAIL` is missing.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let non_empty = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let user = non_empty("EMAIL_USER");
        let password = non_empty("EMAIL_APP_PASSWORD");
        let recipient = non_empty("RECIPIENT_EMAIL");
        let (Some(user), Some(password), Some(recipient)) = (user, password, recipient) else {
            warn!(target: "notify", "email not configured, skipping email delivery");
            info!(target: "notify", "add EMAIL_USER, EMAIL_APP_PASSWORD and RECIPIENT_EMAIL to .env");
            return None;
        };

        Some(Self {
            host: non_empty("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            port: non_empty("SMTP_PORT").and_then(|p| p.parse().ok()),
            starttls: non_empty("SMTP_STARTTLS").is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true")),
            user,
            password,
            recipient,
            from_name: non_empty("EMAIL_FROM_NAME").unwrap_or_else(|| DEFAULT_FROM_NAME.to_string()),
        })
    }

    pub fn from_mailbox(&self) -> Result<Mailbox> {
        format!("{} <{}>", self.from_name, self.user)
            .parse()
            .map_err(|e| anyhow!("invalid sender `{}`: {e}", self.user))
    }

    pub fn to_mailbox(&self) -> Result<Mailbox> {
        self.recipient
            .parse()
            .map_err(|e| anyhow!("invalid RECIPIENT_EMAIL `{}`: {e}", self.recipient))
    }
}

pub struct EmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailSender {
    pub fn new(cfg: &EmailConfig) -> Result<Self> {
        let creds = Credentials::new(cfg.user.clone(), cfg.password.clone());
        let builder = if cfg.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.host)
        }
        .with_context(|| format!("invalid SMTP_HOST `{}`", cfg.host))?;

        let builder = match cfg.port {
            Some(p) => builder.port(p),
            None => builder,
        };
        let mailer = builder.credentials(creds).build();

        Ok(Self {
            mailer,
            from: cfg.from_mailbox()?,
            to: cfg.to_mailbox()?,
        })
    }

    /// `Ok(None)` when email is not configured.
    pub fn from_env() -> Result<Option<Self>> {
        EmailConfig::from_env().map(|c| Self::new(&c)).transpose()
    }

    pub fn build_message(&self, subject: &str, text: &str, html: &str) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(format!("📰 {subject}"))
            .multipart(MultiPart::alternative_plain_html(
                text.to_string(),
                html.to_string(),
            ))
            .context("build email")
    }
}

#[async_trait]
impl Notifier for EmailSender {
    async fn send_digest(&self, subject: &str, text: &str, html: &str) -> Result<()> {
        let msg = self.build_message(subject, text, html)?;
        match self.mailer.send(msg).await {
            Ok(resp) => {
                info!(target: "notify", code = %resp.code(), "email sent");
                Ok(())
            }
            Err(e) => {
                if e.is_permanent() {
                    info!(
                        target: "notify",
                        "for Gmail use an App Password, not the account password: https://support.google.com/accounts/answer/185833"
                    );
                }
                Err(e).context("send email")
            }
        }
    }

    async fn verify(&self) -> Result<bool> {
        self.mailer
            .test_connection()
            .await
            .context("smtp connection test")
    }

    fn name(&self) -> &'static str {
        "email"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let m: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| m.get(k).cloned()
    }

    #[test]
    fn missing_credentials_disable_email() {
        assert!(EmailConfig::from_lookup(lookup(&[("EMAIL_USER", "a@b.c")])).is_none());
        assert!(EmailConfig::from_lookup(lookup(&[
            ("EMAIL_USER", "a@b.c"),
            ("EMAIL_APP_PASSWORD", "  "),
            ("RECIPIENT_EMAIL", "me@b.c"),
        ]))
        .is_none());
    }

    #[test]
    fn defaults_apply() {
        let cfg = EmailConfig::from_lookup(lookup(&[
            ("EMAIL_USER", "bot@example.com"),
            ("EMAIL_APP_PASSWORD", "secret"),
            ("RECIPIENT_EMAIL", "me@example.com"),
        ]))
        .unwrap();
        assert_eq!(cfg.host, DEFAULT_SMTP_HOST);
        assert_eq!(cfg.from_name, DEFAULT_FROM_NAME);
        assert!(!cfg.starttls);
        assert_eq!(cfg.from_mailbox().unwrap().email.to_string(), "bot@example.com");
    }

    #[tokio::test]
    async fn message_is_multipart_alternative() {
        let cfg = EmailConfig::from_lookup(lookup(&[
            ("EMAIL_USER", "bot@example.com"),
            ("EMAIL_APP_PASSWORD", "secret"),
            ("RECIPIENT_EMAIL", "me@example.com"),
        ]))
        .unwrap();
        let sender = EmailSender::new(&cfg).unwrap();
        let msg = sender.build_message("Daily Tech News Digest - x", "plain", "<p>html</p>").unwrap();
        let raw = String::from_utf8(msg.formatted()).unwrap();
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("text/html"));
    }

    #[test]
    fn bad_recipient_is_an_error() {
        let cfg = EmailConfig::from_lookup(lookup(&[
            ("EMAIL_USER", "bot@example.com"),
            ("EMAIL_APP_PASSWORD", "secret"),
            ("RECIPIENT_EMAIL", "not an address"),
        ]))
        .unwrap();
        assert!(cfg.to_mailbox().is_err());
    }
}
